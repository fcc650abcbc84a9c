use serde::{Deserialize, Serialize};

use super::{
    Cents, Record, expense_by_category_absolute, format_cents, records_in_month, sum_cents,
};

/// Monthly spending limit used when none is given (20000.00).
pub const DEFAULT_MONTHLY_BUDGET: Cents = 2_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    WithinBudget,
    OverBudget,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::WithinBudget => "within budget",
            BudgetStatus::OverBudget => "over budget",
        }
    }
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending for one month compared against a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetAnalysis {
    pub month: String,
    pub budget: Cents,
    /// Absolute sum of the month's expenses
    pub spent: Cents,
    /// spent - budget; positive means over budget
    pub difference: Cents,
    pub status: BudgetStatus,
    /// Absolute expense per category for the month
    pub categories: Vec<(String, Cents)>,
}

impl BudgetAnalysis {
    /// Analyze the expenses dated in `month` (`YYYY-MM`). Income is ignored.
    pub fn for_month(records: &[Record], month: &str, budget: Cents) -> Self {
        let in_month = records_in_month(records, month);
        let categories: Vec<(String, Cents)> =
            expense_by_category_absolute(&in_month).into_iter().collect();
        let spent = sum_cents(categories.iter().map(|(_, amount)| *amount));
        let difference = spent.saturating_sub(budget);

        Self {
            month: month.to_string(),
            budget,
            spent,
            difference,
            status: if difference <= 0 {
                BudgetStatus::WithinBudget
            } else {
                BudgetStatus::OverBudget
            },
            categories,
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.status == BudgetStatus::OverBudget
    }

    /// Plain-text report, suitable for display or an email body.
    pub fn to_report_text(&self) -> String {
        let mut report = format!("Budget analysis for {}\n", self.month);
        report.push_str(&format!("Budget:  {}\n", format_cents(self.budget)));
        report.push_str(&format!("Spent:   {}\n", format_cents(self.spent)));
        report.push_str(&format!(
            "Status:  {} (difference: {})\n",
            self.status,
            format_cents(self.difference.saturating_abs())
        ));
        report.push_str("\nExpenses by category:\n");
        if self.categories.is_empty() {
            report.push_str("  (no expenses)\n");
        }
        for (category, amount) in &self.categories {
            report.push_str(&format!("- {}: {}\n", category, format_cents(*amount)));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record::new("2024-03-01", "Salary", 500000),
            Record::new("2024-03-02", "Food", -12000),
            Record::new("2024-03-15", "Rent", -80000),
            Record::new("2024-03-20", "Food", -3000),
            Record::new("2024-02-28", "Food", -99999),
        ]
    }

    #[test]
    fn test_within_budget() {
        let analysis = BudgetAnalysis::for_month(&records(), "2024-03", 100000);

        assert_eq!(analysis.spent, 95000);
        assert_eq!(analysis.difference, -5000);
        assert_eq!(analysis.status, BudgetStatus::WithinBudget);
        assert_eq!(
            analysis.categories,
            vec![("Food".to_string(), 15000), ("Rent".to_string(), 80000)]
        );
    }

    #[test]
    fn test_exactly_on_budget_is_within() {
        let analysis = BudgetAnalysis::for_month(&records(), "2024-03", 95000);
        assert_eq!(analysis.difference, 0);
        assert!(!analysis.is_over_budget());
    }

    #[test]
    fn test_over_budget() {
        let analysis = BudgetAnalysis::for_month(&records(), "2024-03", 50000);
        assert!(analysis.is_over_budget());
        assert_eq!(analysis.difference, 45000);
    }

    #[test]
    fn test_empty_month() {
        let analysis = BudgetAnalysis::for_month(&records(), "2025-01", DEFAULT_MONTHLY_BUDGET);
        assert_eq!(analysis.spent, 0);
        assert!(analysis.categories.is_empty());
        assert!(analysis.to_report_text().contains("(no expenses)"));
    }

    #[test]
    fn test_report_text() {
        let text = BudgetAnalysis::for_month(&records(), "2024-03", 50000).to_report_text();
        assert!(text.starts_with("Budget analysis for 2024-03\n"));
        assert!(text.contains("Spent:   950.00"));
        assert!(text.contains("over budget (difference: 450.00)"));
        assert!(text.contains("- Rent: 800.00"));
    }
}
