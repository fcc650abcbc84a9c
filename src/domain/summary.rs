//! Derived views over a slice of records.
//!
//! Every function here is pure and total: the empty slice yields zeroes or
//! empty collections, never an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Cents, Record, sum_cents};

/// Ledger-wide totals.
///
/// `net` is always equal to `total`; both are kept because they are reported
/// separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Raw sum of all amounts
    pub total: Cents,
    /// Sum of positive amounts
    pub income: Cents,
    /// Sum of absolute values of negative amounts
    pub expense: Cents,
    /// income - expense
    pub net: Cents,
}

/// One slice of the expense pie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseShare {
    pub category: String,
    /// Absolute expense for the category
    pub amount: Cents,
    pub percentage: f64,
}

pub fn totals(records: &[Record]) -> Totals {
    let (income, expense, total) =
        records
            .iter()
            .fold((0 as Cents, 0 as Cents, 0 as Cents), |(income, expense, total), record| {
                let total = total.saturating_add(record.amount);
                if record.amount > 0 {
                    (income.saturating_add(record.amount), expense, total)
                } else {
                    (income, expense.saturating_sub(record.amount), total)
                }
            });

    Totals {
        total,
        income,
        expense,
        net: income.saturating_sub(expense),
    }
}

/// Raw sum per category; income and expense within a category net out.
pub fn by_category(records: &[Record]) -> BTreeMap<String, Cents> {
    let mut sums: BTreeMap<String, Cents> = BTreeMap::new();
    for record in records {
        let sum = sums.entry(record.category.clone()).or_insert(0);
        *sum = sum.saturating_add(record.amount);
    }
    sums
}

/// Absolute expense per category. Categories without any negative amount
/// are left out entirely.
pub fn expense_by_category_absolute(records: &[Record]) -> BTreeMap<String, Cents> {
    let mut sums: BTreeMap<String, Cents> = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_expense()) {
        let sum = sums.entry(record.category.clone()).or_insert(0);
        *sum = sum.saturating_add(record.amount.saturating_abs());
    }
    sums
}

/// Net amount per month, ascending by month key.
pub fn monthly(records: &[Record]) -> Vec<(String, Cents)> {
    let mut months: BTreeMap<&str, Cents> = BTreeMap::new();
    for record in records {
        let net = months.entry(record.month()).or_insert(0);
        *net = net.saturating_add(record.amount);
    }
    months
        .into_iter()
        .map(|(month, net)| (month.to_string(), net))
        .collect()
}

/// Records whose category or note contains `keyword` (case-sensitive).
/// An empty keyword keeps every record, in order.
pub fn filter_by_keyword(records: &[Record], keyword: &str) -> Vec<Record> {
    if keyword.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| r.category.contains(keyword) || r.note.contains(keyword))
        .cloned()
        .collect()
}

/// Records dated within `month` (`YYYY-MM`).
pub fn records_in_month(records: &[Record], month: &str) -> Vec<Record> {
    records
        .iter()
        .filter(|r| r.month() == month)
        .cloned()
        .collect()
}

/// Pie-chart slices of the expense-by-category view, largest first.
pub fn expense_shares(records: &[Record]) -> Vec<ExpenseShare> {
    let by_category = expense_by_category_absolute(records);
    let total = sum_cents(by_category.values().copied());

    let mut shares: Vec<ExpenseShare> = by_category
        .into_iter()
        .map(|(category, amount)| ExpenseShare {
            category,
            amount,
            percentage: if total > 0 {
                (amount as f64 / total as f64) * 100.0
            } else {
                0.0
            },
        })
        .collect();

    shares.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.category.cmp(&b.category)));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, category: &str, amount: Cents) -> Record {
        Record::new(date, category, amount)
    }

    fn sample() -> Vec<Record> {
        vec![
            record("2024-01-05", "Salary", 300000),
            record("2024-01-07", "Food", -4500).with_note("groceries"),
            record("2024-01-20", "Food", 1000).with_note("refund"),
            record("2024-02-01", "Rent", -120000),
            record("2024-02-03", "Transport", -2000).with_note("bus pass"),
        ]
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(
            totals(&[]),
            Totals {
                total: 0,
                income: 0,
                expense: 0,
                net: 0
            }
        );
    }

    #[test]
    fn test_totals() {
        let t = totals(&sample());
        assert_eq!(t.income, 301000);
        assert_eq!(t.expense, 126500);
        assert_eq!(t.total, 174500);
        assert_eq!(t.total, t.income - t.expense);
        assert_eq!(t.net, t.total);
    }

    #[test]
    fn test_zero_amount_counts_nowhere() {
        let t = totals(&[record("2024-01-01", "Misc", 0)]);
        assert_eq!(t, Totals::default());
    }

    #[test]
    fn test_sums_never_overflow() {
        let records = vec![
            record("2024-01-01", "Salary", i64::MAX),
            record("2024-01-02", "Salary", i64::MAX),
            record("2024-01-03", "Rent", i64::MIN),
            record("2024-01-04", "Rent", -1),
        ];

        let t = totals(&records);
        assert_eq!(t.income, i64::MAX);
        assert_eq!(t.expense, i64::MAX);
        assert_eq!(by_category(&records).get("Rent"), Some(&i64::MIN));
        assert_eq!(
            expense_by_category_absolute(&records).get("Rent"),
            Some(&i64::MAX)
        );
        assert_eq!(monthly(&records).len(), 1);
        assert_eq!(expense_shares(&records).len(), 1);
    }

    #[test]
    fn test_by_category_nets_income_and_expense() {
        let sums = by_category(&sample());
        assert_eq!(sums.get("Food"), Some(&-3500));
        assert_eq!(sums.get("Salary"), Some(&300000));
        assert_eq!(sums.len(), 4);
    }

    #[test]
    fn test_by_category_order_independent() {
        let forward = sample();
        let mut reversed = sample();
        reversed.reverse();
        assert_eq!(by_category(&forward), by_category(&reversed));
    }

    #[test]
    fn test_expense_by_category_absolute() {
        let sums = expense_by_category_absolute(&sample());
        assert_eq!(sums.get("Food"), Some(&4500));
        assert_eq!(sums.get("Rent"), Some(&120000));
        assert_eq!(sums.get("Salary"), None, "income-only category is absent");
    }

    #[test]
    fn test_monthly() {
        let records = vec![
            record("2024-01-05", "Salary", 10000),
            record("2024-02-01", "Food", -4000),
            record("2024-01-20", "Food", -1000),
        ];
        assert_eq!(
            monthly(&records),
            vec![("2024-01".to_string(), 9000), ("2024-02".to_string(), -4000)]
        );
        assert!(monthly(&[]).is_empty());
    }

    #[test]
    fn test_filter_by_keyword() {
        let records = sample();
        assert_eq!(filter_by_keyword(&records, ""), records);

        let food = filter_by_keyword(&records, "Food");
        assert_eq!(food.len(), 2);

        let bus = filter_by_keyword(&records, "bus");
        assert_eq!(bus.len(), 1);
        assert_eq!(bus[0].category, "Transport");

        assert!(filter_by_keyword(&records, "food").is_empty(), "case-sensitive");
    }

    #[test]
    fn test_records_in_month() {
        let feb = records_in_month(&sample(), "2024-02");
        assert_eq!(feb.len(), 2);
        assert!(feb.iter().all(|r| r.date.starts_with("2024-02")));
    }

    #[test]
    fn test_expense_shares() {
        let shares = expense_shares(&sample());
        assert_eq!(shares[0].category, "Rent");
        let sum: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!(expense_shares(&[record("2024-01-01", "Salary", 100)]).is_empty());
    }
}
