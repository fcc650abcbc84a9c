// Plain-text tables and bar charts for the terminal.

use std::collections::BTreeMap;

use crate::domain::{Cents, ExpenseShare, Record, Totals, format_cents};

pub fn print_records(records: &[Record]) {
    if records.is_empty() {
        println!("No records found.");
        return;
    }

    println!(
        "{:>5}  {:<10}  {:<15} {:>12}  {}",
        "ID", "DATE", "CATEGORY", "AMOUNT", "NOTE"
    );
    println!("{}", "-".repeat(70));
    for r in records {
        println!(
            "{:>5}  {:<10}  {:<15} {:>12}  {}",
            r.id,
            truncate(&r.date, 10),
            truncate(&r.category, 15),
            format_cents(r.amount),
            truncate(&r.note, 30)
        );
    }
}

pub fn print_totals(totals: &Totals) {
    println!();
    print!("{}", totals_text(totals));
}

/// Total, income, expense and net, one per line.
pub fn totals_text(totals: &Totals) -> String {
    [
        ("Total", totals.total),
        ("Income", totals.income),
        ("Expense", totals.expense),
        ("Net", totals.net),
    ]
    .iter()
    .map(|(label, amount)| format!("{:<10} {:>15}\n", label, format_cents(*amount)))
    .collect()
}

pub fn print_category_summary(summary: &BTreeMap<String, Cents>) {
    if summary.is_empty() {
        println!("No records found.");
        return;
    }

    println!("{:<20} {:>15}", "CATEGORY", "NET");
    println!("{}", "-".repeat(36));
    for (category, amount) in summary {
        println!("{:<20} {:>15}", truncate(category, 20), format_cents(*amount));
    }
}

pub fn print_categories(names: &[String]) {
    if names.is_empty() {
        println!("No categories defined.");
        return;
    }
    for name in names {
        println!("  {}", name);
    }
}

pub fn print_charts(shares: &[ExpenseShare], trend: &[(String, Cents)], width: usize) {
    println!("Expense share by category");
    if shares.is_empty() {
        println!("  (no expenses)");
    } else {
        let max = shares.iter().map(|s| s.amount).max().unwrap_or(0);
        for share in shares {
            println!(
                "  {:<15} {:<w$} {:>6.1}%  {}",
                truncate(&share.category, 15),
                bar(share.amount, max, width),
                share.percentage,
                format_cents(share.amount),
                w = width
            );
        }
    }

    println!();
    println!("Monthly net");
    if trend.is_empty() {
        println!("  (no records)");
        return;
    }
    let max = trend.iter().map(|(_, a)| a.saturating_abs()).max().unwrap_or(0);
    for (month, amount) in trend {
        let sign = if *amount < 0 { '-' } else { '+' };
        println!(
            "  {:<8} {}{:<w$} {:>12}",
            month,
            sign,
            bar(amount.saturating_abs(), max, width),
            format_cents(*amount),
            w = width
        );
    }
}

/// A bar of `#` proportional to `value / max`, at least one character for any
/// non-zero value.
fn bar(value: Cents, max: Cents, width: usize) -> String {
    if max <= 0 || value <= 0 {
        return String::new();
    }
    let len = ((value as f64 / max as f64) * width as f64).round() as usize;
    "#".repeat(len.clamp(1, width))
}

/// Shorten `s` to at most `max_len` characters, marking the cut with `...`.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Food", 15), "Food");
        assert_eq!(truncate("Entertainment and more", 10), "Enterta...");
        assert_eq!(truncate("食費食費食費", 5), "食費...");
    }

    #[test]
    fn test_totals_text_shows_every_figure() {
        let totals = Totals {
            total: 500000,
            income: 1000000,
            expense: 500000,
            net: 500000,
        };
        let lines: Vec<String> = totals_text(&totals)
            .lines()
            .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        assert_eq!(
            lines,
            vec![
                "Total 5000.00",
                "Income 10000.00",
                "Expense 5000.00",
                "Net 5000.00"
            ]
        );
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(100, 100, 10), "##########");
        assert_eq!(bar(50, 100, 10), "#####");
        assert_eq!(bar(1, 1000, 10), "#");
        assert_eq!(bar(0, 100, 10), "");
        assert_eq!(bar(10, 0, 10), "");
    }
}
