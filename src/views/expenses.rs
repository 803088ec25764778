//! Expense ledger view.

use crate::store::types::Expense;
use crate::store::Record;

/// Expenses in held order.
pub fn expense_rows(records: &[Record]) -> Vec<Expense> {
    records.iter().filter_map(Expense::from_record).collect()
}

/// Sum of all amounts; non-numeric amounts count as zero.
pub fn total(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Format an amount with thousands separators, dropping a zero fraction.
pub fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let rounded = (amount.abs() * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac.trim_end_matches('0');
    let sign = if negative && rounded > 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}
