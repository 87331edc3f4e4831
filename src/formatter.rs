//! Prose rendering of query results.
//!
//! The formatter looks only at the shape of a result (row and column counts,
//! value types) and at a few words of the question. It never inspects the
//! statement that produced the result.
//!
//! | Shape | Output |
//! |-------|--------|
//! | no rows | `No records found.` |
//! | 1 × 1 | `The sales price is <v>` or `Result: <v>` |
//! | 1 row, all numeric | `The value is <v>` or `Values: <v1>, <v2>` |
//! | anything else | pipe table, first [`PREVIEW_ROWS`] rows |
//!
//! # Currency Vocabulary
//!
//! A question "mentions currency" when one of `price`, `sales price`, `rate`,
//! `cost`, `rupee`, `rs` starts a word, or when it contains `₹`. This is
//! deliberately stricter than a plain substring check: with substrings,
//! `orders` would match `rs` and `generate` would match `rate`.

use std::sync::LazyLock;

use regex::Regex;

use crate::executor::{QueryResult, Scalar};

/// Number of data rows rendered in a table preview
pub const PREVIEW_ROWS: usize = 5;

/// Literal answer for an empty result
pub const NO_RECORDS: &str = "No records found.";

/// Currency and price vocabulary, anchored at word starts.
static CURRENCY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\b(price|sales price|rate|cost|rupee|rs)|₹)").expect("valid regex")
});

/// Whether the question talks about prices or money
pub fn mentions_currency(question: &str) -> bool {
    CURRENCY_REGEX.is_match(question)
}

/// Format a number with thousands separators and two decimals.
///
/// # Example
///
/// ```
/// use nl2sql_assistant::formatter::format_number;
///
/// assert_eq!(format_number(12345.6), "12,345.60");
/// assert_eq!(format_number(-1234567.891), "-1,234,567.89");
/// assert_eq!(format_number(42.0), "42.00");
/// ```
pub fn format_number(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let digits = int_part.len();
    let mut grouped = String::with_capacity(digits + digits / 3 + 4);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (digits - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Render a query result as a human-readable answer.
///
/// # Example
///
/// ```
/// use nl2sql_assistant::{
///     executor::{QueryResult, Scalar},
///     formatter::format_result
/// };
///
/// let result = QueryResult::new(vec!["total".into()], vec![vec![Scalar::Real(12345.6)]]);
/// assert_eq!(
///     format_result(&result, "what is the total sales price"),
///     "The sales price is 12,345.60"
/// );
/// ```
pub fn format_result(result: &QueryResult, question: &str) -> String {
    let columns = &result.columns;
    let rows = &result.rows;

    if rows.is_empty() {
        return NO_RECORDS.to_string();
    }

    if columns.len() == 1 && rows.len() == 1 {
        return format_scalar(rows[0].first(), question);
    }

    if rows.len() == 1 && !columns.is_empty() {
        let values = &rows[0];
        if !values.is_empty() && values.iter().all(Scalar::is_numeric) {
            let formatted: Vec<String> = values
                .iter()
                .map(|v| {
                    v.as_f64()
                        .map(format_number)
                        .unwrap_or_else(|| v.to_string())
                })
                .collect();
            if formatted.len() == 1 {
                return format!("The value is {}", formatted[0]);
            }
            return format!("Values: {}", formatted.join(", "));
        }
    }

    format_table(result)
}

fn format_scalar(value: Option<&Scalar>, question: &str) -> String {
    let Some(value) = value else {
        return format!("Result: {}", Scalar::Null);
    };
    match value.as_f64() {
        Some(number) if mentions_currency(question) => {
            format!("The sales price is {}", format_number(number))
        }
        Some(number) => format!("Result: {}", format_number(number)),
        None => format!("Result: {}", value)
    }
}

fn format_table(result: &QueryResult) -> String {
    let mut lines = Vec::with_capacity(PREVIEW_ROWS + 2);
    lines.push(result.columns.join(" | "));
    for row in result.rows.iter().take(PREVIEW_ROWS) {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        lines.push(cells.join(" | "));
    }
    if result.rows.len() > PREVIEW_ROWS {
        lines.push(format!(
            "... and {} more rows",
            result.rows.len() - PREVIEW_ROWS
        ));
    }
    lines.join("\n")
}
