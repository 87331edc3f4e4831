//! Post-processing of model-generated statements.
//!
//! Turns the raw model output into exactly one statement that is safe to hand
//! to the executor:
//!
//! 1. Markdown code fences are stripped.
//! 2. Exact-match filters on free-text columns are rewritten into
//!    case-insensitive `LIKE` patterns.
//! 3. The statement must start with `SELECT`, `WITH`, `UPDATE`, `INSERT` or
//!    `DELETE`.
//! 4. Text holding several statements is rejected, whether or not it
//!    parses.
//!
//! Anything rejected becomes [`SENTINEL_STATEMENT`].
//!
//! # Example
//!
//! ```
//! use nl2sql_assistant::sanitizer::{SENTINEL_STATEMENT, sanitize};
//!
//! let sql = sanitize("```sql\nSELECT price FROM items WHERE i.item_name = 'Rice'\n```");
//! assert_eq!(
//!     sql,
//!     "SELECT price FROM items WHERE LOWER(item_name) LIKE '%rice%'"
//! );
//!
//! assert_eq!(sanitize("Sure, here it is"), SENTINEL_STATEMENT);
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};
use sqlparser::{dialect::SQLiteDialect, parser::Parser};
use tracing::{debug, warn};

/// Always-safe placeholder used when no valid statement could be produced
pub const SENTINEL_STATEMENT: &str = "SELECT 'NO_SQL_RETURNED' AS result;";

/// Columns holding free text that models tend to filter with `=`
pub const FUZZY_COLUMNS: [&str; 4] = ["item_name", "product_name", "description", "name"];

/// Allowed leading verbs, case-insensitive.
static VERB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(SELECT|WITH|UPDATE|INSERT|DELETE)\b").expect("valid regex")
});

/// `WHERE [qualifier.]column = 'value'` per fuzzy column, in list order.
static FUZZY_REGEXES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    FUZZY_COLUMNS
        .iter()
        .map(|col| {
            let pattern = format!(r#"(?i)WHERE\s+[\w.]*{}\s*=\s*['"]([^'"]+)['"]"#, col);
            (*col, Regex::new(&pattern).expect("valid regex"))
        })
        .collect()
});

/// Whether a statement is the sentinel placeholder
pub fn is_sentinel(sql: &str) -> bool {
    sql.trim()
        .to_uppercase()
        .starts_with("SELECT 'NO_SQL_RETURNED'")
}

/// Remove Markdown code fences and surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```sql", "").replace("```", "").trim().to_string()
}

/// Rewrite exact-match filters on free-text columns into `LIKE` patterns.
///
/// Idempotent: rewritten clauses no longer contain `=` and are left alone.
pub fn fuzzy_fix(sql: &str) -> String {
    let mut result = sql.to_string();
    for (col, regex) in FUZZY_REGEXES.iter() {
        result = regex
            .replace_all(&result, |caps: &Captures| {
                format!("WHERE LOWER({}) LIKE '%{}%'", col, caps[1].to_lowercase())
            })
            .into_owned();
    }
    result
}

/// Whether a statement starts with an allowed verb
pub fn has_allowed_verb(sql: &str) -> bool {
    VERB_REGEX.is_match(sql.trim())
}

/// Whether anything but whitespace follows a `;` outside literals.
///
/// Quoted strings, quoted identifiers and comments are skipped, so
/// `WHERE note = 'a; b'` holds a single statement.
///
/// # Example
///
/// ```
/// use nl2sql_assistant::sanitizer::has_trailing_statement;
///
/// assert!(has_trailing_statement("SELECT 1; PRAGMA foo bar baz((("));
/// assert!(!has_trailing_statement("SELECT ';' AS x;  "));
/// ```
pub fn has_trailing_statement(sql: &str) -> bool {
    let mut chars = sql.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\'' | '"' | '`' | '[' => {
                let close = if ch == '[' { ']' } else { ch };
                for (_, c) in chars.by_ref() {
                    if c == close {
                        break;
                    }
                }
            }
            '-' if matches!(chars.peek(), Some((_, '-'))) => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = ' ';
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ';' => {
                let rest = &sql[idx + 1..];
                if !rest.trim().is_empty() && rest.trim() != ";" {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// Whether the text holds more than one statement.
///
/// Parsed text is judged by its statement count. Text the parser cannot
/// handle falls back to a lexical scan for a trailing statement.
fn is_multi_statement(sql: &str) -> bool {
    match Parser::parse_sql(&SQLiteDialect {}, sql) {
        Ok(statements) => statements.len() > 1,
        Err(e) => {
            debug!(error = %e, "statement not parsed, scanning for separators");
            has_trailing_statement(sql)
        }
    }
}

/// Sanitize a raw model candidate into one executable statement.
///
/// Never returns an empty string; rejected candidates become
/// [`SENTINEL_STATEMENT`].
pub fn sanitize(raw: &str) -> String {
    let stripped = strip_code_fences(raw);
    let fixed = fuzzy_fix(&stripped);
    let candidate = fixed.trim();
    if !has_allowed_verb(candidate) {
        let preview: String = candidate.chars().take(300).collect();
        warn!(candidate = %preview, "generated text is not a statement");
        return SENTINEL_STATEMENT.to_string();
    }
    if is_multi_statement(candidate) {
        warn!(candidate = %candidate, "generated text holds several statements");
        return SENTINEL_STATEMENT.to_string();
    }
    candidate.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```sql\nSELECT 1\n```"), "SELECT 1");
        assert_eq!(strip_code_fences("```\nSELECT 1\n```  "), "SELECT 1");
    }

    #[test]
    fn test_is_sentinel() {
        assert!(is_sentinel(SENTINEL_STATEMENT));
        assert!(is_sentinel("  select 'NO_SQL_RETURNED' as result"));
        assert!(!is_sentinel("SELECT 1"));
    }

    #[test]
    fn test_multi_statement_detection() {
        assert!(is_multi_statement("SELECT 1; SELECT 2"));
        assert!(!is_multi_statement("SELECT 1;"));
    }

    #[test]
    fn test_unparseable_single_statement_passes() {
        assert!(!is_multi_statement("SELECT * FROM ("));
    }

    #[test]
    fn test_unparseable_tail_is_multi_statement() {
        assert!(is_multi_statement("SELECT 1; PRAGMA foo bar baz ((("));
    }

    #[test]
    fn test_trailing_statement_skips_literals_and_comments() {
        assert!(!has_trailing_statement("SELECT 'a; b' FROM t"));
        assert!(!has_trailing_statement(r#"SELECT "x;y" FROM t;"#));
        assert!(!has_trailing_statement("SELECT 1 -- done; really\n"));
        assert!(!has_trailing_statement("SELECT /* ; */ 1;"));
        assert!(!has_trailing_statement("SELECT 1;;"));
        assert!(has_trailing_statement("SELECT 1; DROP TABLE t"));
        assert!(has_trailing_statement("SELECT 'it''s'; DELETE FROM t"));
    }
}
