//! Question intent classification.
//!
//! Routes a question to the structured (SQL) path or the narrative (text)
//! path using an ordered list of rules. Rules are evaluated top to bottom and
//! the first match decides, so the definitional rule placed first dominates
//! every structured vocabulary rule below it.
//!
//! | Order | Rule | Mode |
//! |-------|------|------|
//! | 1 | `definition` | Narrative |
//! | 2 | `price` | Structured |
//! | 3 | `stock` | Structured |
//! | 4 | `listing` | Structured |
//! | 5 | `count` | Structured |
//! | 6 | `sales` | Structured |
//!
//! Questions no rule matches are narrative.
//!
//! # Example
//!
//! ```
//! use nl2sql_assistant::intent::{Mode, classify};
//!
//! assert_eq!(classify("show me the stock for item X"), Mode::Structured);
//! assert_eq!(classify("what is total stock"), Mode::Narrative);
//! ```

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

/// How a question will be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    /// Answer with one SQL statement against relational data
    Structured,
    /// Answer with free text, optionally grounded in retrieved documents
    Narrative
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured => write!(f, "SQL"),
            Self::Narrative => write!(f, "TEXT")
        }
    }
}

/// One entry of the ordered rule list.
pub struct IntentRule {
    pub name:    &'static str,
    pub pattern: Regex,
    pub mode:    Mode
}

impl IntentRule {
    fn new(name: &'static str, pattern: &str, mode: Mode) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid regex"),
            mode
        }
    }

    pub fn matches(&self, question: &str) -> bool {
        self.pattern.is_match(question)
    }
}

/// Ordered rules; first match wins.
static RULES: LazyLock<Vec<IntentRule>> = LazyLock::new(|| {
    vec![
        IntentRule::new(
            "definition",
            r"^(what is|who is|define|explain|describe|meaning of|tell me about|how to)",
            Mode::Narrative
        ),
        IntentRule::new(
            "price",
            r"\b(price|sale price|purchase price|sales_price|cost|rate|amount|value)\b",
            Mode::Structured
        ),
        IntentRule::new(
            "stock",
            r"\b(stock|quantity|qty|how many|total stock|inventory)\b",
            Mode::Structured
        ),
        IntentRule::new(
            "listing",
            r"\b(list|get|show|fetch|display)\s+(items|products|stock|inventory)\b",
            Mode::Structured
        ),
        IntentRule::new("count", r"\b(count|number of|how many)\b", Mode::Structured),
        IntentRule::new(
            "sales",
            r"\b(sales|revenue|total sales|this month sales|last month sales|monthly sales)\b",
            Mode::Structured
        ),
    ]
});

/// The ordered rule list used by [`classify`]
pub fn rules() -> &'static [IntentRule] {
    &RULES
}

/// Classify a question, also reporting which rule decided.
///
/// The rule name is `None` when no rule matched and the narrative default
/// applied.
pub fn classify_with_rule(question: &str) -> (Mode, Option<&'static str>) {
    let q = question.trim().to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&q))
        .map(|rule| (rule.mode, Some(rule.name)))
        .unwrap_or((Mode::Narrative, None))
}

/// Classify a question as structured or narrative.
pub fn classify(question: &str) -> Mode {
    classify_with_rule(question).0
}
