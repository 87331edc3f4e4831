//! SQL statement synthesis from a question and a filtered schema.
//!
//! The model is asked for a single SQLite statement at temperature 0. A failed
//! call or an empty answer is recovered locally into the sentinel statement,
//! so the caller always receives something runnable.

use tracing::{debug, warn};

use crate::{error::error_message, llm::LanguageModel, sanitizer::SENTINEL_STATEMENT};

/// System instruction sent with every synthesis request
pub const SYSTEM_PROMPT: &str = "Convert natural language to SQLite queries.";

/// Sampling temperature for synthesis
pub const TEMPERATURE: f32 = 0.0;

/// Build the user prompt for statement synthesis.
///
/// # Example
///
/// ```
/// use nl2sql_assistant::synthesizer::build_prompt;
///
/// let prompt = build_prompt("total stock of rice", "TABLE items: item_name, stock");
/// assert!(prompt.contains("TABLE items: item_name, stock"));
/// assert!(prompt.contains("User question: total stock of rice"));
/// assert!(prompt.contains("NO_SQL"));
/// ```
pub fn build_prompt(question: &str, filtered_schema: &str) -> String {
    format!(
        "You are an expert SQLite query generator. Follow these rules:\n\
         - Use LOWER(column) and LIKE for matching text (e.g., WHERE LOWER(item_name) LIKE '%rin%').\n\
         - Use ISO-style dates if needed (YYYY-MM-DD).\n\
         - For aggregations (monthly/weekly totals), prefer SUM(amount) and proper WHERE date filters.\n\
         - Only output the SQL query (no prose). If you cannot generate a query, output exactly: NO_SQL.\n\n\
         Schema:\n{schema}\n\n\
         User question: {question}\n\n\
         Generate only the SQL query to answer the user question.\n",
        schema = filtered_schema,
        question = question
    )
}

/// Ask the model for a candidate statement.
///
/// Returns the raw model text, or [`SENTINEL_STATEMENT`] when the call fails
/// or yields nothing.
pub async fn synthesize(model: &dyn LanguageModel, question: &str, filtered_schema: &str) -> String {
    let prompt = build_prompt(question, filtered_schema);
    debug!(prompt = %prompt, "synthesis prompt");
    match model.complete(SYSTEM_PROMPT, &prompt, TEMPERATURE).await {
        Ok(completion) if !completion.is_blank() => {
            debug!(candidate = %completion.text, "raw candidate statement");
            completion.text
        }
        Ok(_) => {
            warn!("model returned an empty statement");
            SENTINEL_STATEMENT.to_string()
        }
        Err(e) => {
            warn!(error = %error_message(&e), "statement synthesis failed");
            SENTINEL_STATEMENT.to_string()
        }
    }
}
