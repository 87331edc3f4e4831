//! Application types for CLI commands.
//!
//! Parameters passed from the CLI to the command implementations and the
//! outputs they produce.

use std::path::PathBuf;

use crate::cli::{Format, Provider};

/// Parameters for the ask command.
///
/// # Example
///
/// ```
/// use nl2sql_assistant::{
///     app::AskParams,
///     cli::{Format, Provider}
/// };
///
/// let params = AskParams {
///     question:      "how many items are in stock".to_string(),
///     database:      Some("warehouse.db".into()),
///     docs:          None,
///     provider:      Some(Provider::Ollama),
///     api_key:       None,
///     model:         None,
///     base_url:      None,
///     ollama_url:    "http://localhost:11434".to_string(),
///     output_format: Format::Text,
///     dry_run:       true,
///     no_color:      true
/// };
/// ```
#[derive(Debug, Clone)]
pub struct AskParams {
    /// The natural-language question.
    pub question:      String,
    /// Path to the SQLite database; falls back to configuration.
    pub database:      Option<PathBuf>,
    /// Document directory for narrative answers; falls back to configuration.
    pub docs:          Option<PathBuf>,
    /// LLM provider; falls back to configuration, then OpenAI.
    pub provider:      Option<Provider>,
    /// API key for cloud LLM providers.
    pub api_key:       Option<String>,
    /// Model name to use.
    pub model:         Option<String>,
    /// Base URL of an OpenAI-compatible endpoint.
    pub base_url:      Option<String>,
    /// Base URL for Ollama server.
    pub ollama_url:    String,
    /// Output format for results.
    pub output_format: Format,
    /// Show routing and prompt without calling the model.
    pub dry_run:       bool,
    /// Disable colored terminal output.
    pub no_color:      bool
}

/// Parameters for the schema command.
#[derive(Debug, Clone)]
pub struct SchemaParams {
    pub database: Option<PathBuf>,
    pub question: Option<String>
}

/// Result of the ask command.
#[derive(Debug, Clone)]
pub struct AskResult {
    /// Exit code (0 for SQL/TEXT answers, 1 for ERROR answers).
    pub exit_code: i32,
    /// Rendered output.
    pub output:    String
}
