//! Helper functions for CLI operations.
//!
//! Resolution of effective settings (CLI argument, then configuration, then
//! default), LLM provider construction and exit code calculation.

use std::path::PathBuf;

use clap::ValueEnum;
use tracing::warn;

use crate::{
    cli::{Format, Provider},
    error::{AppResult, config_error},
    llm::{LlmProvider, OPENAI_BASE_URL},
    orchestrator::ChatResponse,
    output::OutputOptions,
    retrieval::KeywordRetriever
};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Calculates the process exit code for a pipeline response.
///
/// - `0` - SQL or TEXT answer (including recovered failures)
/// - `1` - ERROR answer
///
/// # Example
///
/// ```
/// use nl2sql_assistant::{app::calculate_exit_code, orchestrator::ChatResponse};
///
/// let response = ChatResponse::Text {
///     answer: "hello".to_string()
/// };
/// assert_eq!(calculate_exit_code(&response), 0);
/// ```
pub fn calculate_exit_code(response: &ChatResponse) -> i32 {
    if response.is_error() { 1 } else { 0 }
}

/// Creates output options from CLI parameters.
pub fn create_output_options(format: Format, no_color: bool) -> OutputOptions {
    OutputOptions {
        format:  format.into(),
        colored: !no_color
    }
}

/// Resolves the database path from the CLI argument or configuration.
///
/// # Errors
///
/// Returns an error if no path is given or the file does not exist.
pub fn resolve_database(cli: Option<PathBuf>, config: Option<PathBuf>) -> AppResult<PathBuf> {
    let path = cli.or(config).ok_or_else(|| {
        config_error("Database path required (use --database or NL2SQL_DATABASE)")
    })?;
    if !path.exists() {
        return Err(config_error(format!(
            "Database file not found: {}",
            path.display()
        )));
    }
    Ok(path)
}

/// Loads the narrative document corpus when a directory is configured.
///
/// An empty corpus yields `None`, so narrative answers run without context.
///
/// # Errors
///
/// Returns an error if the directory does not exist or cannot be read.
pub fn load_retriever(dir: Option<PathBuf>) -> AppResult<Option<KeywordRetriever>> {
    let Some(dir) = dir else {
        return Ok(None);
    };
    if !dir.is_dir() {
        return Err(config_error(format!(
            "Documents directory not found: {}",
            dir.display()
        )));
    }
    let retriever = KeywordRetriever::from_dir(&dir)?;
    if retriever.is_empty() {
        warn!(dir = %dir.display(), "no documents found, answering without context");
        return Ok(None);
    }
    Ok(Some(retriever))
}

/// Resolves the provider from the CLI argument, configuration, or default.
///
/// # Errors
///
/// Returns an error if the configured provider name is unknown.
pub fn get_effective_provider(cli: Option<Provider>, config: Option<&str>) -> AppResult<Provider> {
    if let Some(provider) = cli {
        return Ok(provider);
    }
    match config {
        Some(name) => Provider::from_str(name, true)
            .map_err(|_| config_error(format!("Unknown LLM provider '{}'", name))),
        None => Ok(Provider::OpenAI)
    }
}

/// Builds the LLM provider from resolved parameters.
///
/// # Errors
///
/// Returns an error if a cloud provider is selected without an API key.
pub fn build_llm_provider(
    provider: Provider,
    api_key: Option<String>,
    model: String,
    base_url: String,
    ollama_url: String
) -> AppResult<LlmProvider> {
    match provider {
        Provider::OpenAI => {
            let key = api_key.ok_or_else(|| {
                config_error("API key required for OpenAI (use --api-key or LLM_API_KEY)")
            })?;
            Ok(LlmProvider::OpenAI {
                api_key: key,
                model,
                base_url
            })
        }
        Provider::Anthropic => {
            let key = api_key.ok_or_else(|| {
                config_error("API key required for Anthropic (use --api-key or LLM_API_KEY)")
            })?;
            Ok(LlmProvider::Anthropic {
                api_key: key,
                model
            })
        }
        Provider::Ollama => Ok(LlmProvider::Ollama {
            base_url: ollama_url,
            model
        })
    }
}

/// Gets effective model name
pub fn get_effective_model(
    model: Option<String>,
    config_model: Option<String>,
    provider: &Provider
) -> String {
    model
        .or(config_model)
        .unwrap_or_else(|| provider.default_model().to_string())
}

/// Gets effective base URL for OpenAI-compatible endpoints
pub fn get_effective_base_url(url: Option<String>, config_url: Option<String>) -> String {
    url.or(config_url)
        .unwrap_or_else(|| OPENAI_BASE_URL.to_string())
}

/// Gets effective Ollama URL
pub fn get_effective_ollama_url(url: String, config_url: Option<String>) -> String {
    if url == DEFAULT_OLLAMA_URL {
        config_url.unwrap_or(url)
    } else {
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    #[test]
    fn test_calculate_exit_code_sql() {
        let response = ChatResponse::Sql {
            query:  "SELECT 1".to_string(),
            raw:    None,
            answer: "SQL Execution Error: boom".to_string()
        };
        assert_eq!(calculate_exit_code(&response), 0);
    }

    #[test]
    fn test_calculate_exit_code_error() {
        let response = ChatResponse::Error {
            answer: "Internal Server Error: boom".to_string()
        };
        assert_eq!(calculate_exit_code(&response), 1);
    }

    #[test]
    fn test_resolve_database_missing() {
        assert!(resolve_database(None, None).is_err());
    }

    #[test]
    fn test_resolve_database_not_found() {
        let result = resolve_database(Some(PathBuf::from("/nonexistent/db.sqlite")), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_database_prefers_cli() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.db");
        std::fs::write(&path, b"").unwrap();
        let resolved =
            resolve_database(Some(path.clone()), Some(PathBuf::from("/other.db"))).unwrap();
        assert_eq!(resolved, path);
    }

    #[test]
    fn test_load_retriever_none() {
        assert!(load_retriever(None).unwrap().is_none());
    }

    #[test]
    fn test_load_retriever_missing_dir() {
        assert!(load_retriever(Some(PathBuf::from("/nonexistent/docs"))).is_err());
    }

    #[test]
    fn test_load_retriever_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_retriever(Some(dir.path().to_path_buf())).unwrap().is_none());
    }

    #[test]
    fn test_load_retriever_with_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("glossary.txt"), "GRN means goods receipt note.").unwrap();
        let retriever = load_retriever(Some(dir.path().to_path_buf())).unwrap().unwrap();
        assert_eq!(retriever.len(), 1);
    }

    #[test]
    fn test_get_effective_provider_cli_wins() {
        let provider = get_effective_provider(Some(Provider::Ollama), Some("anthropic")).unwrap();
        assert_eq!(provider, Provider::Ollama);
    }

    #[test]
    fn test_get_effective_provider_from_config() {
        let provider = get_effective_provider(None, Some("Anthropic")).unwrap();
        assert_eq!(provider, Provider::Anthropic);
    }

    #[test]
    fn test_get_effective_provider_alias() {
        let provider = get_effective_provider(None, Some("openai")).unwrap();
        assert_eq!(provider, Provider::OpenAI);
    }

    #[test]
    fn test_get_effective_provider_unknown() {
        assert!(get_effective_provider(None, Some("mystery")).is_err());
    }

    #[test]
    fn test_get_effective_provider_default() {
        assert_eq!(get_effective_provider(None, None).unwrap(), Provider::OpenAI);
    }

    #[test]
    fn test_get_effective_model_explicit() {
        let model = get_effective_model(Some("gpt-4o".to_string()), None, &Provider::OpenAI);
        assert_eq!(model, "gpt-4o");
    }

    #[test]
    fn test_get_effective_model_default() {
        let model = get_effective_model(None, None, &Provider::OpenAI);
        assert_eq!(model, "gpt-4o-mini");
    }

    #[test]
    fn test_get_effective_base_url_default() {
        assert_eq!(get_effective_base_url(None, None), OPENAI_BASE_URL);
    }

    #[test]
    fn test_get_effective_base_url_from_config() {
        let url = get_effective_base_url(None, Some("https://openrouter.ai/api/v1".into()));
        assert_eq!(url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_get_effective_ollama_url_from_config() {
        let url = get_effective_ollama_url(
            "http://localhost:11434".to_string(),
            Some("http://config:11434".to_string())
        );
        assert_eq!(url, "http://config:11434");
    }

    #[test]
    fn test_get_effective_ollama_url_explicit() {
        let url = get_effective_ollama_url(
            "http://custom:11434".to_string(),
            Some("http://other:11434".to_string())
        );
        assert_eq!(url, "http://custom:11434");
    }

    #[test]
    fn test_build_llm_provider_openai_no_key() {
        let result = build_llm_provider(
            Provider::OpenAI,
            None,
            "gpt-4o-mini".to_string(),
            OPENAI_BASE_URL.to_string(),
            DEFAULT_OLLAMA_URL.to_string()
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_build_llm_provider_openai_with_key() {
        let provider = build_llm_provider(
            Provider::OpenAI,
            Some("sk-test".to_string()),
            "gpt-4o-mini".to_string(),
            "https://openrouter.ai/api/v1".to_string(),
            DEFAULT_OLLAMA_URL.to_string()
        )
        .unwrap();
        assert!(matches!(
            provider,
            LlmProvider::OpenAI { ref base_url, .. } if base_url == "https://openrouter.ai/api/v1"
        ));
    }

    #[test]
    fn test_build_llm_provider_ollama() {
        let provider = build_llm_provider(
            Provider::Ollama,
            None,
            "llama3".to_string(),
            OPENAI_BASE_URL.to_string(),
            DEFAULT_OLLAMA_URL.to_string()
        )
        .unwrap();
        assert!(matches!(provider, LlmProvider::Ollama { .. }));
    }

    #[test]
    fn test_create_output_options_json_no_color() {
        let opts = create_output_options(Format::Json, true);
        assert!(matches!(opts.format, OutputFormat::Json));
        assert!(!opts.colored);
    }
}
