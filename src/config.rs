//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.nl2sql.toml` in current directory
//! 4. `~/.config/nl2sql/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [llm]
//! provider = "openai"          # openai, anthropic, ollama
//! model = "gpt-4o-mini"
//! api_key = "sk-..."           # or use LLM_API_KEY env var
//! base_url = "https://openrouter.ai/api/v1"
//! ollama_url = "http://localhost:11434"
//! timeout_secs = 120
//!
//! [database]
//! path = "warehouse.db"
//!
//! [retrieval]
//! docs_dir = "docs"            # .csv, .txt and .md files for narrative answers
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `LLM_API_KEY` | API key for OpenAI-compatible endpoints or Anthropic |
//! | `LLM_PROVIDER` | Provider name |
//! | `LLM_MODEL` | Model identifier |
//! | `LLM_BASE_URL` | Base URL of an OpenAI-compatible endpoint |
//! | `OLLAMA_URL` | Ollama base URL |
//! | `NL2SQL_DATABASE` | Path to the SQLite database |
//! | `NL2SQL_DOCS` | Directory of documents for narrative answers |

use std::{env, fs, path::PathBuf};

use serde::Deserialize;

use crate::error::{AppResult, config_error, file_read_error};

/// Default request timeout for model calls, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm:       LlmConfig,
    #[serde(default)]
    pub database:  DatabaseConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig
}

/// LLM provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub provider:     Option<String>,
    pub api_key:      Option<String>,
    pub model:        Option<String>,
    pub base_url:     Option<String>,
    pub ollama_url:   Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider:     None,
            api_key:      None,
            model:        None,
            base_url:     None,
            ollama_url:   Some(String::from("http://localhost:11434")),
            timeout_secs: DEFAULT_TIMEOUT_SECS
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Relational data source configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: Option<PathBuf>
}

/// Narrative retrieval configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RetrievalConfig {
    /// Directory holding the document corpus
    pub docs_dir: Option<PathBuf>
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.nl2sql.toml)
    /// 3. Config file in home directory (~/.config/nl2sql/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("nl2sql")
                .join("config.toml");
            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        // Current directory config overrides home config
        let local_config = PathBuf::from(".nl2sql.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        config.apply_env();
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }

    fn from_file(path: &PathBuf) -> AppResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| file_read_error(&path.display().to_string(), e))?;
        Self::from_toml(&content)
    }

    fn apply_env(&mut self) {
        if let Ok(api_key) = env::var("LLM_API_KEY") {
            self.llm.api_key = Some(api_key);
        }
        if let Ok(provider) = env::var("LLM_PROVIDER") {
            self.llm.provider = Some(provider);
        }
        if let Ok(model) = env::var("LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Ok(url) = env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Ok(url) = env::var("OLLAMA_URL") {
            self.llm.ollama_url = Some(url);
        }
        if let Ok(path) = env::var("NL2SQL_DATABASE") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Ok(dir) = env::var("NL2SQL_DOCS") {
            self.retrieval.docs_dir = Some(PathBuf::from(dir));
        }
    }
}
