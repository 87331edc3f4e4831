use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// nl2sql - Answer questions about your data with LLM-generated SQL
#[derive(Parser, Debug)]
#[command(name = "nl2sql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a natural-language question
    Ask {
        /// The question to answer
        question: String,

        /// Path to the SQLite database
        #[arg(short, long, env = "NL2SQL_DATABASE")]
        database: Option<PathBuf>,

        /// Directory of .csv, .txt and .md documents for narrative answers
        #[arg(long, env = "NL2SQL_DOCS")]
        docs: Option<PathBuf>,

        /// LLM provider to use
        #[arg(short, long, value_enum)]
        provider: Option<Provider>,

        /// API key for OpenAI-compatible endpoints or Anthropic
        #[arg(short, long, env = "LLM_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model name
        #[arg(short, long)]
        model: Option<String>,

        /// Base URL of an OpenAI-compatible endpoint
        #[arg(long)]
        base_url: Option<String>,

        /// Ollama base URL
        #[arg(long, default_value = "http://localhost:11434")]
        ollama_url: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Show the routing decision and prompt without calling the model
        #[arg(long)]
        dry_run: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },
    /// Print the database schema, optionally filtered for a question
    Schema {
        /// Path to the SQLite database
        #[arg(short, long, env = "NL2SQL_DATABASE")]
        database: Option<PathBuf>,

        /// Only show tables and columns relevant to this question
        #[arg(short, long)]
        question: Option<String>
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    #[value(alias = "openai")]
    OpenAI,
    Anthropic,
    Ollama
}

impl Provider {
    /// Get default model for provider
    pub fn default_model(&self) -> &str {
        match self {
            Self::OpenAI => "gpt-4o-mini",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::Ollama => "llama3.2"
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
