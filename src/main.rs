//! # nl2sql
//!
//! Answer natural-language questions about a SQLite database.
//!
//! Each question is routed to one of two paths:
//!
//! 1. **Structured** - questions about prices, stock, counts or sales. The
//!    relevant part of the database schema is handed to an LLM, which writes a
//!    single SQL statement. The statement is cleaned up, executed, and the
//!    result is turned back into a sentence or a small table.
//!
//! 2. **Narrative** - definitions, explanations and everything else. The LLM
//!    answers in free text, grounded in retrieved documents when a retriever
//!    is configured.
//!
//! # Quick Start
//!
//! ```bash
//! # Ask a question
//! export LLM_API_KEY="sk-..."
//! nl2sql ask "what is the sales price of basmati rice" -d warehouse.db
//!
//! # Use OpenRouter or another OpenAI-compatible endpoint
//! nl2sql ask "how many items are in stock" -d warehouse.db \
//!     --base-url https://openrouter.ai/api/v1 --model mistralai/mistral-7b-instruct
//!
//! # See the routing decision and prompt without calling the model
//! nl2sql ask "list items below reorder level" -d warehouse.db --dry-run
//!
//! # Ground narrative answers in local documents
//! nl2sql ask "what is a GRN" -d warehouse.db --docs ./docs
//!
//! # Inspect the schema the model will see
//! nl2sql schema -d warehouse.db --question "price of rice"
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from (in order of precedence):
//!
//! 1. Command-line arguments
//! 2. Environment variables (`LLM_API_KEY`, `LLM_PROVIDER`, `NL2SQL_DATABASE`,
//!    etc.)
//! 3. `.nl2sql.toml` in current directory
//! 4. `~/.config/nl2sql/config.toml`
//!
//! ## Example Configuration
//!
//! ```toml
//! [llm]
//! provider = "openai"
//! model = "gpt-4o-mini"
//!
//! [database]
//! path = "warehouse.db"
//! ```
//!
//! # Logging
//!
//! Logs go to stderr. `RUST_LOG` controls the filter; `-v` enables debug
//! output, including prompts and generated statements.
//!
//! # Exit Codes
//!
//! - `0` - An answer was produced (including recovered SQL or model errors)
//! - `1` - Internal error or invalid configuration

use std::process;

use clap::Parser;
use tokio::main;
use tracing_subscriber::EnvFilter;

use nl2sql_assistant::{
    app::{AskParams, SchemaParams, run_ask, run_schema},
    cli::{Cli, Commands},
    config::Config,
    error::{AppResult, error_message}
};

#[main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", error_message(&e));
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "nl2sql_assistant=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> AppResult<i32> {
    let config = Config::load()?;

    match cli.command {
        Commands::Ask {
            question,
            database,
            docs,
            provider,
            api_key,
            model,
            base_url,
            ollama_url,
            output_format,
            dry_run,
            no_color
        } => {
            let params = AskParams {
                question,
                database,
                docs,
                provider,
                api_key,
                model,
                base_url,
                ollama_url,
                output_format,
                dry_run,
                no_color
            };
            let result = run_ask(params, config).await?;
            println!("{}", result.output);
            Ok(result.exit_code)
        }
        Commands::Schema {
            database,
            question
        } => {
            let output = run_schema(
                SchemaParams {
                    database,
                    question
                },
                config
            )?;
            println!("{}", output);
            Ok(0)
        }
    }
}
