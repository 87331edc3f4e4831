//! Application logic for the nl2sql CLI.
//!
//! This module contains the command implementations separated from the main
//! entry point to enable testing.

mod ask;
mod convert;
mod helpers;
mod types;

pub use ask::{dry_run, run_ask, run_schema};
pub use helpers::{
    build_llm_provider, calculate_exit_code, create_output_options, get_effective_base_url,
    get_effective_model, get_effective_ollama_url, get_effective_provider, load_retriever,
    resolve_database
};
pub use types::{AskParams, AskResult, SchemaParams};
