//! # nl2sql Assistant Library
//!
//! Natural-language question answering over a relational database.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod intent;
pub mod llm;
pub mod orchestrator;
pub mod output;
pub mod retrieval;
pub mod sanitizer;
pub mod schema;
pub mod synthesizer;
