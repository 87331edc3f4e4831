//! Command execution logic.
//!
//! `run_ask` wires configuration, the SQLite data source, the document corpus
//! and the LLM client into a [`Pipeline`] and renders its response. `dry_run`
//! and `run_schema` never call the model.

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::{
    helpers::{
        build_llm_provider, calculate_exit_code, create_output_options, get_effective_base_url,
        get_effective_model, get_effective_ollama_url, get_effective_provider, load_retriever,
        resolve_database
    },
    types::{AskParams, AskResult, SchemaParams}
};
use crate::{
    config::Config,
    error::AppResult,
    executor::{DataSource, SqliteDataSource},
    intent::{Mode, classify_with_rule},
    llm::LlmClient,
    orchestrator::{Pipeline, narrative_prompt, retrieve_context},
    output::{DryRunInfo, OutputFormat, format_dry_run, format_response},
    retrieval::Retriever,
    schema::{fetch_schema, filter_schema},
    synthesizer::build_prompt
};

/// Describes what a question would trigger without calling the model.
///
/// Structured questions include the filtered schema and the synthesis prompt;
/// narrative questions include the prompt with its retrieved context.
///
/// # Errors
///
/// Returns an error if schema introspection fails.
pub async fn dry_run(
    question: &str,
    source: &dyn DataSource,
    retriever: Option<&dyn Retriever>
) -> AppResult<DryRunInfo> {
    let question = question.trim();
    let (mode, rule) = classify_with_rule(question);
    let (filtered_schema, prompt) = match mode {
        Mode::Structured => {
            let schema = fetch_schema(source)?;
            let filtered = filter_schema(&schema, question);
            let prompt = build_prompt(question, &filtered);
            (Some(filtered), Some(prompt))
        }
        Mode::Narrative => {
            let context = retrieve_context(retriever, question).await;
            (None, Some(narrative_prompt(question, &context)))
        }
    };
    Ok(DryRunInfo {
        mode: mode.to_string(),
        rule: rule.map(String::from),
        filtered_schema,
        prompt
    })
}

/// Runs the ask command.
///
/// # Errors
///
/// Returns an error for configuration problems (missing database, missing API
/// key, unknown provider). Pipeline failures are reported inside the
/// response and reflected in the exit code.
pub async fn run_ask(params: AskParams, config: Config) -> AppResult<AskResult> {
    let database = resolve_database(params.database, config.database.path.clone())?;
    let source = SqliteDataSource::new(&database);
    let output_opts = create_output_options(params.output_format, params.no_color);
    let retriever = load_retriever(params.docs.or(config.retrieval.docs_dir.clone()))?;

    if params.dry_run {
        let retriever = retriever.as_ref().map(|r| r as &dyn Retriever);
        let info = dry_run(&params.question, &source, retriever).await?;
        return Ok(AskResult {
            exit_code: 0,
            output:    format_dry_run(&info, &output_opts)
        });
    }

    let provider = get_effective_provider(params.provider, config.llm.provider.as_deref())?;
    let model_name = get_effective_model(params.model, config.llm.model.clone(), &provider);
    let base_url = get_effective_base_url(params.base_url, config.llm.base_url.clone());
    let ollama_url = get_effective_ollama_url(params.ollama_url, config.llm.ollama_url.clone());
    let api_key = params.api_key.or(config.llm.api_key.clone());
    let llm_provider = build_llm_provider(provider, api_key, model_name, base_url, ollama_url)?;
    info!(
        database = %database.display(),
        model = llm_provider.model(),
        "answering question"
    );

    let client = LlmClient::with_timeout(
        llm_provider,
        Duration::from_secs(config.llm.timeout_secs)
    );
    let mut pipeline = Pipeline::new(Arc::new(source), Arc::new(client));
    if let Some(retriever) = retriever {
        pipeline = pipeline.with_retriever(Arc::new(retriever));
    }

    let pb = if matches!(output_opts.format, OutputFormat::Text) && output_opts.colored {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Thinking...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let response = pipeline.handle(&params.question).await;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    Ok(AskResult {
        exit_code: calculate_exit_code(&response),
        output:    format_response(&response, &output_opts)
    })
}

/// Runs the schema command.
///
/// # Errors
///
/// Returns an error if the database cannot be resolved or introspected.
pub fn run_schema(params: SchemaParams, config: Config) -> AppResult<String> {
    let database = resolve_database(params.database, config.database.path)?;
    let source = SqliteDataSource::new(&database);
    let schema = fetch_schema(&source)?;
    Ok(match params.question {
        Some(question) => filter_schema(&schema, &question),
        None => schema.to_summary()
    })
}
