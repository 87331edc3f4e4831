//! Request orchestration.
//!
//! [`Pipeline`] ties classification, schema filtering, synthesis,
//! sanitization, execution and formatting into one request-response cycle,
//! with a retrieval-augmented narrative path for everything else.
//!
//! # Failure Handling
//!
//! [`Pipeline::handle`] never fails. Every outcome is one of the three
//! [`ChatResponse`] shapes:
//!
//! | Failure | Response |
//! |---------|----------|
//! | no usable statement | `SQL` with an apology, nothing executed |
//! | execution error | `SQL` with `SQL Execution Error: ...` and the query |
//! | model error on the narrative path | `TEXT` with `Model error: ...` |
//! | anything else | `ERROR` with `Internal Server Error: ...` |
//!
//! # Concurrency
//!
//! A pipeline holds only shared handles to its collaborators and no
//! per-request state, so one instance can serve concurrent requests. Within a
//! request the model call and the database round trips happen one after
//! another. Database work runs on the blocking thread pool.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    error::{AppResult, error_message, internal_error},
    executor::{DataSource, QueryResult},
    formatter::format_result,
    intent::{Mode, classify_with_rule},
    llm::LanguageModel,
    retrieval::{DEFAULT_TOP_K, Retriever},
    sanitizer::{is_sentinel, sanitize},
    schema::{fetch_schema, filter_schema},
    synthesizer::synthesize
};

/// Answer given when no valid statement could be produced
pub const NO_SQL_ANSWER: &str = "I couldn't generate a valid SQL query for that question.";

/// Answer given when the narrative model returned nothing
pub const EMPTY_REPLY_ANSWER: &str = "The model didn't return any message. Please try again.";

/// System instruction for narrative answers
pub const NARRATIVE_SYSTEM_PROMPT: &str =
    "You are a helpful warehouse assistant. Use the retrieved context if relevant.";

/// Sampling temperature for narrative answers
pub const NARRATIVE_TEMPERATURE: f32 = 1.0;

/// Response returned to the caller.
///
/// Serializes to `{"type": "SQL" | "TEXT" | "ERROR", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ChatResponse {
    #[serde(rename = "SQL")]
    Sql {
        query:  String,
        #[serde(skip_serializing_if = "Option::is_none")]
        raw:    Option<QueryResult>,
        answer: String
    },
    #[serde(rename = "TEXT")]
    Text { answer: String },
    #[serde(rename = "ERROR")]
    Error { answer: String }
}

impl ChatResponse {
    pub fn answer(&self) -> &str {
        match self {
            Self::Sql {
                answer, ..
            }
            | Self::Text {
                answer
            }
            | Self::Error {
                answer
            } => answer
        }
    }

    /// Response type tag as serialized
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sql {
                ..
            } => "SQL",
            Self::Text {
                ..
            } => "TEXT",
            Self::Error {
                ..
            } => "ERROR"
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Explicitly constructed request context.
#[derive(Clone)]
pub struct Pipeline {
    source:    Arc<dyn DataSource>,
    model:     Arc<dyn LanguageModel>,
    retriever: Option<Arc<dyn Retriever>>
}

impl Pipeline {
    pub fn new(source: Arc<dyn DataSource>, model: Arc<dyn LanguageModel>) -> Self {
        Self {
            source,
            model,
            retriever: None
        }
    }

    /// Attach a retriever for the narrative path
    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Answer a question.
    ///
    /// Never fails; see the module documentation for the response shapes.
    #[instrument(skip(self), fields(mode = tracing::field::Empty))]
    pub async fn handle(&self, question: &str) -> ChatResponse {
        match self.try_handle(question.trim()).await {
            Ok(response) => response,
            Err(e) => {
                let message = error_message(&e);
                error!(error = %message, "request failed");
                ChatResponse::Error {
                    answer: format!("Internal Server Error: {}", message)
                }
            }
        }
    }

    async fn try_handle(&self, question: &str) -> AppResult<ChatResponse> {
        let (mode, rule) = classify_with_rule(question);
        tracing::Span::current().record("mode", tracing::field::display(mode));
        info!(%mode, rule = rule.unwrap_or("default"), "mode decided");
        match mode {
            Mode::Structured => self.answer_structured(question).await,
            Mode::Narrative => Ok(self.answer_narrative(question).await)
        }
    }

    /// Build the filtered schema text used to ground synthesis.
    pub async fn filtered_schema(&self, question: &str) -> AppResult<String> {
        let source = Arc::clone(&self.source);
        let schema = tokio::task::spawn_blocking(move || fetch_schema(source.as_ref()))
            .await
            .map_err(|e| internal_error(format!("Schema task failed: {}", e)))??;
        Ok(filter_schema(&schema, question))
    }

    async fn answer_structured(&self, question: &str) -> AppResult<ChatResponse> {
        let filtered = self.filtered_schema(question).await?;
        let raw = synthesize(self.model.as_ref(), question, &filtered).await;
        let query = sanitize(&raw);
        debug!(query = %query, "sanitized statement");

        if is_sentinel(&query) {
            return Ok(ChatResponse::Sql {
                query,
                raw: None,
                answer: NO_SQL_ANSWER.to_string()
            });
        }

        let source = Arc::clone(&self.source);
        let statement = query.clone();
        let executed = tokio::task::spawn_blocking(move || source.execute(&statement))
            .await
            .map_err(|e| internal_error(format!("Execution task failed: {}", e)))?;

        match executed {
            Ok(result) => {
                let answer = format_result(&result, question);
                Ok(ChatResponse::Sql {
                    query,
                    raw: Some(result),
                    answer
                })
            }
            Err(e) => {
                let message = error_message(&e);
                error!(error = %message, query = %query, "statement execution failed");
                Ok(ChatResponse::Sql {
                    query,
                    raw: None,
                    answer: format!("SQL Execution Error: {}", message)
                })
            }
        }
    }

    async fn answer_narrative(&self, question: &str) -> ChatResponse {
        let context = retrieve_context(self.retriever.as_deref(), question).await;
        let prompt = narrative_prompt(question, &context);
        match self
            .model
            .complete(NARRATIVE_SYSTEM_PROMPT, &prompt, NARRATIVE_TEMPERATURE)
            .await
        {
            Ok(completion) if !completion.is_blank() => ChatResponse::Text {
                answer: completion.text
            },
            Ok(_) => {
                warn!("model returned an empty reply");
                ChatResponse::Text {
                    answer: EMPTY_REPLY_ANSWER.to_string()
                }
            }
            Err(e) => {
                let message = error_message(&e);
                warn!(error = %message, "narrative generation failed");
                ChatResponse::Text {
                    answer: format!("Model error: {}", message)
                }
            }
        }
    }
}

/// Top-[`DEFAULT_TOP_K`] document texts for a question, blank-line separated.
///
/// A missing retriever or a failed retrieval yields an empty context.
pub async fn retrieve_context(retriever: Option<&dyn Retriever>, question: &str) -> String {
    let Some(retriever) = retriever else {
        debug!("no retriever configured, answering without context");
        return String::new();
    };
    match retriever.retrieve_top_k(question, DEFAULT_TOP_K).await {
        Ok(docs) => {
            let texts: Vec<&str> = docs
                .iter()
                .map(|d| d.text.as_str())
                .filter(|t| !t.trim().is_empty())
                .collect();
            debug!(documents = texts.len(), "retrieved context");
            texts.join("\n\n")
        }
        Err(e) => {
            warn!(error = %error_message(&e), "retrieval failed, answering without context");
            String::new()
        }
    }
}

/// Build the narrative prompt from a question and retrieved context
pub fn narrative_prompt(question: &str, context: &str) -> String {
    format!("Question: {}\n\nContext:\n{}", question, context)
}
