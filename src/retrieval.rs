//! Document retrieval for the narrative path.
//!
//! The pipeline only depends on the [`Retriever`] trait. [`KeywordRetriever`]
//! is a small in-memory implementation that ranks documents by term overlap
//! with the question.
//!
//! # Document Corpus
//!
//! [`KeywordRetriever::from_dir`] loads every supported file of a directory:
//!
//! | Extension | Documents |
//! |-----------|-----------|
//! | `.csv` | one per record, as `header: value` lines |
//! | `.txt`, `.md` | one per paragraph, long paragraphs split into overlapping chunks |
//!
//! Other files are skipped. A file that fails to load is logged and skipped
//! so one bad file does not disable retrieval.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf}
};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{AppResult, error_message, file_read_error, internal_error};

/// Number of documents requested per narrative question
pub const DEFAULT_TOP_K: usize = 3;

/// Maximum characters per text chunk
pub const CHUNK_SIZE: usize = 500;

/// Characters shared by consecutive chunks of one paragraph
pub const CHUNK_OVERLAP: usize = 50;

/// A retrieved passage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub text:     String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text:     text.into(),
            metadata: None
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Retrieval collaborator.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Up to `k` documents relevant to the question, best first
    async fn retrieve_top_k(&self, question: &str, k: usize) -> AppResult<Vec<Document>>;
}

/// In-memory retriever scoring documents by shared lower-cased terms.
#[derive(Debug, Clone, Default)]
pub struct KeywordRetriever {
    documents: Vec<Document>
}

impl KeywordRetriever {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents
        }
    }

    /// Load a document corpus from a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory itself cannot be read.
    pub fn from_dir(dir: &Path) -> AppResult<Self> {
        let entries =
            fs::read_dir(dir).map_err(|e| file_read_error(&dir.display().to_string(), e))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut documents = Vec::new();
        for path in &paths {
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            let loaded = match extension.as_deref() {
                Some("csv") => load_csv(path),
                Some("txt" | "md") => load_text(path),
                _ => {
                    debug!(path = %path.display(), "skipping unsupported document");
                    continue;
                }
            };
            match loaded {
                Ok(docs) => {
                    debug!(path = %path.display(), documents = docs.len(), "document loaded");
                    documents.extend(docs);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %error_message(&e), "skipping document");
                }
            }
        }
        info!(dir = %dir.display(), documents = documents.len(), "document corpus loaded");
        Ok(Self::new(documents))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn load_csv(path: &Path) -> AppResult<Vec<Document>> {
    let source = path.display().to_string();
    let csv_error = |e: csv::Error| internal_error(format!("Failed to read CSV '{}': {}", source, e));
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;
    let headers = rdr.headers().map_err(csv_error)?.clone();
    let mut documents = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let text = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| format!("{}: {}", header, value))
            .collect::<Vec<_>>()
            .join("\n");
        documents.push(Document::new(text).with_metadata(json!({"source": source, "row": row})));
    }
    Ok(documents)
}

fn load_text(path: &Path) -> AppResult<Vec<Document>> {
    let source = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| file_read_error(&source, e))?;
    Ok(chunk_text(&content)
        .into_iter()
        .map(|chunk| Document::new(chunk).with_metadata(json!({"source": source})))
        .collect())
}

/// Split text into paragraphs, then paragraphs into bounded chunks.
fn chunk_text(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    let step = CHUNK_SIZE - CHUNK_OVERLAP;
    let mut chunks = Vec::new();
    for paragraph in paragraphs {
        let chars: Vec<char> = paragraph.chars().collect();
        if chars.len() <= CHUNK_SIZE {
            chunks.push(paragraph);
            continue;
        }
        let mut start = 0;
        loop {
            let end = (start + CHUNK_SIZE).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
    }
    chunks
}

fn terms(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(String::from)
        .collect()
}

#[async_trait]
impl Retriever for KeywordRetriever {
    async fn retrieve_top_k(&self, question: &str, k: usize) -> AppResult<Vec<Document>> {
        let wanted = terms(question);
        let mut scored: Vec<(usize, usize)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(idx, doc)| (idx, terms(&doc.text).intersection(&wanted).count()))
            .filter(|(_, score)| *score > 0)
            .collect();
        // Stable sort keeps corpus order among equal scores
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(idx, _)| self.documents[idx].clone())
            .collect())
    }
}
