// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use nl2sql_assistant::config::{Config, DEFAULT_TIMEOUT_SECS};

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.llm.provider.is_none());
    assert!(config.llm.api_key.is_none());
    assert_eq!(
        config.llm.ollama_url.as_deref(),
        Some("http://localhost:11434")
    );
    assert_eq!(config.llm.timeout_secs, DEFAULT_TIMEOUT_SECS);
    assert!(config.database.path.is_none());
}

#[test]
fn test_config_from_toml_full() {
    let config = Config::from_toml(
        r#"
[llm]
provider = "anthropic"
model = "claude-sonnet-4-20250514"
base_url = "https://openrouter.ai/api/v1"
timeout_secs = 30

[database]
path = "warehouse.db"
"#
    )
    .unwrap();
    assert_eq!(config.llm.provider.as_deref(), Some("anthropic"));
    assert_eq!(
        config.llm.model.as_deref(),
        Some("claude-sonnet-4-20250514")
    );
    assert_eq!(
        config.llm.base_url.as_deref(),
        Some("https://openrouter.ai/api/v1")
    );
    assert_eq!(config.llm.timeout_secs, 30);
    assert_eq!(config.database.path, Some(PathBuf::from("warehouse.db")));
}

#[test]
fn test_config_from_toml_partial_sections() {
    let config = Config::from_toml("[database]\npath = \"a.db\"\n").unwrap();
    assert_eq!(config.database.path, Some(PathBuf::from("a.db")));
    assert_eq!(config.llm.timeout_secs, DEFAULT_TIMEOUT_SECS);
}

#[test]
fn test_config_from_toml_empty() {
    let config = Config::from_toml("").unwrap();
    assert!(config.database.path.is_none());
}

#[test]
fn test_config_from_toml_invalid() {
    assert!(Config::from_toml("[llm\nprovider = ").is_err());
}

#[test]
fn test_config_from_toml_wrong_type() {
    assert!(Config::from_toml("[llm]\ntimeout_secs = \"soon\"\n").is_err());
}

#[test]
fn test_config_retrieval_section() {
    let config = Config::from_toml("[retrieval]\ndocs_dir = \"docs\"\n").unwrap();
    assert_eq!(config.retrieval.docs_dir, Some(PathBuf::from("docs")));
    assert!(Config::default().retrieval.docs_dir.is_none());
}
