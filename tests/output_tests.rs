// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use nl2sql_assistant::{
    executor::{QueryResult, Scalar},
    orchestrator::ChatResponse,
    output::{DryRunInfo, OutputFormat, OutputOptions, format_dry_run, format_response}
};

fn plain(format: OutputFormat) -> OutputOptions {
    OutputOptions {
        format,
        colored: false
    }
}

fn sql_response() -> ChatResponse {
    ChatResponse::Sql {
        query:  "SELECT SUM(stock) FROM items".to_string(),
        raw:    Some(QueryResult::new(
            vec!["SUM(stock)".to_string()],
            vec![vec![Scalar::Integer(52)]]
        )),
        answer: "Result: 52.00".to_string()
    }
}

fn dry_run_info() -> DryRunInfo {
    DryRunInfo {
        mode:            "SQL".to_string(),
        rule:            Some("stock".to_string()),
        filtered_schema: Some("TABLE items: stock".to_string()),
        prompt:          Some("User question: total stock".to_string())
    }
}

#[test]
fn test_output_options_default() {
    let opts = OutputOptions::default();
    assert!(matches!(opts.format, OutputFormat::Text));
    assert!(opts.colored);
}

#[test]
fn test_format_sql_response_text() {
    let output = format_response(&sql_response(), &plain(OutputFormat::Text));
    assert_eq!(
        output,
        "=== Query ===\nSELECT SUM(stock) FROM items\n\n=== Answer ===\nResult: 52.00"
    );
}

#[test]
fn test_format_text_response_text() {
    let response = ChatResponse::Text {
        answer: "A GRN records goods received.".to_string()
    };
    assert_eq!(
        format_response(&response, &plain(OutputFormat::Text)),
        "A GRN records goods received."
    );
}

#[test]
fn test_format_error_response_plain() {
    let response = ChatResponse::Error {
        answer: "Internal Server Error: boom".to_string()
    };
    assert_eq!(
        format_response(&response, &plain(OutputFormat::Text)),
        "Internal Server Error: boom"
    );
}

#[test]
fn test_format_sql_response_json() {
    let output = format_response(&sql_response(), &plain(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["type"], "SQL");
    assert_eq!(value["query"], "SELECT SUM(stock) FROM items");
    assert_eq!(value["answer"], "Result: 52.00");
    assert_eq!(value["raw"]["columns"][0], "SUM(stock)");
    assert_eq!(value["raw"]["rows"][0][0], 52);
}

#[test]
fn test_format_text_response_json() {
    let response = ChatResponse::Text {
        answer: "hi".to_string()
    };
    let output = format_response(&response, &plain(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value, serde_json::json!({"type": "TEXT", "answer": "hi"}));
}

#[test]
fn test_format_response_yaml() {
    let output = format_response(&sql_response(), &plain(OutputFormat::Yaml));
    assert!(output.contains("type: SQL"));
    assert!(output.contains("answer: 'Result: 52.00'") || output.contains("answer: Result: 52.00"));
}

#[test]
fn test_format_dry_run_text() {
    let output = format_dry_run(&dry_run_info(), &plain(OutputFormat::Text));
    assert!(output.starts_with("=== DRY RUN - Would send to LLM ===\n"));
    assert!(output.contains("Mode: SQL (rule: stock)"));
    assert!(output.contains("Schema:\nTABLE items: stock"));
    assert!(output.contains("Prompt:\nUser question: total stock"));
}

#[test]
fn test_format_dry_run_narrative_text() {
    let info = DryRunInfo {
        mode:            "TEXT".to_string(),
        rule:            None,
        filtered_schema: None,
        prompt:          None
    };
    let output = format_dry_run(&info, &plain(OutputFormat::Text));
    assert!(output.contains("Mode: TEXT (rule: default)"));
    assert!(!output.contains("Schema:"));
}

#[test]
fn test_format_dry_run_json() {
    let output = format_dry_run(&dry_run_info(), &plain(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["mode"], "SQL");
    assert_eq!(value["rule"], "stock");
    assert_eq!(value["filtered_schema"], "TABLE items: stock");
}
