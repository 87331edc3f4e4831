use colored::Colorize;
use serde::Serialize;

use crate::orchestrator::ChatResponse;

/// Output format for results
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true
        }
    }
}

/// What a question would trigger, without calling the model
#[derive(Debug, Clone, Serialize)]
pub struct DryRunInfo {
    pub mode:            String,
    pub rule:            Option<String>,
    pub filtered_schema: Option<String>,
    pub prompt:          Option<String>
}

/// Format a pipeline response based on output options
pub fn format_response(response: &ChatResponse, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(response).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(response).unwrap_or_default(),
        OutputFormat::Text => format_text_response(response, opts)
    }
}

fn format_text_response(response: &ChatResponse, opts: &OutputOptions) -> String {
    match response {
        ChatResponse::Sql {
            query,
            answer,
            ..
        } => {
            let mut output = String::new();
            output.push_str(&heading("Query", opts));
            output.push_str(query);
            output.push_str("\n\n");
            output.push_str(&heading("Answer", opts));
            output.push_str(answer);
            output
        }
        ChatResponse::Text {
            answer
        } => answer.clone(),
        ChatResponse::Error {
            answer
        } => {
            if opts.colored {
                answer.red().to_string()
            } else {
                answer.clone()
            }
        }
    }
}

/// Format dry run information
pub fn format_dry_run(info: &DryRunInfo, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(info).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(info).unwrap_or_default(),
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&heading("DRY RUN - Would send to LLM", opts));
            output.push_str(&format!(
                "Mode: {} (rule: {})\n",
                info.mode,
                info.rule.as_deref().unwrap_or("default")
            ));
            if let Some(schema) = &info.filtered_schema {
                output.push_str(&format!("\nSchema:\n{}\n", schema));
            }
            if let Some(prompt) = &info.prompt {
                output.push_str(&format!("\nPrompt:\n{}", prompt));
            }
            output
        }
    }
}

fn heading(title: &str, opts: &OutputOptions) -> String {
    let line = format!("=== {} ===\n", title);
    if opts.colored {
        format!("{}\n", line.trim_end().bold())
    } else {
        line
    }
}
