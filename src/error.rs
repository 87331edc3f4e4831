pub use masterror::{AppError, AppResult};

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create LLM API error
pub fn llm_api_error(message: impl Into<String>) -> AppError {
    AppError::service(message.into())
}

/// Create HTTP error
pub fn http_error(err: reqwest::Error) -> AppError {
    let msg = if err.is_timeout() {
        format!("Request timeout: {}", err)
    } else if err.is_connect() {
        format!("Connection failed: {}", err)
    } else if err.is_status() {
        format!("HTTP error {}: {}", err.status().unwrap_or_default(), err)
    } else if err.is_decode() {
        format!("Malformed response body: {}", err)
    } else {
        err.to_string()
    };
    AppError::service(msg)
}

/// Create data source error from a SQLite failure
pub fn data_source_error(err: rusqlite::Error) -> AppError {
    let msg = match &err {
        rusqlite::Error::SqliteFailure(code, Some(detail)) => {
            format!("{} ({:?})", detail, code.code)
        }
        rusqlite::Error::SqliteFailure(code, None) => format!("{:?}", code.code),
        other => other.to_string()
    };
    AppError::internal(format!("Data source error: {}", msg))
}

/// Message carried by an error, or its kind label when it has none.
///
/// `Display` on [`AppError`] renders only the kind, so anything shown to a
/// user goes through this.
///
/// # Example
///
/// ```
/// use nl2sql_assistant::error::{error_message, internal_error};
///
/// assert_eq!(error_message(&internal_error("boom details")), "boom details");
/// ```
pub fn error_message(err: &AppError) -> String {
    err.render_message().into_owned()
}

/// Create internal error
pub fn internal_error(message: impl Into<String>) -> AppError {
    AppError::internal(message.into())
}
