//! CLI to internal type conversions.

use crate::{cli::Format, output::OutputFormat};

/// # Example
///
/// ```
/// use nl2sql_assistant::{cli::Format, output::OutputFormat};
///
/// let format = OutputFormat::from(Format::Json);
/// assert!(matches!(format, OutputFormat::Json));
/// ```
impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => Self::Text,
            Format::Json => Self::Json,
            Format::Yaml => Self::Yaml
        }
    }
}
