//! Output rendering for classification results.

use clap::ValueEnum;
use spendtag_core::{ClassificationInput, ClassificationResult, Label};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One JSON object per result, the same shape the HTTP endpoint returns.
    Json,
    /// Aligned columns: category, source, title.
    Text,
}

/// Render one result as a single line.
pub fn render(
    input: &ClassificationInput,
    result: &ClassificationResult,
    format: Format,
) -> anyhow::Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string(result)?),
        Format::Text => Ok(format!(
            "{:<14} {:<10} {}",
            result.category.as_str(),
            result.source.as_str(),
            input.title.trim()
        )),
    }
}

/// The label set, one per line.
pub fn render_labels() -> String {
    Label::ALL
        .iter()
        .map(Label::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}
