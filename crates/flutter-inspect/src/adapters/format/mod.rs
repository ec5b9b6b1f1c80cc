//! Renderers turning flattened semantics into agent-friendly text.

mod json;
mod text;

use clap::ValueEnum;

use crate::domain::SemanticsElement;

pub use json::{format_json, format_json_compact, format_json_lines};
pub use text::{format_compact, format_minimal, format_tree};

#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per element with actions and key flags
    #[default]
    Compact,
    /// Box-drawing tree of the element hierarchy
    Tree,
    /// Labels and actions only
    Minimal,
    /// Pretty JSON document
    Json,
    /// Single-line JSON with short keys
    JsonCompact,
    /// One JSON object per line
    JsonLines,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(
            self,
            OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::JsonLines
        )
    }
}

/// Connection details shown above the element list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub uri: Option<String>,
    pub device: Option<String>,
}

impl DeviceInfo {
    pub fn for_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            device: None,
        }
    }
}

pub fn render(
    elements: &[SemanticsElement],
    format: OutputFormat,
    device: Option<&DeviceInfo>,
) -> String {
    match format {
        OutputFormat::Compact => format_compact(elements, device),
        OutputFormat::Tree => format_tree(elements, device),
        OutputFormat::Minimal => format_minimal(elements),
        OutputFormat::Json => format_json(elements, device),
        OutputFormat::JsonCompact => format_json_compact(elements),
        OutputFormat::JsonLines => format_json_lines(elements),
    }
}

/// Rough token count at ~4 characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

#[cfg(test)]
pub(crate) fn element(label: &str, value: &str, actions: &[&str], depth: usize) -> SemanticsElement {
    SemanticsElement {
        label: label.to_string(),
        value: value.to_string(),
        hint: String::new(),
        actions: actions.iter().map(|a| a.to_string()).collect(),
        flags: Vec::new(),
        depth,
    }
}
