//! Plain-text renderers.

use super::DeviceInfo;
use crate::domain::SemanticsElement;

const RULE_WIDTH: usize = 40;
const MAX_INDENT_LEVELS: usize = 4;

/// Flags worth surfacing to an agent; the rest is layout noise.
const IMPORTANT_FLAGS: &[&str] = &[
    "isButton",
    "isLink",
    "isHeader",
    "isTextField",
    "isSlider",
    "isChecked",
    "isSelected",
    "isEnabled",
    "isDisabled",
    "isFocused",
    "hasCheckedState",
    "hasSelectedState",
    "hasEnabledState",
    "isReadOnly",
    "isMultiline",
    "isHidden",
    "isImage",
    "isLiveRegion",
];

fn push_header(lines: &mut Vec<String>, device: Option<&DeviceInfo>) {
    let Some(device) = device else {
        return;
    };
    if let Some(name) = device.device.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("Device: {name}"));
    }
    if let Some(uri) = device.uri.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("Connected: {uri}"));
    }
    lines.push(String::new());
}

fn compact_line(element: &SemanticsElement) -> Option<String> {
    let mut parts = Vec::new();
    if !element.label.is_empty() {
        parts.push(format!("\"{}\"", element.label));
    }
    if !element.value.is_empty() && element.value != element.label {
        parts.push(format!("[{}]", element.value));
    }
    if !element.hint.is_empty() {
        parts.push(format!("({})", element.hint));
    }
    if parts.is_empty() {
        return None;
    }

    if !element.actions.is_empty() {
        parts.push(format!("<{}>", element.actions.join(", ")));
    }
    let flags: Vec<&str> = element
        .flags
        .iter()
        .map(String::as_str)
        .filter(|flag| IMPORTANT_FLAGS.contains(flag))
        .collect();
    if !flags.is_empty() {
        parts.push(format!("{{{}}}", flags.join(", ")));
    }

    let indent = "  ".repeat(element.depth.min(MAX_INDENT_LEVELS));
    Some(format!("{indent}{}", parts.join(" ")))
}

pub fn format_compact(elements: &[SemanticsElement], device: Option<&DeviceInfo>) -> String {
    let mut lines = Vec::new();
    push_header(&mut lines, device);

    lines.push("UI Elements:".to_string());
    lines.push("-".repeat(RULE_WIDTH));
    lines.extend(elements.iter().filter_map(compact_line));
    lines.push("-".repeat(RULE_WIDTH));
    lines.push(format!("Total: {} elements", elements.len()));

    lines.join("\n")
}

fn tree_content(element: &SemanticsElement) -> Option<String> {
    let mut parts = Vec::new();
    if !element.label.is_empty() {
        parts.push(format!("\"{}\"", element.label));
    } else if !element.value.is_empty() {
        parts.push(format!("[{}]", element.value));
    }
    if !element.actions.is_empty() {
        parts.push(format!("<{}>", element.actions.join(", ")));
    }
    (!parts.is_empty()).then(|| parts.join(" "))
}

pub fn format_tree(elements: &[SemanticsElement], device: Option<&DeviceInfo>) -> String {
    let mut lines = Vec::new();
    push_header(&mut lines, device);

    lines.push("UI Structure:".to_string());
    lines.push(String::new());

    for (i, element) in elements.iter().enumerate() {
        let depth = element.depth;
        let is_last = elements
            .get(i + 1)
            .is_none_or(|next| next.depth <= depth);

        let prefix = if depth == 0 {
            String::new()
        } else {
            let connector = if is_last { "└── " } else { "├── " };
            format!("{}{connector}", "│   ".repeat(depth - 1))
        };

        if let Some(content) = tree_content(element) {
            lines.push(format!("{prefix}{content}"));
        }
    }

    lines.push(String::new());
    lines.push(format!("({} elements)", elements.len()));

    lines.join("\n")
}

pub fn format_minimal(elements: &[SemanticsElement]) -> String {
    elements
        .iter()
        .filter_map(|element| {
            let text = element.display_text();
            if text.is_empty() {
                return None;
            }
            Some(if element.actions.is_empty() {
                format!("\"{text}\"")
            } else {
                format!("\"{text}\" [{}]", element.actions.join(", "))
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}
