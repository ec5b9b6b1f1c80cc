//! JSON renderers.

use serde::Serialize;

use super::DeviceInfo;
use crate::domain::SemanticsElement;

fn is_empty_str(value: &&str) -> bool {
    value.is_empty()
}

fn is_empty_list(value: &&[String]) -> bool {
    value.is_empty()
}

#[derive(Serialize)]
struct ElementDto<'a> {
    #[serde(skip_serializing_if = "is_empty_str")]
    label: &'a str,
    #[serde(skip_serializing_if = "is_empty_str")]
    value: &'a str,
    #[serde(skip_serializing_if = "is_empty_str")]
    hint: &'a str,
    #[serde(skip_serializing_if = "is_empty_list")]
    actions: &'a [String],
    #[serde(skip_serializing_if = "is_empty_list")]
    flags: &'a [String],
    depth: usize,
}

impl<'a> From<&'a SemanticsElement> for ElementDto<'a> {
    fn from(element: &'a SemanticsElement) -> Self {
        Self {
            label: &element.label,
            value: &element.value,
            hint: &element.hint,
            actions: &element.actions,
            flags: &element.flags,
            depth: element.depth,
        }
    }
}

#[derive(Serialize)]
struct DeviceDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    device: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<&'a str>,
}

#[derive(Serialize)]
struct Document<'a> {
    elements: Vec<ElementDto<'a>>,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    device: Option<DeviceDto<'a>>,
}

/// Short-key element for token-constrained consumers.
#[derive(Serialize)]
struct CompactDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    l: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    v: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    a: Option<&'a [String]>,
}

impl<'a> CompactDto<'a> {
    fn from_element(element: &'a SemanticsElement) -> Option<Self> {
        let label = &element.label;
        let value = &element.value;
        let dto = Self {
            l: (!label.is_empty()).then_some(label.as_str()),
            v: (!value.is_empty() && value != label).then_some(value.as_str()),
            a: (!element.actions.is_empty()).then_some(element.actions.as_slice()),
        };
        (dto.l.is_some() || dto.v.is_some() || dto.a.is_some()).then_some(dto)
    }
}

pub fn format_json(elements: &[SemanticsElement], device: Option<&DeviceInfo>) -> String {
    let document = Document {
        elements: elements.iter().map(ElementDto::from).collect(),
        count: elements.len(),
        device: device.map(|info| DeviceDto {
            device: info.device.as_deref(),
            uri: info.uri.as_deref(),
        }),
    };
    serde_json::to_string_pretty(&document).unwrap_or_default()
}

pub fn format_json_compact(elements: &[SemanticsElement]) -> String {
    let compact: Vec<CompactDto<'_>> = elements
        .iter()
        .filter_map(CompactDto::from_element)
        .collect();
    serde_json::to_string(&compact).unwrap_or_default()
}

pub fn format_json_lines(elements: &[SemanticsElement]) -> String {
    elements
        .iter()
        .filter_map(|element| serde_json::to_string(&ElementDto::from(element)).ok())
        .collect::<Vec<_>>()
        .join("\n")
}
