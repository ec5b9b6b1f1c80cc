//! Parser for the textual semantics dump produced by
//! `debugDumpSemanticsTreeIn*Order`.
//!
//! The dump nests nodes with box-drawing prefixes:
//!
//! ```text
//! SemanticsNode#1
//!  │ Rect.fromLTRB(0.0, 0.0, 800.0, 600.0)
//!  │
//!  └─SemanticsNode#2
//!     actions: tap
//!     label: "Sign in"
//! ```
//!
//! Parsing never fails: lines that match no rule are skipped.

use std::sync::OnceLock;

use regex::Regex;

use super::semantics::{Rect, SemanticsNode};

const NODE_MARKER: &str = "SemanticsNode#";
const TREE_PREFIX_CHARS: &[char] = &[' ', '│', '├', '└', '─'];

#[expect(clippy::expect_used, reason = "Pattern is a literal")]
fn rect_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"Rect\.fromLTRB\(\s*(-?[\d.]+)\s*,\s*(-?[\d.]+)\s*,\s*(-?[\d.]+)\s*,\s*(-?[\d.]+)\s*\)",
        )
        .expect("rect pattern compiles")
    })
}

/// Partially built node; children are arena indices until the scan ends.
#[derive(Default)]
struct Slot {
    node: SemanticsNode,
    children: Vec<usize>,
}

pub fn parse_semantics_dump(dump: &str) -> Vec<SemanticsNode> {
    let dump = dump.trim();
    if dump.is_empty() {
        return Vec::new();
    }

    let mut slots: Vec<Slot> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<usize> = None;

    for raw_line in dump.split('\n') {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let (indent, content) = split_indent(line);

        if let Some(rest) = content.strip_prefix(NODE_MARKER) {
            let index = slots.len();
            slots.push(Slot {
                node: SemanticsNode::new(parse_node_id(rest)),
                children: Vec::new(),
            });

            while stack.last().is_some_and(|&(depth, _)| depth >= indent) {
                stack.pop();
            }
            match stack.last() {
                Some(&(_, parent)) => slots[parent].children.push(index),
                None => roots.push(index),
            }
            stack.push((indent, index));
            current = Some(index);
        } else if let Some(index) = current {
            let content = content.trim();
            if !content.is_empty() {
                apply_property(&mut slots[index].node, content);
            }
        }
    }

    roots
        .into_iter()
        .map(|index| assemble(&mut slots, index))
        .collect()
}

/// Strips the tree-drawing prefix and reports how many characters it held.
fn split_indent(line: &str) -> (usize, &str) {
    let content = line.trim_start_matches(TREE_PREFIX_CHARS);
    let indent = line[..line.len() - content.len()].chars().count();
    (indent, content)
}

/// `1`, `12(...)` or `3 leaf` → the leading integer.
fn parse_node_id(rest: &str) -> Option<u64> {
    let token = rest.split_whitespace().next()?;
    let token = token.split('(').next().unwrap_or(token);
    token.parse().ok()
}

fn apply_property(node: &mut SemanticsNode, line: &str) {
    if let Some(rest) = line.strip_prefix("label:") {
        node.label = unquote(rest);
    } else if let Some(rest) = line.strip_prefix("hint:") {
        node.hint = unquote(rest);
    } else if let Some(rest) = line.strip_prefix("value:") {
        node.value = unquote(rest);
    } else if let Some(rest) = line.strip_prefix("actions:") {
        node.actions = split_list(rest);
    } else if let Some(rest) = line.strip_prefix("flags:") {
        node.flags = split_list(rest);
    } else if line.starts_with("Rect.") {
        if let Some(rect) = parse_rect(line) {
            node.rect = Some(rect);
        }
    }
}

fn unquote(raw: &str) -> String {
    raw.trim().trim_matches('"').to_string()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_rect(line: &str) -> Option<Rect> {
    let caps = rect_regex().captures(line)?;
    let coord = |i: usize| caps.get(i)?.as_str().parse::<f64>().ok();
    Some(Rect {
        left: coord(1)?,
        top: coord(2)?,
        right: coord(3)?,
        bottom: coord(4)?,
    })
}

fn assemble(slots: &mut [Slot], index: usize) -> SemanticsNode {
    let child_indices = std::mem::take(&mut slots[index].children);
    let mut node = std::mem::take(&mut slots[index].node);
    node.children = child_indices
        .into_iter()
        .map(|child| assemble(slots, child))
        .collect();
    node
}
