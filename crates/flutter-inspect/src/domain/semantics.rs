//! Semantics tree model.

/// Screen-space bounds of a semantics node, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemanticsNode {
    pub id: Option<u64>,
    pub label: String,
    pub hint: String,
    pub value: String,
    pub flags: Vec<String>,
    pub actions: Vec<String>,
    pub rect: Option<Rect>,
    pub children: Vec<SemanticsNode>,
}

impl SemanticsNode {
    pub fn new(id: Option<u64>) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// A node is worth showing when it carries text or can be acted upon.
    pub fn is_meaningful(&self) -> bool {
        !self.label.is_empty() || !self.value.is_empty() || !self.actions.is_empty()
    }
}

/// Flattened view of a meaningful node, as consumed by the formatters.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticsElement {
    pub label: String,
    pub value: String,
    pub hint: String,
    pub actions: Vec<String>,
    pub flags: Vec<String>,
    pub depth: usize,
}

impl SemanticsElement {
    fn from_node(node: &SemanticsNode, depth: usize) -> Self {
        Self {
            label: node.label.clone(),
            value: node.value.clone(),
            hint: node.hint.clone(),
            actions: node.actions.clone(),
            flags: node.flags.clone(),
            depth,
        }
    }

    /// Label when present, otherwise the value.
    pub fn display_text(&self) -> &str {
        if self.label.is_empty() {
            &self.value
        } else {
            &self.label
        }
    }
}

/// Pre-order walk collecting meaningful nodes.
///
/// Depth counts forest levels, so a meaningful child of a skipped container
/// still reports its real nesting.
pub fn flatten_meaningful(roots: &[SemanticsNode]) -> Vec<SemanticsElement> {
    let mut out = Vec::new();
    for root in roots {
        collect(root, 0, &mut out);
    }
    out
}

fn collect(node: &SemanticsNode, depth: usize, out: &mut Vec<SemanticsElement>) {
    if node.is_meaningful() {
        out.push(SemanticsElement::from_node(node, depth));
    }
    for child in &node.children {
        collect(child, depth + 1, out);
    }
}

pub fn count_nodes(roots: &[SemanticsNode]) -> usize {
    roots
        .iter()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}
