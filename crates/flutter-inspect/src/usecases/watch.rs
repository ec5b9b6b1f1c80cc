//! Change tracking for watch mode.

/// Remembers the last rendered snapshot and numbers each distinct one.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Option<String>,
    updates: usize,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the update number when `output` differs from the previous
    /// snapshot, `None` when nothing changed.
    pub fn observe(&mut self, output: &str) -> Option<usize> {
        if self.last.as_deref() == Some(output) {
            return None;
        }
        self.last = Some(output.to_string());
        self.updates += 1;
        Some(self.updates)
    }

    pub fn updates(&self) -> usize {
        self.updates
    }
}
