use std::collections::VecDeque;

use thiserror::Error;

use crate::domain::SemanticsOrder;
use crate::usecases::ports::UiDumpSource;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("mock dump failure: {0}")]
pub struct MockDumpError(pub String);

/// Replays queued semantics dumps; an exhausted queue repeats the last one.
#[derive(Default)]
pub struct MockDumpSource {
    semantics: VecDeque<Result<String, MockDumpError>>,
    last_semantics: Option<Result<String, MockDumpError>>,
    widget_tree: String,
    pub semantics_calls: Vec<SemanticsOrder>,
    pub widget_calls: usize,
}

impl MockDumpSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_semantics(mut self, dump: impl Into<String>) -> Self {
        self.semantics.push_back(Ok(dump.into()));
        self
    }

    pub fn with_semantics_error(mut self, message: impl Into<String>) -> Self {
        self.semantics.push_back(Err(MockDumpError(message.into())));
        self
    }

    pub fn with_widget_tree(mut self, dump: impl Into<String>) -> Self {
        self.widget_tree = dump.into();
        self
    }
}

impl UiDumpSource for MockDumpSource {
    type Error = MockDumpError;

    fn semantics_dump(&mut self, order: SemanticsOrder) -> Result<String, Self::Error> {
        self.semantics_calls.push(order);
        if let Some(next) = self.semantics.pop_front() {
            self.last_semantics = Some(next);
        }
        self.last_semantics
            .clone()
            .unwrap_or_else(|| Ok(String::new()))
    }

    fn widget_tree_dump(&mut self) -> Result<String, Self::Error> {
        self.widget_calls += 1;
        Ok(self.widget_tree.clone())
    }
}
