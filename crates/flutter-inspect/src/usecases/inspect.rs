//! Single-shot UI inspection.

use crate::domain::{
    SemanticsElement, SemanticsOrder, count_nodes, flatten_meaningful, parse_semantics_dump,
};
use crate::usecases::ports::UiDumpSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InspectMode {
    #[default]
    Semantics,
    RawSemantics,
    WidgetTree,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InspectOutput {
    Elements {
        elements: Vec<SemanticsElement>,
        node_count: usize,
    },
    RawDump(String),
    /// `fallback` is set when the semantics tree had nothing meaningful.
    WidgetTree { text: String, fallback: bool },
}

pub struct InspectUseCase {
    order: SemanticsOrder,
}

impl InspectUseCase {
    pub fn new(order: SemanticsOrder) -> Self {
        Self { order }
    }

    pub fn execute<S: UiDumpSource>(
        &self,
        source: &mut S,
        mode: InspectMode,
    ) -> Result<InspectOutput, S::Error> {
        match mode {
            InspectMode::RawSemantics => Ok(InspectOutput::RawDump(
                source.semantics_dump(self.order)?,
            )),
            InspectMode::WidgetTree => Ok(InspectOutput::WidgetTree {
                text: source.widget_tree_dump()?,
                fallback: false,
            }),
            InspectMode::Semantics => {
                let (elements, node_count) = self.snapshot(source)?;
                if elements.is_empty() {
                    return Ok(InspectOutput::WidgetTree {
                        text: source.widget_tree_dump()?,
                        fallback: true,
                    });
                }
                Ok(InspectOutput::Elements {
                    elements,
                    node_count,
                })
            }
        }
    }

    /// Fetches and flattens the semantics tree without any fallback.
    pub fn snapshot<S: UiDumpSource>(
        &self,
        source: &mut S,
    ) -> Result<(Vec<SemanticsElement>, usize), S::Error> {
        let dump = source.semantics_dump(self.order)?;
        let forest = parse_semantics_dump(&dump);
        Ok((flatten_meaningful(&forest), count_nodes(&forest)))
    }
}
