use crate::domain::SemanticsOrder;

/// Something that can hand out the app's UI dumps as text.
pub trait UiDumpSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn semantics_dump(&mut self, order: SemanticsOrder) -> Result<String, Self::Error>;

    /// `debugDumpApp` output; used when the semantics tree is empty.
    fn widget_tree_dump(&mut self) -> Result<String, Self::Error>;
}
