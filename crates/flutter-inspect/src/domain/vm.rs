//! VM and isolate descriptions, plus the Flutter service extensions used to
//! pull UI dumps out of a running app.

pub const EXT_SEMANTICS_TRAVERSAL_ORDER: &str =
    "ext.flutter.debugDumpSemanticsTreeInTraversalOrder";
pub const EXT_SEMANTICS_INVERSE_HIT_TEST_ORDER: &str =
    "ext.flutter.debugDumpSemanticsTreeInInverseHitTestOrder";
pub const EXT_RENDER_TREE: &str = "ext.flutter.debugDumpRenderTree";
pub const EXT_LAYER_TREE: &str = "ext.flutter.debugDumpLayerTree";
pub const EXT_WIDGET_TREE: &str = "ext.flutter.debugDumpApp";
pub const EXT_WIDGET_SUMMARY_TREE: &str = "ext.flutter.inspector.getRootWidgetSummaryTree";

/// Object group name passed to inspector extensions.
pub const INSPECTOR_GROUP: &str = "flutter-inspect";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SemanticsOrder {
    #[default]
    Traversal,
    InverseHitTest,
}

impl SemanticsOrder {
    pub fn extension(self) -> &'static str {
        match self {
            SemanticsOrder::Traversal => EXT_SEMANTICS_TRAVERSAL_ORDER,
            SemanticsOrder::InverseHitTest => EXT_SEMANTICS_INVERSE_HIT_TEST_ORDER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolateRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    pub isolates: Vec<IsolateRef>,
}

impl VmInfo {
    /// The isolate running the app: the first one whose name mentions
    /// `main`, otherwise the first isolate listed.
    pub fn main_isolate(&self) -> Option<&IsolateRef> {
        self.isolates
            .iter()
            .find(|isolate| isolate.name.to_lowercase().contains("main"))
            .or_else(|| self.isolates.first())
    }
}
