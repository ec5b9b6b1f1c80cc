#![deny(clippy::all)]

pub mod dump_parser;
pub mod endpoint;
pub mod semantics;
pub mod vm;

pub use dump_parser::parse_semantics_dump;
pub use endpoint::DiscoveryMethod;
pub use endpoint::EndpointCandidate;
pub use semantics::Rect;
pub use semantics::SemanticsElement;
pub use semantics::SemanticsNode;
pub use semantics::count_nodes;
pub use semantics::flatten_meaningful;
pub use vm::IsolateRef;
pub use vm::SemanticsOrder;
pub use vm::VmInfo;
