mod mock_dump_source;
mod mock_strategy;

pub use mock_dump_source::{MockDumpError, MockDumpSource};
pub use mock_strategy::MockStrategy;
