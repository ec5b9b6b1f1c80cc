pub mod discovery_strategy;
pub mod dump_source;
#[cfg(test)]
pub(crate) mod test_support;

pub use discovery_strategy::DiscoveryStrategy;
pub use dump_source::UiDumpSource;
