mod discovery;
mod inspect;
mod watch;

pub use discovery::{DiscoveryCascade, DiscoveryUseCase};
pub use inspect::{InspectMode, InspectOutput, InspectUseCase};
pub use watch::ChangeDetector;
pub mod ports;
