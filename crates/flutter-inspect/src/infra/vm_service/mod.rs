mod client;
pub mod error;
mod transport;

pub use client::{AbortHandle, VmServiceClient};
pub use error::VmServiceError;
pub use transport::ConnectOptions;
pub(crate) use transport::connect_any;
