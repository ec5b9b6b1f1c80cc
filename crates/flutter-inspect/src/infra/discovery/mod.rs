//! Discovery strategies for locally running Dart VM services.

mod app_name;
mod lsof;
mod port_scan;
pub mod probe;
mod proc_net;
mod process_table;
mod proxy_file;

use std::sync::Arc;

pub use lsof::LsofStrategy;
pub use port_scan::PortScanStrategy;
pub use probe::{HttpServiceProbe, PortProbe};
pub use process_table::ProcessTableStrategy;
pub use proxy_file::ProxyFileStrategy;

use crate::infra::config::InspectConfig;
use crate::usecases::DiscoveryCascade;

/// Proxy file, then process table, then `lsof`, then the port range.
pub fn default_cascade(config: &InspectConfig) -> DiscoveryCascade {
    let probe: Arc<dyn PortProbe> = Arc::new(HttpServiceProbe::from_config(config));
    DiscoveryCascade::new(vec![
        Box::new(ProxyFileStrategy::new(
            config.proxy_file().clone(),
            Arc::clone(&probe),
        )),
        Box::new(ProcessTableStrategy::new(Arc::clone(&probe))),
        Box::new(LsofStrategy::new(Arc::clone(&probe))),
        Box::new(PortScanStrategy::new(config.scan_ports().to_vec(), probe)),
    ])
}
