//! Last-resort discovery: probe the usual VM service ports on loopback.

use std::sync::Arc;

use tracing::debug;

use super::probe::PortProbe;
use crate::domain::{DiscoveryMethod, EndpointCandidate};
use crate::usecases::ports::DiscoveryStrategy;

pub struct PortScanStrategy {
    ports: Vec<u16>,
    probe: Arc<dyn PortProbe>,
}

impl PortScanStrategy {
    pub fn new(ports: Vec<u16>, probe: Arc<dyn PortProbe>) -> Self {
        Self { ports, probe }
    }
}

impl DiscoveryStrategy for PortScanStrategy {
    fn name(&self) -> &'static str {
        "port-scan"
    }

    fn discover(&self) -> Vec<EndpointCandidate> {
        debug!(ports = self.ports.len(), "Scanning ports");
        self.ports
            .iter()
            .copied()
            .filter(|&port| self.probe.is_vm_service_port(port))
            .map(|port| EndpointCandidate::local(port, DiscoveryMethod::PortScan))
            .collect()
    }
}
