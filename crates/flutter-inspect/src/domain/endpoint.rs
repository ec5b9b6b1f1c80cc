//! Discovered VM service endpoints.

use std::fmt;

/// Which discovery strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMethod {
    ProxyFile,
    ProcessTable,
    Lsof,
    PortScan,
}

impl DiscoveryMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DiscoveryMethod::ProxyFile => "proxy-file",
            DiscoveryMethod::ProcessTable => "process-table",
            DiscoveryMethod::Lsof => "lsof",
            DiscoveryMethod::PortScan => "port-scan",
        }
    }
}

impl fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reachable VM service address, e.g. `ws://127.0.0.1:8181/ws`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    pub uri: String,
    pub pid: Option<u32>,
    pub app_name: Option<String>,
    pub origin: DiscoveryMethod,
}

impl EndpointCandidate {
    pub fn new(uri: impl Into<String>, origin: DiscoveryMethod) -> Self {
        Self {
            uri: uri.into(),
            pid: None,
            app_name: None,
            origin,
        }
    }

    /// Candidate for a listening port on the loopback interface.
    pub fn local(port: u16, origin: DiscoveryMethod) -> Self {
        Self::new(format!("ws://127.0.0.1:{port}/ws"), origin)
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_app_name(mut self, app_name: Option<String>) -> Self {
        self.app_name = app_name;
        self
    }
}
