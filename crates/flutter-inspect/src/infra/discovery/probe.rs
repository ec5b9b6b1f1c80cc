//! Reachability and service-identity checks for candidate ports.

use std::net::ToSocketAddrs;
use std::time::Duration;

use tracing::trace;

use crate::infra::config::InspectConfig;
use crate::infra::vm_service::connect_any;

const LOOPBACK: &str = "127.0.0.1";

pub trait PortProbe: Send + Sync {
    /// Plain TCP connect check.
    fn is_reachable(&self, host: &str, port: u16) -> bool;

    /// Whether a loopback port answers like a Dart VM service.
    fn is_vm_service_port(&self, port: u16) -> bool;
}

pub struct HttpServiceProbe {
    connect_timeout: Duration,
    agent: ureq::Agent,
}

impl HttpServiceProbe {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(read_timeout)
            .timeout_read(read_timeout)
            .timeout_write(read_timeout)
            .redirects(0)
            .build();
        Self {
            connect_timeout,
            agent,
        }
    }

    pub fn from_config(config: &InspectConfig) -> Self {
        Self::new(config.probe_connect_timeout(), config.probe_read_timeout())
    }

    /// Response body for `path`, including bodies of non-2xx responses.
    fn fetch_body(&self, port: u16, path: &str) -> Option<String> {
        let url = format!("http://{LOOPBACK}:{port}{path}");
        let response = match self.agent.get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(err) => {
                trace!(port, path, error = %err, "HTTP probe failed");
                return None;
            }
        };
        response.into_string().ok()
    }
}

impl PortProbe for HttpServiceProbe {
    fn is_reachable(&self, host: &str, port: u16) -> bool {
        match (host, port).to_socket_addrs() {
            Ok(addrs) => connect_any(addrs, self.connect_timeout).is_ok(),
            Err(_) => false,
        }
    }

    fn is_vm_service_port(&self, port: u16) -> bool {
        if !self.is_reachable(LOOPBACK, port) {
            return false;
        }
        if let Some(body) = self.fetch_body(port, "/getVM") {
            if looks_like_get_vm(&body) {
                return true;
            }
        }
        self.fetch_body(port, "/")
            .is_some_and(|body| looks_like_service_root(&body))
    }
}

fn looks_like_get_vm(body: &str) -> bool {
    let body = body.to_lowercase();
    body.contains("vm") || body.contains("isolate")
}

fn looks_like_service_root(body: &str) -> bool {
    let body = body.to_lowercase();
    body.contains("dart") || body.contains("vm")
}
