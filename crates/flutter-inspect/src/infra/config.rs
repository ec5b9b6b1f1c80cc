//! Runtime configuration for discovery and the VM service connection.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_PROXY_FILE: &str = "/tmp/flutter_vm_service_uri";
const DEFAULT_PROBE_CONNECT_TIMEOUT_MS: u64 = 500;
const DEFAULT_PROBE_READ_TIMEOUT_MS: u64 = 1_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;

/// Ports Flutter tooling tends to pick for the VM service.
pub fn default_scan_ports() -> Vec<u16> {
    (8181..=8199).chain(9100..=9109).collect()
}

#[derive(Debug, Clone)]
pub struct InspectConfig {
    proxy_file: PathBuf,
    probe_connect_timeout: Duration,
    probe_read_timeout: Duration,
    connect_timeout: Duration,
    read_timeout: Duration,
    scan_ports: Vec<u16>,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl InspectConfig {
    pub fn proxy_file(&self) -> &PathBuf {
        &self.proxy_file
    }

    pub fn probe_connect_timeout(&self) -> Duration {
        self.probe_connect_timeout
    }

    pub fn probe_read_timeout(&self) -> Duration {
        self.probe_read_timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn scan_ports(&self) -> &[u16] {
        &self.scan_ports
    }

    pub fn from_env() -> Self {
        Self {
            proxy_file: env::var("FLUTTER_INSPECT_PROXY_FILE")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROXY_FILE)),
            probe_connect_timeout: Duration::from_millis(parse_env_u64(
                "FLUTTER_INSPECT_PROBE_CONNECT_TIMEOUT_MS",
                DEFAULT_PROBE_CONNECT_TIMEOUT_MS,
            )),
            probe_read_timeout: Duration::from_millis(parse_env_u64(
                "FLUTTER_INSPECT_PROBE_READ_TIMEOUT_MS",
                DEFAULT_PROBE_READ_TIMEOUT_MS,
            )),
            connect_timeout: Duration::from_millis(parse_env_u64(
                "FLUTTER_INSPECT_CONNECT_TIMEOUT_MS",
                DEFAULT_CONNECT_TIMEOUT_MS,
            )),
            read_timeout: Duration::from_millis(parse_env_u64(
                "FLUTTER_INSPECT_READ_TIMEOUT_MS",
                DEFAULT_READ_TIMEOUT_MS,
            )),
            scan_ports: parse_env_ports("FLUTTER_INSPECT_SCAN_PORTS"),
        }
    }

    pub fn with_proxy_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.proxy_file = path.into();
        self
    }

    pub fn with_probe_connect_timeout(mut self, timeout: Duration) -> Self {
        self.probe_connect_timeout = timeout;
        self
    }

    pub fn with_probe_read_timeout(mut self, timeout: Duration) -> Self {
        self.probe_read_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_scan_ports(mut self, ports: Vec<u16>) -> Self {
        self.scan_ports = ports;
        self
    }
}

fn parse_env_u64(key: &str, default: u64) -> u64 {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return default,
    };
    if value.trim().is_empty() {
        return default;
    }
    match value.trim().parse::<u64>() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(value = %value, key, "Invalid numeric config; using default");
            default
        }
    }
}

fn parse_env_ports(key: &str) -> Vec<u16> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return default_scan_ports(),
    };
    if value.trim().is_empty() {
        return default_scan_ports();
    }
    match parse_port_list(&value) {
        Some(ports) if !ports.is_empty() => ports,
        _ => {
            warn!(value = %value, key, "Invalid port list; using default");
            default_scan_ports()
        }
    }
}

/// Parses `8181,9100-9109` style lists. Any malformed entry rejects the list.
fn parse_port_list(raw: &str) -> Option<Vec<u16>> {
    let mut ports = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.split_once('-') {
            Some((start, end)) => {
                let start: u16 = start.trim().parse().ok()?;
                let end: u16 = end.trim().parse().ok()?;
                if start > end {
                    return None;
                }
                ports.extend(start..=end);
            }
            None => ports.push(entry.parse().ok()?),
        }
    }
    Some(ports)
}
