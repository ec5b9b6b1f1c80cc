//! Discovery through `lsof -i -P -n`.

use std::process::{Command, Stdio};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::debug;

use super::app_name::extract_app_name;
use super::probe::PortProbe;
use super::proc_net::ProcFs;
use super::process_table::cmdline_for_pid;
use crate::domain::{DiscoveryMethod, EndpointCandidate};
use crate::usecases::ports::DiscoveryStrategy;

#[expect(clippy::expect_used, reason = "Pattern is a literal")]
fn port_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":(\d+)$").expect("port pattern"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LsofListener {
    pub pid: u32,
    pub port: u16,
}

/// Listening Dart sockets in `lsof` output, e.g.
/// `dart 4242 dev 12u IPv4 0x1 0t0 TCP 127.0.0.1:8181 (LISTEN)`.
///
/// The port is the trailing `:<digits>` of the NAME column so that IPv6
/// names like `[::1]:9101` resolve correctly.
pub fn parse_lsof_output(output: &str) -> Vec<LsofListener> {
    output
        .lines()
        .filter(|line| line.to_lowercase().contains("dart") && line.contains("LISTEN"))
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 9 {
                return None;
            }
            let pid = columns[1].parse().ok()?;
            let port = port_regex().captures(columns[8])?.get(1)?.as_str().parse().ok()?;
            Some(LsofListener { pid, port })
        })
        .collect()
}

pub struct LsofStrategy {
    probe: Arc<dyn PortProbe>,
    procfs: ProcFs,
    program: String,
}

impl LsofStrategy {
    pub fn new(probe: Arc<dyn PortProbe>) -> Self {
        Self {
            probe,
            procfs: ProcFs::default(),
            program: "lsof".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn run_lsof(&self) -> Option<String> {
        let output = Command::new(&self.program)
            .args(["-i", "-P", "-n"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        match output {
            Ok(output) => Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            Err(err) => {
                debug!(program = %self.program, error = %err, "lsof unavailable");
                None
            }
        }
    }

    fn candidates_from_output(&self, output: &str) -> Vec<EndpointCandidate> {
        parse_lsof_output(output)
            .into_iter()
            .filter(|listener| self.probe.is_vm_service_port(listener.port))
            .map(|listener| {
                let app_name = cmdline_for_pid(&self.procfs, listener.pid)
                    .as_deref()
                    .and_then(extract_app_name);
                EndpointCandidate::local(listener.port, DiscoveryMethod::Lsof)
                    .with_pid(listener.pid)
                    .with_app_name(app_name)
            })
            .collect()
    }
}

impl DiscoveryStrategy for LsofStrategy {
    fn name(&self) -> &'static str {
        "lsof"
    }

    fn discover(&self) -> Vec<EndpointCandidate> {
        match self.run_lsof() {
            Some(output) => self.candidates_from_output(&output),
            None => Vec::new(),
        }
    }
}
