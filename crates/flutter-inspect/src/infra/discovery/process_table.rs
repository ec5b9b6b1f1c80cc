//! Discovery through the process table: Dart/Flutter processes and the
//! sockets they listen on.

use std::sync::Arc;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::debug;

use super::app_name::{cmdline_from_bytes, extract_app_name};
use super::probe::PortProbe;
use super::proc_net::ProcFs;
use crate::domain::{DiscoveryMethod, EndpointCandidate};
use crate::usecases::ports::DiscoveryStrategy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub cmdline: String,
}

fn is_dart_process(cmdline: &str) -> bool {
    let lower = cmdline.to_lowercase();
    lower.contains("dart") || lower.contains("flutter")
}

fn join_cmd(process: &sysinfo::Process) -> String {
    process
        .cmd()
        .iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

fn dart_processes() -> Vec<ProcessEntry> {
    let refresh = ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always);
    let mut system = System::new();
    system.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh);

    let mut entries: Vec<ProcessEntry> = system
        .processes()
        .iter()
        .map(|(pid, process)| ProcessEntry {
            pid: pid.as_u32(),
            cmdline: join_cmd(process),
        })
        .filter(|entry| is_dart_process(&entry.cmdline))
        .collect();
    entries.sort_by_key(|entry| entry.pid);
    entries
}

/// Command line of `pid`, from `/proc` when available, else via sysinfo.
pub fn cmdline_for_pid(procfs: &ProcFs, pid: u32) -> Option<String> {
    if let Some(bytes) = procfs.cmdline(pid) {
        let cmdline = cmdline_from_bytes(&bytes);
        if !cmdline.is_empty() {
            return Some(cmdline);
        }
    }

    let sys_pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[sys_pid]),
        true,
        ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always),
    );
    let cmdline = join_cmd(system.process(sys_pid)?);
    (!cmdline.is_empty()).then_some(cmdline)
}

pub struct ProcessTableStrategy {
    probe: Arc<dyn PortProbe>,
    procfs: ProcFs,
}

impl ProcessTableStrategy {
    pub fn new(probe: Arc<dyn PortProbe>) -> Self {
        Self::with_procfs(probe, ProcFs::default())
    }

    pub fn with_procfs(probe: Arc<dyn PortProbe>, procfs: ProcFs) -> Self {
        Self { probe, procfs }
    }

    /// One candidate per process: its first listening port that identifies
    /// as a VM service.
    fn candidates_for(&self, processes: &[ProcessEntry]) -> Vec<EndpointCandidate> {
        let mut candidates = Vec::new();
        for process in processes {
            let inodes = self.procfs.socket_inodes(process.pid);
            if inodes.is_empty() {
                continue;
            }
            let ports = self.procfs.listening_ports(&inodes);
            debug!(pid = process.pid, ports = ?ports, "Listening ports for Dart process");

            if let Some(port) = ports.into_iter().find(|&p| self.probe.is_vm_service_port(p)) {
                candidates.push(
                    EndpointCandidate::local(port, DiscoveryMethod::ProcessTable)
                        .with_pid(process.pid)
                        .with_app_name(extract_app_name(&process.cmdline)),
                );
            }
        }
        candidates
    }
}

impl DiscoveryStrategy for ProcessTableStrategy {
    fn name(&self) -> &'static str {
        "process-table"
    }

    fn discover(&self) -> Vec<EndpointCandidate> {
        if !cfg!(target_os = "linux") {
            return Vec::new();
        }
        let processes = dart_processes();
        debug!(count = processes.len(), "Dart/Flutter processes found");
        self.candidates_for(&processes)
    }
}
