//! Reading listening sockets out of `/proc`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Kernel socket state for LISTEN.
const TCP_LISTEN: &str = "0A";
const NET_TABLES: &[&str] = &["net/tcp", "net/tcp6"];

pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn cmdline(&self, pid: u32) -> Option<Vec<u8>> {
        fs::read(self.root.join(pid.to_string()).join("cmdline")).ok()
    }

    /// Inodes of every socket the process holds open.
    pub fn socket_inodes(&self, pid: u32) -> HashSet<String> {
        let fd_dir = self.root.join(pid.to_string()).join("fd");
        let entries = match fs::read_dir(&fd_dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(pid, error = %err, "Cannot read fd directory");
                return HashSet::new();
            }
        };
        entries
            .filter_map(Result::ok)
            .filter_map(|entry| fs::read_link(entry.path()).ok())
            .filter_map(|target| socket_inode(&target))
            .collect()
    }

    /// Listening ports whose socket inode is in `inodes`, in table order.
    pub fn listening_ports(&self, inodes: &HashSet<String>) -> Vec<u16> {
        let mut ports = Vec::new();
        for table in NET_TABLES {
            let path = self.root.join(table);
            match fs::read_to_string(&path) {
                Ok(contents) => {
                    for port in parse_listening_ports(&contents, inodes) {
                        if !ports.contains(&port) {
                            ports.push(port);
                        }
                    }
                }
                Err(err) => debug!(path = %path.display(), error = %err, "Cannot read socket table"),
            }
        }
        ports
    }
}

/// `socket:[12345]` → `12345`.
fn socket_inode(target: &Path) -> Option<String> {
    let target = target.to_str()?;
    let inode = target.strip_prefix("socket:[")?.strip_suffix(']')?;
    Some(inode.to_string())
}

/// Rows look like
/// `sl local_address rem_address st tx_queue:rx_queue tr:tm->when retrnsmt uid timeout inode ...`.
pub fn parse_listening_ports(table: &str, inodes: &HashSet<String>) -> Vec<u16> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 10 || columns[3] != TCP_LISTEN || !inodes.contains(columns[9]) {
                return None;
            }
            let (_, port_hex) = columns[1].rsplit_once(':')?;
            u16::from_str_radix(port_hex, 16).ok()
        })
        .collect()
}
