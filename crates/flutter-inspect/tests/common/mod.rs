#![expect(dead_code, reason = "Test harness helpers are used selectively.")]
#![expect(unused_imports, reason = "Test harness re-exports vary by test.")]

//! Test harness exports.

pub mod mock_vm_service;

pub use mock_vm_service::{MockResponse, MockVmService, RecordedRequest};

use assert_cmd::Command;
use std::net::TcpListener;
use std::path::PathBuf;
use tempfile::TempDir;

/// Binary under test with discovery pinned to nothing in particular: the
/// proxy file lives in an empty temp dir and the scan range is a closed port.
pub struct TestEnv {
    temp_dir: TempDir,
    closed_port: u16,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let closed_port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        Self {
            temp_dir,
            closed_port,
        }
    }

    pub fn proxy_file(&self) -> PathBuf {
        self.temp_dir.path().join("vm-service-uri")
    }

    pub fn write_proxy_file(&self, contents: &str) {
        std::fs::write(self.proxy_file(), contents).unwrap();
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flutter-inspect"));
        cmd.env_remove("FLUTTER_VM_SERVICE_URI")
            .env_remove("FLUTTER_INSPECT_LOG")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .env("FLUTTER_INSPECT_PROXY_FILE", self.proxy_file())
            .env("FLUTTER_INSPECT_SCAN_PORTS", self.closed_port.to_string())
            .env("FLUTTER_INSPECT_PROBE_CONNECT_TIMEOUT_MS", "200")
            .env("FLUTTER_INSPECT_CONNECT_TIMEOUT_MS", "2000")
            .env("FLUTTER_INSPECT_READ_TIMEOUT_MS", "5000");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert()
    }
}
