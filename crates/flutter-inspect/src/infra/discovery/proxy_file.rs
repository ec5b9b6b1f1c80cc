//! Discovery through the URI file written by the Flutter tooling proxy.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;
use url::Url;

use super::probe::PortProbe;
use crate::domain::{DiscoveryMethod, EndpointCandidate};
use crate::usecases::ports::DiscoveryStrategy;

const PROXY_APP_NAME: &str = "flutter-proxy";

/// Turns the file contents into a WebSocket URI.
///
/// Accepts a bare service address (`http://127.0.0.1:43535/TOKEN=/`) or a
/// DevTools link carrying it in `?uri=`. TLS schemes yield `None`.
pub fn normalize_proxy_uri(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let embedded = Url::parse(raw).ok().and_then(|url| {
        url.query_pairs()
            .find(|(key, _)| key == "uri")
            .map(|(_, value)| value.into_owned())
    });
    let service = match embedded {
        Some(uri) => uri,
        None => match raw.split_once("?uri=") {
            Some((_, rest)) => rest.to_string(),
            None => raw.to_string(),
        },
    };

    // The transport speaks plain ws:// only.
    let ws = if let Some(rest) = service.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if service.starts_with("ws://") {
        service
    } else {
        debug!(uri = %service, "Proxy file URI is not plain http or ws");
        return None;
    };

    if ws.ends_with("/ws") {
        Some(ws)
    } else {
        Some(format!("{}/ws", ws.trim_end_matches('/')))
    }
}

pub struct ProxyFileStrategy {
    path: PathBuf,
    probe: Arc<dyn PortProbe>,
}

impl ProxyFileStrategy {
    pub fn new(path: impl Into<PathBuf>, probe: Arc<dyn PortProbe>) -> Self {
        Self {
            path: path.into(),
            probe,
        }
    }

    fn is_reachable(&self, uri: &str) -> bool {
        let Ok(url) = Url::parse(uri) else {
            return false;
        };
        match (url.host_str(), url.port_or_known_default()) {
            (Some(host), Some(port)) => {
                let host = host.trim_start_matches('[').trim_end_matches(']');
                self.probe.is_reachable(host, port)
            }
            _ => false,
        }
    }
}

impl DiscoveryStrategy for ProxyFileStrategy {
    fn name(&self) -> &'static str {
        "proxy-file"
    }

    fn discover(&self) -> Vec<EndpointCandidate> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "Proxy file unavailable");
                return Vec::new();
            }
        };
        let Some(uri) = normalize_proxy_uri(&contents) else {
            return Vec::new();
        };
        if !self.is_reachable(&uri) {
            debug!(uri = %uri, "Proxy file points at an unreachable service");
            return Vec::new();
        }
        vec![
            EndpointCandidate::new(uri, DiscoveryMethod::ProxyFile)
                .with_app_name(Some(PROXY_APP_NAME.to_string())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::discovery::probe::test_support::FakeProbe;

    #[test]
    fn test_devtools_link_is_unwrapped() {
        assert_eq!(
            normalize_proxy_uri("http://127.0.0.1:9101?uri=http://127.0.0.1:43535/TOKEN=/\n")
                .as_deref(),
            Some("ws://127.0.0.1:43535/TOKEN=/ws")
        );
    }

    #[test]
    fn test_percent_encoded_devtools_link() {
        assert_eq!(
            normalize_proxy_uri("http://127.0.0.1:9101/?uri=http%3A%2F%2F127.0.0.1%3A43535%2FabC%3D%2F")
                .as_deref(),
            Some("ws://127.0.0.1:43535/abC=/ws")
        );
    }

    #[test]
    fn test_plain_uris() {
        assert_eq!(
            normalize_proxy_uri("http://127.0.0.1:8181/").as_deref(),
            Some("ws://127.0.0.1:8181/ws")
        );
        assert_eq!(
            normalize_proxy_uri("ws://127.0.0.1:8181/ws").as_deref(),
            Some("ws://127.0.0.1:8181/ws")
        );
        assert_eq!(normalize_proxy_uri("https://device.local:443/x"), None);
        assert_eq!(normalize_proxy_uri("wss://device.local:443/x/ws"), None);
        assert_eq!(normalize_proxy_uri("  \n"), None);
    }

    #[test]
    fn test_tls_proxy_file_yields_no_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flutter_vm_service_uri");
        std::fs::write(&path, "https://127.0.0.1:443/TOKEN=/").unwrap();

        let probe = Arc::new(FakeProbe::with_services(&[443]));
        let found = ProxyFileStrategy::new(&path, probe).discover();

        assert!(found.is_empty());
    }

    #[test]
    fn test_reachable_proxy_file_yields_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flutter_vm_service_uri");
        std::fs::write(&path, "http://127.0.0.1:43535/TOKEN=/").unwrap();

        let probe = Arc::new(FakeProbe::with_services(&[43535]));
        let found = ProxyFileStrategy::new(&path, probe).discover();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].uri, "ws://127.0.0.1:43535/TOKEN=/ws");
        assert_eq!(found[0].pid, None);
        assert_eq!(found[0].app_name.as_deref(), Some("flutter-proxy"));
        assert_eq!(found[0].origin, DiscoveryMethod::ProxyFile);
    }

    #[test]
    fn test_unreachable_or_missing_file_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flutter_vm_service_uri");
        let probe = Arc::new(FakeProbe::default());

        assert!(ProxyFileStrategy::new(&path, probe.clone()).discover().is_empty());

        std::fs::write(&path, "http://127.0.0.1:43535/TOKEN=/").unwrap();
        assert!(ProxyFileStrategy::new(&path, probe).discover().is_empty());
    }

    #[test]
    fn test_empty_file_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flutter_vm_service_uri");
        std::fs::write(&path, "\n").unwrap();

        let probe = Arc::new(FakeProbe::with_services(&[8181]));
        assert!(ProxyFileStrategy::new(&path, probe).discover().is_empty());
    }
}
