//! WebSocket transport for the VM service.

use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;
use tracing::trace;
use tungstenite::Message;
use tungstenite::WebSocket;
use tungstenite::client::IntoClientRequest;
use url::Url;

use super::error::VmServiceError;
use crate::infra::config::InspectConfig;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub struct ConnectOptions {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl ConnectOptions {
    pub fn from_config(config: &InspectConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            read_timeout: config.read_timeout(),
            write_timeout: config.read_timeout(),
        }
    }
}

fn ws_error_to_vm(err: tungstenite::Error) -> VmServiceError {
    match err {
        tungstenite::Error::Io(io_err) => VmServiceError::Connection(io_err),
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            VmServiceError::Connection(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                "websocket closed",
            ))
        }
        tungstenite::Error::Protocol(
            tungstenite::error::ProtocolError::ResetWithoutClosingHandshake,
        ) => VmServiceError::Connection(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset without closing handshake",
        )),
        other => VmServiceError::Protocol(format!("websocket error: {other}")),
    }
}

/// Tries each resolved address in turn; the last failure is reported.
pub(crate) fn connect_any(
    addrs: impl IntoIterator<Item = SocketAddr>,
    timeout: Duration,
) -> std::io::Result<TcpStream> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                trace!(addr = %addr, error = %err, "TCP connect attempt failed");
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "host resolved to no addresses")
    }))
}

pub(crate) struct WsConnection {
    socket: WebSocket<TcpStream>,
}

impl WsConnection {
    pub fn connect(url: &Url, options: &ConnectOptions) -> Result<Self, VmServiceError> {
        if url.scheme() != "ws" {
            return Err(VmServiceError::InvalidUri(format!(
                "unsupported scheme '{}'; only ws:// is supported",
                url.scheme()
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| VmServiceError::InvalidUri(format!("{url} is missing a host")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| VmServiceError::InvalidUri(format!("{url} is missing a port")))?;

        let addrs = (host, port).to_socket_addrs()?;
        let stream = connect_any(addrs, options.connect_timeout)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(options.read_timeout))?;
        stream.set_write_timeout(Some(options.write_timeout))?;
        debug!(host, port, "TCP connection to VM service established");

        let request = url
            .as_str()
            .into_client_request()
            .map_err(|err| VmServiceError::InvalidUri(err.to_string()))?;

        let (socket, _response) =
            tungstenite::client::client(request, stream).map_err(|err| match err {
                tungstenite::HandshakeError::Failure(tungstenite::Error::Io(io_err)) => {
                    VmServiceError::Connection(io_err)
                }
                tungstenite::HandshakeError::Failure(ws_err) => {
                    VmServiceError::Handshake(ws_err.to_string())
                }
                // A read timeout on a blocking socket surfaces as WouldBlock.
                tungstenite::HandshakeError::Interrupted(_) => {
                    VmServiceError::Connection(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "timed out waiting for the websocket handshake",
                    ))
                }
            })?;

        Ok(Self { socket })
    }

    pub fn send_text(&mut self, text: &str) -> Result<(), VmServiceError> {
        trace!(bytes = text.len(), "Sending frame");
        self.socket
            .send(Message::Text(text.to_string()))
            .map_err(ws_error_to_vm)
    }

    /// Next text frame; `None` once the peer closed the socket.
    pub fn read_text(&mut self) -> Result<Option<String>, VmServiceError> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => return Ok(Some(text)),
                Ok(Message::Binary(_)) => {
                    return Err(VmServiceError::Protocol(
                        "received binary websocket frame; expected text JSON-RPC".to_string(),
                    ));
                }
                Ok(Message::Close(_)) => return Ok(None),
                Ok(Message::Ping(payload)) => {
                    self.socket
                        .send(Message::Pong(payload))
                        .map_err(ws_error_to_vm)?;
                }
                Ok(_) => {}
                Err(tungstenite::Error::ConnectionClosed) => return Ok(None),
                Err(err) => return Err(ws_error_to_vm(err)),
            }
        }
    }

    pub fn try_clone_stream(&self) -> std::io::Result<TcpStream> {
        self.socket.get_ref().try_clone()
    }

    pub fn shutdown(&mut self) {
        let _ = self.socket.close(None);
        let _ = self.socket.flush();
        let _ = self.socket.get_mut().shutdown(Shutdown::Both);
    }
}
