use serde_json::Value;
use thiserror::Error;

/// JSON-RPC code used for failures that never reached the VM service.
const LOCAL_ERROR_CODE: i64 = -32000;

#[derive(Error, Debug)]
pub enum VmServiceError {
    #[error("Failed to connect to VM service: {0}")]
    Connection(#[from] std::io::Error),

    #[error("WebSocket handshake failed: {0}")]
    Handshake(String),

    #[error("VM service error ({code}): {message}")]
    Remote {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No Flutter isolate found")]
    NoIsolate,

    #[error("Not connected")]
    NotConnected,

    #[error("Invalid VM service URI: {0}")]
    InvalidUri(String),
}

impl VmServiceError {
    /// The socket is gone or never came up; the app was likely closed.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            VmServiceError::Connection(_)
                | VmServiceError::Handshake(_)
                | VmServiceError::NotConnected
        )
    }

    pub fn is_connection_refused(&self) -> bool {
        matches!(
            self,
            VmServiceError::Connection(err) if err.kind() == std::io::ErrorKind::ConnectionRefused
        )
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            VmServiceError::Connection(_)
            | VmServiceError::Handshake(_)
            | VmServiceError::NotConnected => Some("The Flutter app may have been closed."),
            VmServiceError::NoIsolate => Some("Make sure the app finished starting in debug mode."),
            VmServiceError::InvalidUri(_) => {
                Some("Expected a WebSocket URI such as ws://127.0.0.1:8181/ws")
            }
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut obj = match self {
            VmServiceError::Remote {
                code,
                message,
                data,
            } => {
                let mut obj = serde_json::json!({
                    "code": code,
                    "message": message,
                    "category": "remote",
                });
                if let Some(data) = data {
                    obj["data"] = data.clone();
                }
                obj
            }
            VmServiceError::Connection(_) | VmServiceError::Handshake(_) => serde_json::json!({
                "code": LOCAL_ERROR_CODE,
                "message": self.to_string(),
                "category": "connection",
            }),
            VmServiceError::NotConnected => serde_json::json!({
                "code": LOCAL_ERROR_CODE,
                "message": self.to_string(),
                "category": "connection",
            }),
            VmServiceError::Protocol(_) | VmServiceError::Serialization(_) => serde_json::json!({
                "code": LOCAL_ERROR_CODE,
                "message": self.to_string(),
                "category": "protocol",
            }),
            VmServiceError::NoIsolate => serde_json::json!({
                "code": LOCAL_ERROR_CODE,
                "message": self.to_string(),
                "category": "isolate",
            }),
            VmServiceError::InvalidUri(_) => serde_json::json!({
                "code": LOCAL_ERROR_CODE,
                "message": self.to_string(),
                "category": "usage",
            }),
        };
        if let Some(suggestion) = self.suggestion() {
            obj["suggestion"] = serde_json::json!(suggestion);
        }
        obj
    }
}
