//! JSON-RPC 2.0 client for the Dart VM service.
//!
//! One request is in flight at a time. Responses are matched by id, and
//! anything else arriving on the socket (`streamNotify` events and the like)
//! is dropped.

use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};
use url::Url;

use super::error::VmServiceError;
use super::transport::{ConnectOptions, WsConnection};
use crate::domain::vm::{
    EXT_LAYER_TREE, EXT_RENDER_TREE, EXT_WIDGET_SUMMARY_TREE, EXT_WIDGET_TREE, INSPECTOR_GROUP,
};
use crate::domain::{IsolateRef, SemanticsOrder, VmInfo};
use crate::usecases::ports::UiDumpSource;

#[derive(Debug, Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: String,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct VmDto {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    isolates: Vec<IsolateDto>,
}

#[derive(Debug, Deserialize)]
struct IsolateDto {
    id: String,
    #[serde(default)]
    name: String,
}

impl From<VmDto> for VmInfo {
    fn from(dto: VmDto) -> Self {
        VmInfo {
            name: dto.name,
            version: dto.version,
            isolates: dto
                .isolates
                .into_iter()
                .map(|isolate| IsolateRef {
                    id: isolate.id,
                    name: isolate.name,
                })
                .collect(),
        }
    }
}

fn id_matches(id: &Value, expected: &str) -> bool {
    match id {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        _ => false,
    }
}

fn response_to_result(response: Response) -> Result<Value, VmServiceError> {
    if let Some(error) = response.error {
        return Err(VmServiceError::Remote {
            code: error.code,
            message: error.message,
            data: error.data,
        });
    }
    Ok(response.result.unwrap_or_else(|| Value::Object(Map::new())))
}

fn dump_text(result: &Value) -> String {
    result
        .get("data")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Unblocks a call stuck in `read` from another thread by shutting the
/// socket down underneath it.
pub struct AbortHandle {
    stream: TcpStream,
}

impl AbortHandle {
    pub fn abort(&self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

pub struct VmServiceClient {
    uri: String,
    connection: Option<WsConnection>,
    next_request_id: AtomicU64,
    isolate_id: Option<String>,
}

impl VmServiceClient {
    pub fn connect(uri: &str, options: &ConnectOptions) -> Result<Self, VmServiceError> {
        let url = Url::parse(uri).map_err(|err| VmServiceError::InvalidUri(format!("{uri}: {err}")))?;
        debug!(uri, "Connecting to VM service");
        let connection = WsConnection::connect(&url, options)?;
        Ok(Self {
            uri: uri.to_string(),
            connection: Some(connection),
            next_request_id: AtomicU64::new(1),
            isolate_id: None,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn disconnect(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            debug!(uri = %self.uri, "Disconnecting from VM service");
            connection.shutdown();
        }
    }

    pub fn abort_handle(&self) -> Option<AbortHandle> {
        let stream = self.connection.as_ref()?.try_clone_stream().ok()?;
        Some(AbortHandle { stream })
    }

    pub fn call(&mut self, method: &str, params: Option<Value>) -> Result<Value, VmServiceError> {
        let result = self.exchange(method, params);
        if let Err(err) = &result {
            if err.is_connection_error() {
                self.disconnect();
            }
        }
        result
    }

    fn exchange(&mut self, method: &str, params: Option<Value>) -> Result<Value, VmServiceError> {
        let connection = self
            .connection
            .as_mut()
            .ok_or(VmServiceError::NotConnected)?;

        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed).to_string();
        let request = Request {
            jsonrpc: "2.0",
            id: id.clone(),
            method,
            params: params.unwrap_or_else(|| Value::Object(Map::new())),
        };
        connection.send_text(&serde_json::to_string(&request)?)?;
        trace!(id = %id, method, "Request sent");

        loop {
            let Some(frame) = connection.read_text()? else {
                return Err(VmServiceError::Connection(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "VM service closed the connection",
                )));
            };
            let response: Response = serde_json::from_str(&frame)
                .map_err(|err| VmServiceError::Protocol(format!("malformed frame: {err}")))?;

            match &response.id {
                Some(frame_id) if id_matches(frame_id, &id) => {
                    return response_to_result(response);
                }
                _ => trace!(id = %id, bytes = frame.len(), "Skipping unrelated frame"),
            }
        }
    }

    pub fn get_vm(&mut self) -> Result<VmInfo, VmServiceError> {
        let result = self.call("getVM", None)?;
        let dto: VmDto = serde_json::from_value(result)
            .map_err(|err| VmServiceError::Protocol(format!("unexpected getVM result: {err}")))?;
        Ok(dto.into())
    }

    /// Resolves the app's isolate once and reuses it for the connection's
    /// lifetime.
    pub fn ensure_isolate(&mut self) -> Result<String, VmServiceError> {
        if let Some(id) = &self.isolate_id {
            return Ok(id.clone());
        }
        let vm = self.get_vm()?;
        let isolate = vm.main_isolate().ok_or(VmServiceError::NoIsolate)?;
        debug!(isolate_id = %isolate.id, name = %isolate.name, "Selected isolate");
        self.isolate_id = Some(isolate.id.clone());
        Ok(isolate.id.clone())
    }

    pub fn call_service_extension(
        &mut self,
        extension: &str,
        args: Option<Map<String, Value>>,
    ) -> Result<Value, VmServiceError> {
        let isolate_id = self.ensure_isolate()?;
        let mut params = Map::new();
        params.insert("isolateId".to_string(), Value::String(isolate_id));
        if let Some(args) = args {
            params.extend(args);
        }
        self.call(extension, Some(Value::Object(params)))
    }

    pub fn semantics_dump(&mut self, order: SemanticsOrder) -> Result<String, VmServiceError> {
        let result = self.call_service_extension(order.extension(), None)?;
        Ok(dump_text(&result))
    }

    pub fn render_tree_dump(&mut self) -> Result<String, VmServiceError> {
        let result = self.call_service_extension(EXT_RENDER_TREE, None)?;
        Ok(dump_text(&result))
    }

    pub fn layer_tree_dump(&mut self) -> Result<String, VmServiceError> {
        let result = self.call_service_extension(EXT_LAYER_TREE, None)?;
        Ok(dump_text(&result))
    }

    pub fn widget_tree_dump(&mut self) -> Result<String, VmServiceError> {
        let result = self.call_service_extension(EXT_WIDGET_TREE, None)?;
        Ok(dump_text(&result))
    }

    /// Raw inspector summary tree, as returned by the extension.
    pub fn widget_summary_tree(&mut self) -> Result<Value, VmServiceError> {
        let mut args = Map::new();
        args.insert(
            "groupName".to_string(),
            Value::String(INSPECTOR_GROUP.to_string()),
        );
        self.call_service_extension(EXT_WIDGET_SUMMARY_TREE, Some(args))
    }
}

impl Drop for VmServiceClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl UiDumpSource for VmServiceClient {
    type Error = VmServiceError;

    fn semantics_dump(&mut self, order: SemanticsOrder) -> Result<String, Self::Error> {
        VmServiceClient::semantics_dump(self, order)
    }

    fn widget_tree_dump(&mut self) -> Result<String, Self::Error> {
        VmServiceClient::widget_tree_dump(self)
    }
}
