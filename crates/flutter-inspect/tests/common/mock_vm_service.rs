
//! Mock Dart VM service for integration tests.
//!
//! Speaks JSON-RPC over a real WebSocket on an ephemeral loopback port.
//! Every connection is served on its own thread.

use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use tungstenite::Message;

pub const ISOLATE_ID: &str = "isolates/1234";
pub const SEMANTICS_TRAVERSAL: &str = "ext.flutter.debugDumpSemanticsTreeInTraversalOrder";
pub const SEMANTICS_HIT_TEST: &str = "ext.flutter.debugDumpSemanticsTreeInInverseHitTestOrder";
pub const WIDGET_TREE: &str = "ext.flutter.debugDumpApp";

pub const LOGIN_DUMP: &str = "\
SemanticsNode#0
 │ Rect.fromLTRB(0.0, 0.0, 800.0, 600.0)
 │
 └─SemanticsNode#1
   │ Rect.fromLTRB(0.0, 0.0, 800.0, 600.0)
   │ flags: scopesRoute
   │
   ├─SemanticsNode#2
   │   Rect.fromLTRB(16.0, 40.0, 784.0, 96.0)
   │   flags: isTextField, isFocusable
   │   actions: tap, setText
   │   label: \"Email\"
   │   value: \"user@example.com\"
   │
   └─SemanticsNode#3
       Rect.fromLTRB(16.0, 120.0, 784.0, 168.0)
       flags: isButton, isEnabled, isFocusable
       actions: tap
       label: \"Sign in\"
";

pub const WIDGET_DUMP: &str = "\
MyApp
└MaterialApp
 └Scaffold
  └Center
   └Text(\"Hello\")
";

#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(Value),
    Error { code: i64, message: String },
}

impl MockResponse {
    /// Service extension result carrying a text dump in `data`.
    pub fn dump(method: &str, text: &str) -> Self {
        MockResponse::Success(json!({
            "type": "_extensionType",
            "method": method,
            "data": text,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub params: Value,
}

#[derive(Clone, Default)]
struct Script {
    responses: HashMap<String, MockResponse>,
    notification: Option<Value>,
}

pub struct MockVmServiceBuilder {
    script: Script,
}

impl MockVmServiceBuilder {
    pub fn respond(mut self, method: &str, response: MockResponse) -> Self {
        self.script.responses.insert(method.to_string(), response);
        self
    }

    pub fn semantics(self, dump: &str) -> Self {
        self.respond(
            SEMANTICS_TRAVERSAL,
            MockResponse::dump(SEMANTICS_TRAVERSAL, dump),
        )
    }

    pub fn widget_tree(self, dump: &str) -> Self {
        self.respond(WIDGET_TREE, MockResponse::dump(WIDGET_TREE, dump))
    }

    /// Sends `frame` ahead of every response, like a `streamNotify` event.
    pub fn notify_before_response(mut self, frame: Value) -> Self {
        self.script.notification = Some(frame);
        self
    }

    pub fn start(self) -> MockVmService {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let script = Arc::new(self.script);

        let thread_requests = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else {
                    break;
                };
                let script = Arc::clone(&script);
                let requests = Arc::clone(&thread_requests);
                thread::spawn(move || serve_connection(stream, &script, &requests));
            }
        });

        MockVmService { addr, requests }
    }
}

pub struct MockVmService {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockVmService {
    pub fn builder() -> MockVmServiceBuilder {
        let mut script = Script::default();
        script.responses.insert(
            "getVM".to_string(),
            MockResponse::Success(json!({
                "type": "VM",
                "name": "vm",
                "version": "3.5.0 (stable)",
                "isolates": [
                    { "type": "@Isolate", "id": ISOLATE_ID, "name": "main" }
                ],
            })),
        );
        MockVmServiceBuilder { script }
    }

    pub fn ws_uri(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Address as the Flutter tooling writes it to the proxy file.
    pub fn http_uri(&self) -> String {
        format!("http://{}/AbCdEf12=/", self.addr)
    }

    /// `http_uri` after discovery rewrote it to a WebSocket endpoint.
    pub fn proxied_ws_uri(&self) -> String {
        format!("ws://{}/AbCdEf12=/ws", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.method)
            .collect()
    }
}

fn serve_connection(stream: TcpStream, script: &Script, requests: &Mutex<Vec<RecordedRequest>>) {
    // Plain TCP reachability probes never complete a handshake.
    let Ok(mut socket) = tungstenite::accept(stream) else {
        return;
    };
    loop {
        let text = match socket.read() {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => return,
            Ok(_) => continue,
        };
        let Ok(request) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        let method = request["method"].as_str().unwrap_or_default().to_string();
        requests.lock().unwrap().push(RecordedRequest {
            method: method.clone(),
            params: request["params"].clone(),
        });

        if let Some(notification) = &script.notification {
            if socket
                .send(Message::Text(notification.to_string()))
                .is_err()
            {
                return;
            }
        }

        let reply = match script.responses.get(&method) {
            Some(MockResponse::Success(result)) => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "result": result,
            }),
            Some(MockResponse::Error { code, message }) => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": code, "message": message },
            }),
            None => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": -32601, "message": format!("Method not found: {method}") },
            }),
        };
        if socket.send(Message::Text(reply.to_string())).is_err() {
            return;
        }
    }
}
