// crates/lfs-conformance-checks/tests/common/mod.rs
// ============================================================================
// Module: Stub Batch Server
// Description: Minimal tiny_http Git LFS batch endpoint for check tests.
// Purpose: Serve compliant and deliberately broken batch responses.
// Dependencies: tiny_http, serde_json
// ============================================================================

//! ## Overview
//! [`StubLfsServer`] answers `POST /api/objects/batch` from a fixed set of
//! stored object ids and records every request it receives. The server stops
//! when dropped.

#![allow(dead_code, reason = "Helpers are shared across test binaries.")]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Request;
use tiny_http::Response;
use tiny_http::Server;

/// Path prefix the stub mounts the LFS API under.
pub const API_PREFIX: &str = "/api";

/// Stub response behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubMode {
    /// Answers like a conforming server.
    Compliant,
    /// Offers download and upload actions for every object.
    Permissive,
    /// Answers every request with the given status and an empty body.
    Status(u16),
    /// Answers 200 with a non-JSON body.
    NotJson,
    /// Answers 200 with an empty object list.
    DropObjects,
}

/// Request captured by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Content-Type header value.
    pub content_type: Option<String>,
    /// Accept header value.
    pub accept: Option<String>,
    /// Parsed JSON body.
    pub body: Value,
}

/// Running stub server.
pub struct StubLfsServer {
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    base_url: String,
}

impl StubLfsServer {
    /// Starts a stub storing the given object ids.
    pub fn start(stored: &[&str], mode: StubMode) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let base_url = format!("http://{addr}{API_PREFIX}");
        let stored: BTreeSet<String> = stored.iter().map(|oid| (*oid).to_string()).collect();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let thread_server = Arc::clone(&server);
        let thread_requests = Arc::clone(&requests);
        let thread_base = base_url.clone();
        let handle = thread::spawn(move || {
            for request in thread_server.incoming_requests() {
                handle_request(request, &stored, mode, &thread_base, &thread_requests);
            }
        });

        Self {
            server,
            handle: Some(handle),
            requests,
            base_url,
        }
    }

    /// Returns the LFS API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubLfsServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn header_value(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().to_string())
}

fn handle_request(
    mut request: Request,
    stored: &BTreeSet<String>,
    mode: StubMode,
    base_url: &str,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let mut raw = String::new();
    let _ = request.as_reader().read_to_string(&mut raw);
    let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);
    requests.lock().unwrap().push(RecordedRequest {
        method: request.method().to_string(),
        path: request.url().to_string(),
        content_type: header_value(&request, "Content-Type"),
        accept: header_value(&request, "Accept"),
        body: body.clone(),
    });

    if request.url() != format!("{API_PREFIX}/objects/batch") {
        let _ = request.respond(Response::from_string("not found").with_status_code(404));
        return;
    }

    let response = match mode {
        StubMode::Status(code) => Response::from_string(String::new()).with_status_code(code),
        StubMode::NotJson => Response::from_string("<html>oops</html>"),
        StubMode::DropObjects => lfs_json(&json!({"transfer": "basic", "objects": []})),
        StubMode::Compliant => lfs_json(&batch_reply(&body, base_url, |oid| stored.contains(oid))),
        StubMode::Permissive => lfs_json(&permissive_reply(&body, base_url)),
    };
    let _ = request.respond(response);
}

fn lfs_json(value: &Value) -> Response<std::io::Cursor<Vec<u8>>> {
    let header =
        Header::from_bytes(&b"Content-Type"[..], &b"application/vnd.git-lfs+json"[..]).unwrap();
    Response::from_string(value.to_string()).with_header(header)
}

fn requested(body: &Value) -> (String, Vec<String>) {
    let operation = body["operation"].as_str().unwrap_or_default().to_string();
    let oids = body["objects"]
        .as_array()
        .map(|objects| {
            objects
                .iter()
                .map(|object| object["oid"].as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default();
    (operation, oids)
}

fn batch_reply(body: &Value, base_url: &str, is_stored: impl Fn(&str) -> bool) -> Value {
    let (operation, oids) = requested(body);
    let objects: Vec<Value> = oids
        .iter()
        .map(|oid| {
            let href = format!("{base_url}/objects/{oid}");
            match (operation.as_str(), is_stored(oid)) {
                ("download", true) => json!({
                    "oid": oid,
                    "size": 0,
                    "actions": {"download": {"href": href}}
                }),
                ("download", false) => json!({
                    "oid": oid,
                    "size": 0,
                    "error": {"code": 404, "message": "Object does not exist"}
                }),
                ("upload", true) => json!({"oid": oid, "size": 0}),
                _ => json!({
                    "oid": oid,
                    "size": 0,
                    "actions": {"upload": {"href": href}}
                }),
            }
        })
        .collect();
    json!({"transfer": "basic", "objects": objects})
}

fn permissive_reply(body: &Value, base_url: &str) -> Value {
    let (_operation, oids) = requested(body);
    let objects: Vec<Value> = oids
        .iter()
        .map(|oid| {
            let href = format!("{base_url}/objects/{oid}");
            json!({
                "oid": oid,
                "size": 0,
                "actions": {"download": {"href": href}, "upload": {"href": href}}
            })
        })
        .collect();
    json!({"transfer": "basic", "objects": objects})
}
