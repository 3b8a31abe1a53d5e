// crates/lfs-conformance-cli/tests/common/mod.rs
// ============================================================================
// Module: CLI Test Support
// Description: Binary launcher and a conforming stub batch server.
// Purpose: Share process and server helpers across CLI integration tests.
// Dependencies: tiny_http, serde_json, tempfile
// ============================================================================

//! ## Overview
//! [`run_cli`] launches the built binary in an isolated working directory with
//! the conformance environment variables cleared. [`StubLfsServer`] answers
//! batch requests like a conforming Git LFS server for a fixed set of stored
//! object ids.

#![allow(dead_code, reason = "Helpers are shared across test binaries.")]

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Binary
// ============================================================================

/// Returns the path to the built CLI binary.
pub fn cli_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_lfs-conformance"))
}

/// Runs the CLI in `cwd` with conformance environment variables cleared.
pub fn run_cli(cwd: &Path, args: &[&str]) -> Output {
    Command::new(cli_bin())
        .args(args)
        .current_dir(cwd)
        .env_remove("LFS_CONFORMANCE_CONFIG")
        .env_remove("LFS_CONFORMANCE_LANG")
        .output()
        .expect("run lfs-conformance")
}

/// Returns stdout as UTF-8.
pub fn stdout_of(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8 stdout")
}

/// Returns stderr as UTF-8.
pub fn stderr_of(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("utf8 stderr")
}

// ============================================================================
// SECTION: Stub Server
// ============================================================================

/// Conforming stub batch server; stops when dropped.
pub struct StubLfsServer {
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
    api_url: String,
}

impl StubLfsServer {
    /// Starts a stub storing the given object ids.
    pub fn start(stored: &[String]) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind stub"));
        let addr = server.server_addr().to_ip().expect("ip addr");
        let api_url = format!("http://{addr}/api");
        let stored: BTreeSet<String> = stored.iter().cloned().collect();

        let thread_server = Arc::clone(&server);
        let handle = thread::spawn(move || {
            for mut request in thread_server.incoming_requests() {
                let mut raw = String::new();
                let _ = request.as_reader().read_to_string(&mut raw);
                let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);
                let reply = batch_reply(&body, &stored);
                let header = Header::from_bytes(
                    &b"Content-Type"[..],
                    &b"application/vnd.git-lfs+json"[..],
                )
                .expect("header");
                let response = Response::from_string(reply.to_string()).with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            server,
            handle: Some(handle),
            api_url,
        }
    }

    /// Returns the LFS API base URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
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

fn batch_reply(body: &Value, stored: &BTreeSet<String>) -> Value {
    let operation = body["operation"].as_str().unwrap_or_default();
    let objects: Vec<Value> = body["objects"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|object| {
            let oid = object["oid"].as_str().unwrap_or_default();
            match (operation, stored.contains(oid)) {
                ("download", true) => json!({
                    "oid": oid,
                    "size": 0,
                    "actions": {"download": {"href": format!("https://cdn.test/{oid}")}}
                }),
                ("download", false) => json!({
                    "oid": oid,
                    "error": {"code": 404, "message": "Object does not exist"}
                }),
                ("upload", true) => json!({"oid": oid, "size": 0}),
                _ => json!({
                    "oid": oid,
                    "size": 0,
                    "actions": {"upload": {"href": format!("https://cdn.test/{oid}")}}
                }),
            }
        })
        .collect();
    json!({"transfer": "basic", "objects": objects})
}
