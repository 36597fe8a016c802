//! Test doubles for the sidecar. Compiled with the `testing` feature.
//!
//! Provides:
//! - [`FakeRuntime`]: a [`ContainerRuntime`] that records exec commands and
//!   lifecycle calls instead of touching Docker
//! - [`MockService`]: an in-process HTTP server speaking the sidecar's wire
//!   protocol, with scripted readiness and canned envelopes
//! - [`ready_manager`]: a manager wired to both, already initialized
//!
//! # Usage
//!
//! ```rust,no_run
//! use pythainlp_sidecar::testing::ready_manager;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (manager, service) = ready_manager().await;
//!     let result = manager.tokenize("สวัสดีครับ").await.unwrap();
//!     assert_eq!(service.request_count(), 1);
//! }
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::manager::Manager;
use crate::sidecar::{ContainerRuntime, ExecOutput, PullProgress, Result as SidecarResult};

/// Records what the manager asks of the container.
pub struct FakeRuntime {
    name: String,
    exec_exit_code: Option<i64>,
    execs: Mutex<Vec<Vec<String>>>,
    detached: AtomicU32,
    ensure_calls: AtomicU32,
    recreates: Mutex<Vec<bool>>,
    pulls: AtomicU32,
    stopped: AtomicBool,
    closed: AtomicBool,
}

impl FakeRuntime {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exec_exit_code: None,
            execs: Mutex::new(Vec::new()),
            detached: AtomicU32::new(0),
            ensure_calls: AtomicU32::new(0),
            recreates: Mutex::new(Vec::new()),
            pulls: AtomicU32::new(0),
            stopped: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Make every attached exec exit with `code`.
    pub fn fail_exec_with(mut self, code: i64) -> Self {
        self.exec_exit_code = Some(code);
        self
    }

    /// Attached exec commands, in order.
    pub fn exec_log(&self) -> Vec<Vec<String>> {
        self.execs.lock().unwrap().clone()
    }

    /// How many times the server was launched detached.
    pub fn detached_launches(&self) -> u32 {
        self.detached.load(Ordering::SeqCst)
    }

    pub fn ensure_running_calls(&self) -> u32 {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    /// `no_cache` flag of each `recreate` call.
    pub fn recreates(&self) -> Vec<bool> {
        self.recreates.lock().unwrap().clone()
    }

    pub fn pulls(&self) -> u32 {
        self.pulls.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    fn container_name(&self) -> &str {
        &self.name
    }

    async fn ensure_running(&self) -> SidecarResult<()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        self.stopped.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn recreate(&self, no_cache: bool) -> SidecarResult<()> {
        self.recreates.lock().unwrap().push(no_cache);
        self.stopped.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn pull_image(&self, progress: Option<PullProgress>) -> SidecarResult<()> {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        if let Some(cb) = progress {
            cb(1, 1, "Download complete");
        }
        Ok(())
    }

    async fn exec(&self, cmd: Vec<String>) -> SidecarResult<ExecOutput> {
        self.execs.lock().unwrap().push(cmd);
        Ok(ExecOutput {
            exit_code: Some(self.exec_exit_code.unwrap_or(0)),
            stdout: String::new(),
            stderr: if self.exec_exit_code.is_some() {
                "permission denied".to_string()
            } else {
                String::new()
            },
        })
    }

    async fn exec_detached(&self, _cmd: Vec<String>) -> SidecarResult<()> {
        self.detached.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> SidecarResult<()> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self, keep_running: bool) -> SidecarResult<()> {
        if !keep_running {
            self.stopped.store(true, Ordering::SeqCst);
        }
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

enum Canned {
    Json(StatusCode, Value),
    Raw(String),
}

struct MockState {
    health_calls: AtomicU32,
    /// Health call number (1-based) from which `ready` is reported; 0 = never.
    ready_from: AtomicU32,
    requests: Mutex<Vec<(String, Value)>>,
    canned: Mutex<HashMap<String, Canned>>,
}

/// In-process stand-in for the sidecar's HTTP service.
pub struct MockService {
    addr: SocketAddr,
    state: Arc<MockState>,
    task: JoinHandle<()>,
}

impl MockService {
    /// Start on an ephemeral port; ready from the first health check.
    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            health_calls: AtomicU32::new(0),
            ready_from: AtomicU32::new(1),
            requests: Mutex::new(Vec::new()),
            canned: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/health", get(health))
            .route("/{op}", post(operation))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock service");
        let addr = listener.local_addr().expect("mock service has no address");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state, task }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Report `ready` from the `n`th health check on (1-based).
    pub fn ready_from_call(&self, n: u32) {
        self.state.ready_from.store(n, Ordering::SeqCst);
    }

    /// Never report `ready`.
    pub fn never_ready(&self) {
        self.state.ready_from.store(0, Ordering::SeqCst);
    }

    /// Reply to `POST path` with this envelope.
    pub fn respond(&self, path: &str, envelope: Value) {
        let status = if envelope.get("error").is_some_and(|e| !e.is_null()) {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        };
        self.state
            .canned
            .lock()
            .unwrap()
            .insert(path.to_string(), Canned::Json(status, envelope));
    }

    /// Reply to `POST path` with a non-JSON body.
    pub fn respond_raw(&self, path: &str, body: impl Into<String>) {
        self.state
            .canned
            .lock()
            .unwrap()
            .insert(path.to_string(), Canned::Raw(body.into()));
    }

    pub fn health_calls(&self) -> u32 {
        self.state.health_calls.load(Ordering::SeqCst)
    }

    /// Number of non-health requests received.
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Body of the most recent request to `path`.
    pub fn last_request(&self, path: &str) -> Option<Value> {
        self.state
            .requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn health(State(state): State<Arc<MockState>>) -> Json<Value> {
    let call = state.health_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let ready_from = state.ready_from.load(Ordering::SeqCst);
    let status = if ready_from != 0 && call >= ready_from {
        "ready"
    } else {
        "starting"
    };
    Json(json!({
        "status": status,
        "version": "5.1.2",
        "engines": {
            "tokenize": ["newmm", "longest"],
            "romanize": ["royin", "tltk"],
            "transliterate": ["thaig2p", "iso_11940"],
            "syllable_tokenize": ["han_solo", "dict"]
        }
    }))
}

async fn operation(
    State(state): State<Arc<MockState>>,
    Path(op): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let path = format!("/{op}");
    state
        .requests
        .lock()
        .unwrap()
        .push((path.clone(), body));

    match state.canned.lock().unwrap().get(&path) {
        Some(Canned::Json(status, value)) => (*status, Json(value.clone())).into_response(),
        Some(Canned::Raw(text)) => (StatusCode::OK, text.clone()).into_response(),
        None => match default_envelope(&path) {
            Some(value) => Json(value).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
    }
}

fn default_envelope(path: &str) -> Option<Value> {
    let data = match path {
        "/tokenize" => json!({"tokens": ["สวัสดี", "ครับ"]}),
        "/romanize" => json!({"romanized": "sawatdi khrap"}),
        "/transliterate" => json!({"phonetic": "sa˨˩.wat̚˨˩.diː˧"}),
        "/syllable_tokenize" => json!({"syllables": ["สวัส", "ดี", "ครับ"]}),
        "/analyze" => json!({
            "tokens": ["สวัสดี", "ครับ"],
            "romanized": "sawatdi khrap",
            "romanized_tokens": ["sawatdi", "khrap"]
        }),
        _ => return None,
    };
    Some(json!({
        "data": data,
        "metadata": {"processing_time_ms": 1.5},
        "error": null
    }))
}

/// A manager on a [`FakeRuntime`] pointed at a fresh [`MockService`], with
/// short timings, already initialized.
pub async fn ready_manager() -> (Manager, MockService) {
    let service = MockService::start().await;
    let manager = Manager::builder()
        .port(service.port())
        .runtime(Arc::new(FakeRuntime::new("mock-pythainlp-1")))
        .poll_interval(Duration::from_millis(10))
        .startup_timeout(Duration::from_secs(5))
        .build()
        .await
        .expect("failed to build manager");
    manager
        .init(&CancellationToken::new())
        .await
        .expect("mock service did not become ready");
    (manager, service)
}
