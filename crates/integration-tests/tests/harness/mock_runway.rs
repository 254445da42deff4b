//! Mock Runway backend for integration tests
//!
//! Accepts text-to-image tasks and replays a scripted sequence of task
//! snapshots to status polls. Every submission gets its own task id and its
//! own copy of the script.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Mock Runway API
pub struct MockRunway {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockRunwayState>,
}

/// Prompt whose tasks stay `RUNNING` until released
struct Hold {
    prompt: String,
    output: Value,
}

enum TaskScript {
    /// Snapshots served in order; the last one repeats
    Replay(VecDeque<Value>),
    Held,
}

struct MockRunwayState {
    request_count: AtomicU32,
    submit_count: AtomicU32,
    poll_count: AtomicU32,
    next_task: AtomicU32,
    /// Status and body returned by the creation call instead of a task id
    reject_submit: Option<(StatusCode, String)>,
    script: Vec<Value>,
    hold: Option<Hold>,
    released: AtomicBool,
    tasks: Mutex<HashMap<String, TaskScript>>,
    submitted: Mutex<Vec<Value>>,
    headers: Mutex<Vec<HeaderMap>>,
}

impl MockRunway {
    /// Task that runs briefly, then succeeds with `output`
    pub async fn succeeding(output: Value) -> anyhow::Result<Self> {
        Self::start_inner(None, succeeding_script(output), None).await
    }

    /// Task that ends in the given terminal snapshot
    pub async fn finishing_with(task: Value) -> anyhow::Result<Self> {
        Self::start_inner(None, vec![json!({"id": "task_0001", "status": "RUNNING"}), task], None).await
    }

    /// Creation call answers `status` with `body`
    pub async fn rejecting(status: StatusCode, body: &str) -> anyhow::Result<Self> {
        Self::start_inner(Some((status, body.to_owned())), Vec::new(), None).await
    }

    /// Tasks for `prompt` keep running until [`MockRunway::release`], then
    /// succeed with `held_output`; all other tasks succeed with `output`
    pub async fn holding(prompt: &str, held_output: Value, output: Value) -> anyhow::Result<Self> {
        let hold = Hold {
            prompt: prompt.to_owned(),
            output: held_output,
        };
        Self::start_inner(None, succeeding_script(output), Some(hold)).await
    }

    async fn start_inner(
        reject_submit: Option<(StatusCode, String)>,
        script: Vec<Value>,
        hold: Option<Hold>,
    ) -> anyhow::Result<Self> {
        let state = Arc::new(MockRunwayState {
            request_count: AtomicU32::new(0),
            submit_count: AtomicU32::new(0),
            poll_count: AtomicU32::new(0),
            next_task: AtomicU32::new(1),
            reject_submit,
            script,
            hold,
            released: AtomicBool::new(false),
            tasks: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            headers: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/text_to_image", routing::post(handle_text_to_image))
            .route("/v1/tasks/{id}", routing::get(handle_task))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL including the `/v1` prefix
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Let held tasks finish on their next poll
    pub fn release(&self) {
        self.state.released.store(true, Ordering::SeqCst);
    }

    /// Requests of any kind received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    pub fn submit_count(&self) -> u32 {
        self.state.submit_count.load(Ordering::Relaxed)
    }

    pub fn poll_count(&self) -> u32 {
        self.state.poll_count.load(Ordering::Relaxed)
    }

    /// Bodies of every creation call, in arrival order
    pub fn submitted(&self) -> Vec<Value> {
        self.state.submitted.lock().unwrap().clone()
    }

    /// Headers of every request, in arrival order
    pub fn headers(&self) -> Vec<HeaderMap> {
        self.state.headers.lock().unwrap().clone()
    }
}

impl Drop for MockRunway {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn succeeding_script(output: Value) -> Vec<Value> {
    vec![
        json!({"id": "task_0001", "status": "PENDING"}),
        json!({"id": "task_0001", "status": "RUNNING"}),
        json!({"id": "task_0001", "status": "SUCCEEDED", "output": output}),
    ]
}

async fn handle_text_to_image(
    State(state): State<Arc<MockRunwayState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    state.submit_count.fetch_add(1, Ordering::Relaxed);
    state.headers.lock().unwrap().push(headers);

    if let Some((status, ref message)) = state.reject_submit {
        state.submitted.lock().unwrap().push(body);
        return (status, message.clone()).into_response();
    }

    let held = state
        .hold
        .as_ref()
        .is_some_and(|hold| body["promptText"] == hold.prompt.as_str());
    let script = if held {
        TaskScript::Held
    } else {
        TaskScript::Replay(state.script.clone().into())
    };

    let id = format!("task_{:04}", state.next_task.fetch_add(1, Ordering::SeqCst));
    state.tasks.lock().unwrap().insert(id.clone(), script);
    state.submitted.lock().unwrap().push(body);

    Json(json!({"id": id})).into_response()
}

async fn handle_task(State(state): State<Arc<MockRunwayState>>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    state.poll_count.fetch_add(1, Ordering::Relaxed);
    state.headers.lock().unwrap().push(headers);

    let mut tasks = state.tasks.lock().unwrap();
    let snapshot = match tasks.get_mut(&id) {
        Some(TaskScript::Replay(snapshots)) if snapshots.len() > 1 => snapshots.pop_front(),
        Some(TaskScript::Replay(snapshots)) => snapshots.front().cloned(),
        Some(TaskScript::Held) if state.released.load(Ordering::SeqCst) => {
            let output = state.hold.as_ref().map_or(Value::Null, |hold| hold.output.clone());
            Some(json!({"id": id, "status": "SUCCEEDED", "output": output}))
        }
        Some(TaskScript::Held) => Some(json!({"id": id, "status": "RUNNING"})),
        None => None,
    };

    match snapshot {
        Some(task) => Json(task).into_response(),
        None => (StatusCode::NOT_FOUND, "unknown task").into_response(),
    }
}
