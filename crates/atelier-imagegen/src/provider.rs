pub(crate) mod runway;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::{error::BackendError, types::GenerationRequest};

/// Identifier of a submitted backend task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle(pub String);

impl std::fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state reported for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Throttled,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// A status this service does not know; treated as still in progress
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Snapshot of a task as returned by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub status: TaskStatus,
    /// Result payload once the task succeeded
    pub output: Option<Value>,
    /// The whole task object, kept for failure diagnostics
    pub raw: Value,
}

#[derive(Deserialize)]
struct TaskEnvelope {
    status: TaskStatus,
    #[serde(default)]
    output: Option<Value>,
}

impl Task {
    /// Interpret a task object, keeping it verbatim in [`Task::raw`]
    pub fn from_value(raw: Value) -> Result<Self, BackendError> {
        let envelope = TaskEnvelope::deserialize(&raw)
            .map_err(|e| BackendError::Decode(format!("malformed task object: {e}")))?;

        Ok(Self {
            status: envelope.status,
            output: envelope.output,
            raw,
        })
    }
}

/// Asynchronous image generation backend
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Create a text-to-image task
    async fn submit(&self, request: &GenerationRequest) -> Result<TaskHandle, BackendError>;

    /// Fetch the current state of a task
    async fn task(&self, handle: &TaskHandle) -> Result<Task, BackendError>;

    /// Get the backend name
    fn name(&self) -> &str;
}
