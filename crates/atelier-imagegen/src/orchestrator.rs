//! Task lifecycle: submit, wait for a terminal state, classify the outcome

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::{
    error::BackendError,
    extract,
    provider::{Task, TaskBackend, TaskHandle, TaskStatus},
    types::{GenerationOutcome, GenerationRequest},
};

/// How long and how often a submitted task is polled
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Error)]
enum TaskError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Timed out waiting for Runway task {task} after {}s", .waited.as_secs())]
    TimedOut { task: TaskHandle, waited: Duration },
}

/// Run one generation on `backend` and classify how it ended
///
/// Submits once and never retries. Every failure becomes an outcome; this
/// function does not return errors.
pub async fn run(backend: &dyn TaskBackend, request: &GenerationRequest, policy: WaitPolicy) -> GenerationOutcome {
    let task = match submit_and_wait(backend, request, policy).await {
        Ok(task) => task,
        Err(e) => {
            tracing::error!(backend = backend.name(), error = %e, "image generation did not complete");
            return GenerationOutcome::UnexpectedError { message: e.to_string() };
        }
    };

    classify(task)
}

async fn submit_and_wait(
    backend: &dyn TaskBackend,
    request: &GenerationRequest,
    policy: WaitPolicy,
) -> Result<Task, TaskError> {
    let handle = backend.submit(request).await?;
    wait_for_task_output(backend, &handle, policy).await
}

/// Poll `handle` until it reaches a terminal state or `max_wait` elapses
async fn wait_for_task_output(
    backend: &dyn TaskBackend,
    handle: &TaskHandle,
    policy: WaitPolicy,
) -> Result<Task, TaskError> {
    let started = Instant::now();

    loop {
        let task = backend.task(handle).await?;

        if task.status.is_terminal() {
            tracing::debug!(
                task_id = %handle,
                status = ?task.status,
                elapsed_ms = started.elapsed().as_millis(),
                "task finished"
            );
            return Ok(task);
        }

        if started.elapsed() + policy.poll_interval > policy.max_wait {
            return Err(TaskError::TimedOut {
                task: handle.clone(),
                waited: started.elapsed(),
            });
        }

        tracing::trace!(task_id = %handle, status = ?task.status, "task still in progress");
        tokio::time::sleep(policy.poll_interval).await;
    }
}

fn classify(task: Task) -> GenerationOutcome {
    match task.status {
        TaskStatus::Succeeded => match extract::image_url(task.output.as_ref()) {
            Some(image_url) => GenerationOutcome::Success { image_url },
            None => {
                tracing::warn!("task succeeded without an image URL in its output");
                GenerationOutcome::NotFound
            }
        },
        TaskStatus::Failed | TaskStatus::Cancelled => {
            tracing::warn!(status = ?task.status, "Runway task failed");
            GenerationOutcome::TaskFailure { details: task.raw }
        }
        status @ (TaskStatus::Pending | TaskStatus::Throttled | TaskStatus::Running | TaskStatus::Unknown) => {
            GenerationOutcome::UnexpectedError {
                message: format!("Runway task ended in non-terminal status {status:?}"),
            }
        }
    }
}
