//! Orchestrates task CRUD against the API gateway.
//!
//! Each operation validates locally before touching the network and holds
//! the relevant pending marker for the duration of the call; the store is
//! patched only after the server has answered. Nothing retries
//! automatically; failures leave prior state intact.

use std::fmt;

use chrono::Utc;

use super::store::{Filter, PendingOp, Task, TaskContext, TaskStore};
use crate::api::{ApiClient, ApiError};

/// User input for a new task.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub context: TaskContext,
}

/// User input for an edit. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Failure outcome of a controller operation.
#[derive(Debug)]
pub enum OpError {
    /// Local validation failure; nothing was sent to the server.
    Validation(String),
    /// A mutation is already in flight for this task (or a create is, when
    /// `id` is `None`).
    InFlight { id: Option<String>, op: PendingOp },
    /// Normalized transport or server failure.
    Api(ApiError),
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpError::Validation(msg) => write!(f, "{msg}"),
            OpError::InFlight { id: Some(id), op } => {
                write!(f, "A {op} for task {id} is already in flight")
            }
            OpError::InFlight { id: None, op } => write!(f, "A {op} is already in flight"),
            OpError::Api(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for OpError {}

impl From<ApiError> for OpError {
    fn from(e: ApiError) -> Self {
        OpError::Api(e)
    }
}

/// Owns the task store and drives every mutation against the gateway.
///
/// `&mut self` on every operation keeps store mutation single-threaded; the
/// pending markers additionally reject duplicate submissions from UI layers
/// that interleave events between awaits.
pub struct TaskController {
    api: ApiClient,
    store: TaskStore,
}

impl TaskController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            store: TaskStore::new(),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Fetches the full list and replaces the store wholesale.
    /// On failure the store is left empty; the error is surfaced, not retried.
    pub async fn load(&mut self) -> Result<usize, OpError> {
        match self.api.list_tasks().await {
            Ok(tasks) => {
                let count = tasks.len();
                self.store.replace_all(tasks);
                Ok(count)
            }
            Err(e) => {
                self.store.replace_all(Vec::new());
                Err(e.into())
            }
        }
    }

    /// Creates a task from a draft. The server assigns id and timestamps;
    /// the returned record is appended to the store.
    pub async fn create(&mut self, draft: TaskDraft) -> Result<Task, OpError> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(OpError::Validation("Task title cannot be empty".into()));
        }
        let description = draft.description.trim().to_string();
        if description.is_empty() {
            return Err(OpError::Validation(
                "Task description cannot be empty".into(),
            ));
        }
        if self.store.is_creating() {
            return Err(OpError::InFlight {
                id: None,
                op: PendingOp::Creating,
            });
        }

        self.store.begin_create();
        let result = self.api.create_task(&title, &description, draft.context).await;
        self.store.finish_create();

        let task = result?;
        self.store.upsert(task.clone());
        Ok(task)
    }

    /// Toggles a task's completion status.
    ///
    /// On success the flag is flipped locally and `updated_at` stamped with
    /// the client clock; the server does not echo the record, so the stamp
    /// is an approximation until the next load. An id unknown to the store
    /// still sends the request; a success response is then a store no-op.
    pub async fn toggle(&mut self, id: &str) -> Result<(), OpError> {
        self.ensure_idle(id)?;

        self.store.begin(id, PendingOp::Toggling);
        let result = self.api.toggle_task(id).await;
        self.store.finish(id);

        result?;
        self.store.apply_toggle(id, Utc::now());
        Ok(())
    }

    /// Edits a task's title and/or description.
    ///
    /// Rejects locally when the resulting title or description would be
    /// empty. On success the patch is merged locally with a client-clock
    /// `updated_at` stamp; on failure the task is left unmodified.
    pub async fn update(&mut self, id: &str, patch: TaskPatch) -> Result<(), OpError> {
        let (title, description) = {
            let Some(current) = self.store.get(id) else {
                return Err(OpError::Validation(format!("No task with id {id}")));
            };
            (
                patch.title.unwrap_or_else(|| current.title.clone()),
                patch
                    .description
                    .unwrap_or_else(|| current.description.clone()),
            )
        };

        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(OpError::Validation("Task title cannot be empty".into()));
        }
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(OpError::Validation(
                "Task description cannot be empty".into(),
            ));
        }
        self.ensure_idle(id)?;

        self.store.begin(id, PendingOp::Updating);
        let result = self.api.update_task(id, &title, &description).await;
        self.store.finish(id);

        result?;
        self.store.apply_update(id, &title, &description, Utc::now());
        Ok(())
    }

    /// Deletes a task. On success it is removed from the store; on failure
    /// it remains.
    pub async fn delete(&mut self, id: &str) -> Result<(), OpError> {
        self.ensure_idle(id)?;

        self.store.begin(id, PendingOp::Deleting);
        let result = self.api.delete_task(id).await;
        self.store.finish(id);

        result?;
        self.store.remove(id);
        Ok(())
    }

    /// Removes completed tasks from the local store only. The server keeps
    /// them, so they resurface on the next [`TaskController::load`].
    pub fn clear_completed(&mut self) -> usize {
        self.store.clear_completed()
    }

    /// Pure projection over the store.
    pub fn filter(&self, filter: Filter) -> Vec<&Task> {
        self.store.filter(filter).collect()
    }

    fn ensure_idle(&self, id: &str) -> Result<(), OpError> {
        match self.store.pending(id) {
            Some(op) => Err(OpError::InFlight {
                id: Some(id.to_string()),
                op,
            }),
            None => Ok(()),
        }
    }
}
