//! In-memory task collection and its state transitions.
//!
//! The store is pure state: every mutation is a synchronous transition, and
//! the clock is passed in by the caller so transitions are deterministic
//! under test. The controller decides when transitions run relative to
//! network calls.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category tag attached to a task for display grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskContext {
    Work,
    Personal,
    Learning,
    /// Fallback for context values this client does not know about.
    #[serde(other)]
    Other,
}

impl fmt::Display for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskContext::Work => write!(f, "work"),
            TaskContext::Personal => write!(f, "personal"),
            TaskContext::Learning => write!(f, "learning"),
            TaskContext::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for TaskContext {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "work" => Ok(TaskContext::Work),
            "personal" => Ok(TaskContext::Personal),
            "learning" => Ok(TaskContext::Learning),
            "other" => Ok(TaskContext::Other),
            other => anyhow::bail!(
                "Unknown context '{other}' (expected work, personal, learning, or other)"
            ),
        }
    }
}

/// A single to-do record.
///
/// Field names on the wire are camelCase; `id` and both timestamps are
/// server-assigned. `updated_at` may be client-stamped after a successful
/// toggle or update, approximating the server's value until the next full
/// load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub context: TaskContext,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-flight mutation marker for a task.
///
/// At most one marker exists per task id; the controller rejects a second
/// submission while one is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    Creating,
    Updating,
    Deleting,
    Toggling,
}

impl fmt::Display for PendingOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingOp::Creating => write!(f, "create"),
            PendingOp::Updating => write!(f, "update"),
            PendingOp::Deleting => write!(f, "delete"),
            PendingOp::Toggling => write!(f, "toggle"),
        }
    }
}

/// Pure projection over the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl std::str::FromStr for Filter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            other => anyhow::bail!("Unknown filter '{other}' (expected all, active, or completed)"),
        }
    }
}

/// Owns the task list and all pending-operation markers.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    pending: HashMap<String, PendingOp>,
    creating: bool,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Replaces the store contents wholesale (full load from the server).
    /// Outstanding markers refer to the previous generation and are dropped.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.pending.clear();
        self.creating = false;
    }

    /// Inserts a task, replacing any existing task with the same id.
    /// Ids are unique within the store.
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// Flips a task's completion flag and stamps `updated_at`.
    /// Returns false (and changes nothing) if the id is not present.
    pub fn apply_toggle(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.is_completed = !task.is_completed;
                task.updated_at = now;
                true
            }
            None => false,
        }
    }

    /// Merges a new title and description into a task and stamps `updated_at`.
    /// Returns false (and changes nothing) if the id is not present.
    pub fn apply_update(
        &mut self,
        id: &str,
        title: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.title = title.to_string();
                task.description = description.to_string();
                task.updated_at = now;
                true
            }
            None => false,
        }
    }

    /// Removes a task. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Removes every completed task. Local-only; the server is not told.
    /// Returns the number of tasks removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.is_completed);
        before - self.tasks.len()
    }

    /// Projects the store through a filter without mutating it.
    pub fn filter(&self, filter: Filter) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| match filter {
            Filter::All => true,
            Filter::Active => !t.is_completed,
            Filter::Completed => t.is_completed,
        })
    }

    /// Number of tasks not yet completed.
    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_completed).count()
    }

    /// Returns the in-flight marker for a task id, if any.
    pub fn pending(&self, id: &str) -> Option<PendingOp> {
        self.pending.get(id).copied()
    }

    /// Whether a create is currently in flight.
    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub(crate) fn begin(&mut self, id: &str, op: PendingOp) {
        self.pending.insert(id.to_string(), op);
    }

    pub(crate) fn finish(&mut self, id: &str) {
        self.pending.remove(id);
    }

    pub(crate) fn begin_create(&mut self) {
        self.creating = true;
    }

    pub(crate) fn finish_create(&mut self) {
        self.creating = false;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn task(id: &str, title: &str, completed: bool) -> Task {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{title} details"),
            context: TaskContext::Work,
            is_completed: completed,
            created_at: ts,
            updated_at: ts,
        }
    }

    /// Upsert keeps ids unique: a second insert with the same id replaces.
    #[test]
    fn test_upsert_keeps_ids_unique() {
        let mut store = TaskStore::new();
        store.upsert(task("t1", "A", false));
        store.upsert(task("t1", "A2", true));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("t1").unwrap().title, "A2");
    }

    /// Toggle flips the flag and advances updated_at.
    #[test]
    fn test_apply_toggle_flips_and_stamps() {
        let mut store = TaskStore::new();
        store.upsert(task("t1", "A", false));
        let before = store.get("t1").unwrap().updated_at;

        let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        assert!(store.apply_toggle("t1", now));

        let toggled = store.get("t1").unwrap();
        assert!(toggled.is_completed);
        assert!(toggled.updated_at > before);
    }

    /// Toggle of an unknown id is a no-op.
    #[test]
    fn test_apply_toggle_unknown_id_is_noop() {
        let mut store = TaskStore::new();
        store.upsert(task("t1", "A", false));

        assert!(!store.apply_toggle("missing", Utc::now()));
        assert!(!store.get("t1").unwrap().is_completed);
        assert_eq!(store.len(), 1);
    }

    /// Update merges title/description and stamps updated_at.
    #[test]
    fn test_apply_update_merges() {
        let mut store = TaskStore::new();
        store.upsert(task("t1", "A", false));
        let before = store.get("t1").unwrap().updated_at;

        let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        assert!(store.apply_update("t1", "New", "Y", now));

        let updated = store.get("t1").unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.description, "Y");
        assert!(updated.updated_at > before);
    }

    /// clear_completed removes exactly the completed tasks at call time.
    #[test]
    fn test_clear_completed_removes_exactly_completed() {
        let mut store = TaskStore::new();
        store.upsert(task("t1", "A", true));
        store.upsert(task("t2", "B", false));
        store.upsert(task("t3", "C", true));

        assert_eq!(store.clear_completed(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.get("t2").is_some());
    }

    /// filter(active) ∪ filter(completed) == filter(all) as sets.
    #[test]
    fn test_filter_partition() {
        let mut store = TaskStore::new();
        store.upsert(task("t1", "A", true));
        store.upsert(task("t2", "B", false));
        store.upsert(task("t3", "C", true));

        let mut split: Vec<&str> = store
            .filter(Filter::Active)
            .chain(store.filter(Filter::Completed))
            .map(|t| t.id.as_str())
            .collect();
        split.sort_unstable();

        let mut all: Vec<&str> = store.filter(Filter::All).map(|t| t.id.as_str()).collect();
        all.sort_unstable();

        assert_eq!(split, all);
    }

    /// remaining counts only active tasks.
    #[test]
    fn test_remaining_counts_active() {
        let mut store = TaskStore::new();
        store.upsert(task("t1", "A", true));
        store.upsert(task("t2", "B", false));

        assert_eq!(store.remaining(), 1);
    }

    /// replace_all drops markers from the previous generation.
    #[test]
    fn test_replace_all_clears_markers() {
        let mut store = TaskStore::new();
        store.upsert(task("t1", "A", false));
        store.begin("t1", PendingOp::Toggling);
        store.begin_create();

        store.replace_all(vec![task("t9", "Z", false)]);

        assert_eq!(store.pending("t1"), None);
        assert!(!store.is_creating());
        assert_eq!(store.len(), 1);
    }

    /// Unknown context values deserialize to Other.
    #[test]
    fn test_unknown_context_maps_to_other() {
        let json = r#"{
            "id": "t1",
            "title": "A",
            "description": "d",
            "context": "gardening",
            "isCompleted": false,
            "createdAt": "2025-06-01T10:00:00Z",
            "updatedAt": "2025-06-01T10:00:00Z"
        }"#;
        let parsed: Task = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.context, TaskContext::Other);
    }
}
