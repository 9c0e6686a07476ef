//! Task state: the in-memory store and the controller that syncs it with
//! the remote API.

mod controller;
mod store;

pub use controller::{OpError, TaskController, TaskDraft, TaskPatch};
pub use store::{Filter, PendingOp, Task, TaskContext, TaskStore};
