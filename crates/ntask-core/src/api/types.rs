//! Wire types for the NightTask API.
//!
//! The server's field casing is inconsistent across endpoints: auth and
//! update bodies are TitleCase, create bodies are lowercase. The renames
//! below match the server exactly; do not normalize them without a
//! server-side migration.

use serde::{Deserialize, Serialize};

use crate::tasks::{Task, TaskContext};

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    #[serde(rename = "Email")]
    pub email: &'a str,
    #[serde(rename = "Password")]
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignupRequest<'a> {
    #[serde(rename = "Username")]
    pub username: &'a str,
    #[serde(rename = "Email")]
    pub email: &'a str,
    #[serde(rename = "Password")]
    pub password: &'a str,
}

/// Successful login payload. Extra fields the server may send are ignored.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Successful signup payload.
#[derive(Debug, Deserialize)]
pub struct SignupResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskListResponse {
    pub todos: Vec<Task>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedTaskResponse {
    pub todo: Task,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateTaskRequest<'a> {
    pub title: &'a str,
    pub description: &'a str,
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
    pub context: TaskContext,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateTaskRequest<'a> {
    #[serde(rename = "Title")]
    pub title: &'a str,
    #[serde(rename = "Description")]
    pub description: &'a str,
}
