//! HTTP gateway to the NightTask API.

mod client;
mod errors;
mod types;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use errors::{ApiError, ApiErrorKind, UNKNOWN_ERROR};
pub use types::{LoginResponse, SignupResponse};
