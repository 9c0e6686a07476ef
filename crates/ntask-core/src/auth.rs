//! Login and signup flows.
//!
//! Local validation runs before any network call and produces deterministic
//! messages; server-side failures surface the server's message verbatim.
//! Login stores the returned token; signup never does, so a fresh account
//! still has to log in.

use std::sync::OnceLock;

use anyhow::{Context, Result, bail};
use regex::Regex;

use crate::api::ApiClient;
use crate::credentials::TokenStore;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

/// Validates an email address locally.
pub fn validate_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        bail!("Please fill in all required fields");
    }
    if !email_pattern().is_match(email) {
        bail!("Please enter a valid email address");
    }
    Ok(())
}

/// Validates a password locally.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        bail!("Please fill in all required fields");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("Password must be at least 6 characters");
    }
    Ok(())
}

/// Exchanges credentials for a session token and stores it.
///
/// Returns the token so callers can echo a masked version.
pub async fn login(
    api: &ApiClient,
    tokens: &TokenStore,
    email: &str,
    password: &str,
) -> Result<String> {
    validate_email(email)?;
    validate_password(password)?;

    let response = api.login(email, password).await?;
    tokens.set(&response.token).context("store session token")?;

    Ok(response.token)
}

/// Registers a new identity. Does not store a token.
///
/// Returns the server's confirmation message; the caller should direct the
/// user to log in next.
pub async fn signup(api: &ApiClient, username: &str, email: &str, password: &str) -> Result<String> {
    if username.trim().is_empty() {
        bail!("Username is required for signup");
    }
    validate_email(email)?;
    validate_password(password)?;

    let response = api.signup(username, email, password).await?;
    Ok(response.message)
}
