//! Auth command handlers.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use ntask_core::api::ApiClient;
use ntask_core::auth;
use ntask_core::config::Config;
use ntask_core::credentials::{TokenStore, mask_token};
use ntask_core::session::{Gate, SessionGuard};

pub async fn login(
    config: &Config,
    tokens: &TokenStore,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    // Login is an unauthenticated-only view: an existing credential redirects
    // to the task list unless the user chooses to replace the session.
    let mut guard = SessionGuard::new();
    if guard.resolve(false, tokens) == Gate::RedirectToTasks {
        let existing = tokens.get().unwrap_or_default();
        println!("Already logged in (token: {}).", mask_token(&existing));
        print!("Do you want to replace the existing session? [y/N] ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().lock().read_line(&mut response)?;
        if !response.trim().eq_ignore_ascii_case("y") {
            println!("Login cancelled.");
            return Ok(());
        }
    }

    let email = prompt_if_missing(email, "Email: ")?;
    let password = prompt_if_missing(password, "Password: ")?;

    let api = ApiClient::new(config, tokens.clone())?;
    let token = auth::login(&api, tokens, email.trim(), &password).await?;

    println!("✓ Logged in (token: {})", mask_token(&token));
    println!("  Credentials saved to: {}", tokens.path().display());

    Ok(())
}

pub async fn signup(
    config: &Config,
    tokens: &TokenStore,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = prompt_if_missing(username, "Username: ")?;
    let email = prompt_if_missing(email, "Email: ")?;
    let password = prompt_if_missing(password, "Password: ")?;

    let api = ApiClient::new(config, tokens.clone())?;
    let message = auth::signup(&api, username.trim(), email.trim(), &password).await?;

    // Signup does not open a session; direct the user to log in.
    println!("✓ {message}");
    println!("  You can now log in with `ntask login`.");

    Ok(())
}

pub fn logout(tokens: &TokenStore) -> Result<()> {
    let had_token = tokens.clear()?;

    if had_token {
        println!("✓ Logged out");
        println!("  Credentials removed from: {}", tokens.path().display());
    } else {
        println!("Not logged in (no credentials found).");
    }

    Ok(())
}

fn prompt_if_missing(value: Option<String>, prompt: &str) -> Result<String> {
    if let Some(v) = value {
        return Ok(v);
    }

    print!("{prompt}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let trimmed = input.trim();
    if trimmed.is_empty() {
        anyhow::bail!("Please fill in all required fields");
    }
    Ok(trimmed.to_string())
}
