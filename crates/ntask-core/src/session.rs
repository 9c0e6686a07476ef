//! Session gating for authenticated and login-only views.
//!
//! The guard never inspects the token's contents. Presence is the only
//! signal; the server is the sole judge of validity.

use crate::credentials::TokenStore;

/// Gate decision for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Initial state; no decision made yet.
    Checking,
    /// The requested view may be shown.
    Admit,
    /// The view requires authentication and no credential is present.
    RedirectToLogin,
    /// A credential is present on an unauthenticated-only view.
    RedirectToTasks,
}

/// Per-view session guard.
///
/// Starts in `Checking`; a call to [`SessionGuard::resolve`] always settles
/// the state in the same pass, since the credential read is synchronous.
/// Re-resolve whenever the guarded view or the credential changes.
#[derive(Debug)]
pub struct SessionGuard {
    state: Gate,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self {
            state: Gate::Checking,
        }
    }

    pub fn state(&self) -> Gate {
        self.state
    }

    /// Resolves the gate for a view against the current credential.
    pub fn resolve(&mut self, requires_auth: bool, tokens: &TokenStore) -> Gate {
        self.state = Self::decide(requires_auth, tokens.get().is_some());
        self.state
    }

    /// The pure transition rule.
    pub fn decide(requires_auth: bool, has_token: bool) -> Gate {
        match (requires_auth, has_token) {
            (true, false) => Gate::RedirectToLogin,
            (false, true) => Gate::RedirectToTasks,
            _ => Gate::Admit,
        }
    }
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}
