use serde::Deserialize;

use super::gateway::{AuthGateway, AuthSession};

pub const LOGIN_FAILED_REDIRECT: &str = "/login?error=auth_failed";
pub const INVALID_TOKEN_REDIRECT: &str = "/auth/reset-password?error=invalid_token";

/// Query of `GET /auth/callback`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub next: Option<String>,
    #[serde(rename = "type")]
    pub flow: Option<String>,
}

impl CallbackParams {
    fn is_recovery(&self) -> bool {
        self.flow.as_deref() == Some("recovery")
            || self.next.as_deref().map_or(false, |n| n.contains("reset-password"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub location: String,
    /// Session established by a code exchange, to be stored in the session cookie
    pub session: Option<AuthSession>,
}

impl CallbackOutcome {
    fn redirect(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            session: None,
        }
    }
}

/// Same-origin relative target, `/` otherwise
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") && !n.contains('\\') => n.to_string(),
        _ => "/".to_string(),
    }
}

/// Decide where the auth callback sends the browser.
///
/// A code is exchanged first; a failed exchange or a missing session goes to
/// login with `error=auth_failed`. Recovery flows then need a live session or
/// go to the reset page with `error=invalid_token`.
pub async fn handle_callback(
    gateway: &dyn AuthGateway,
    params: &CallbackParams,
    session_token: Option<&str>,
) -> CallbackOutcome {
    let mut session = None;

    if let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) {
        match gateway.exchange_code(code).await {
            Ok(Some(established)) => session = Some(established),
            Ok(None) => {
                tracing::error!("auth callback: session not found after code exchange");
                return CallbackOutcome::redirect(LOGIN_FAILED_REDIRECT);
            }
            Err(e) => {
                tracing::error!("auth callback: error exchanging code: {}", e);
                return CallbackOutcome::redirect(LOGIN_FAILED_REDIRECT);
            }
        }
    }

    if params.is_recovery() && session.is_none() {
        let current = match gateway.session(session_token).await {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!("auth callback: session lookup failed: {}", e);
                None
            }
        };
        if current.is_none() {
            return CallbackOutcome::redirect(INVALID_TOKEN_REDIRECT);
        }
    }

    CallbackOutcome {
        location: safe_next(params.next.as_deref()),
        session,
    }
}
