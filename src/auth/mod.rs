//! Identity handed over by the auth proxy, and the callback glue around the
//! external auth service. Token handling itself belongs to that service.

pub mod callback;
pub mod gateway;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

pub use callback::{handle_callback, safe_next, CallbackOutcome, CallbackParams};
pub use gateway::{AuthError, AuthGateway, AuthSession, HttpAuthGateway, SESSION_COOKIE};

const USER_JSON_HEADER: &str = "x-user";
const USER_ID_HEADER: &str = "x-user-id";

/// User of the current request as resolved by the auth proxy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ServerUser {
    /// Legacy JSON `x-user` header first, then the individual `x-user-*` headers
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        if let Some(raw) = header(headers, USER_JSON_HEADER) {
            match serde_json::from_str::<ServerUser>(&raw) {
                Ok(user) => return Some(user),
                Err(e) => tracing::debug!("ignoring unparsable x-user header: {}", e),
            }
        }

        let id = header(headers, USER_ID_HEADER)?;
        Some(Self {
            id,
            email: header(headers, "x-user-email"),
            first_name: header(headers, "x-user-first-name"),
            last_name: header(headers, "x-user-last-name"),
            avatar: header(headers, "x-user-avatar"),
            role: header(headers, "x-user-role"),
        })
    }

    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            full
        } else {
            self.email.clone().unwrap_or_else(|| self.id.clone())
        }
    }
}

/// Value of the session cookie, if the request carries one
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Non-empty header value
fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
