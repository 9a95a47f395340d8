use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use url::Url;

use super::ServerUser;
use crate::config::AuthConfig;

/// Cookie carrying the session token issued by the auth service
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("auth service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("auth service is not configured: {0}")]
    NotConfigured(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub user: Option<ServerUser>,
}

/// The slice of the auth service the callback route needs
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Trade an authorization code for a session; `Ok(None)` when none was established
    async fn exchange_code(&self, code: &str) -> Result<Option<AuthSession>, AuthError>;

    /// Session behind a token taken from the session cookie, if still valid
    async fn session(&self, token: Option<&str>) -> Result<Option<AuthSession>, AuthError>;
}

/// REST client of the auth service
///
/// - `POST auth/exchange` with `{"code": ...}`
/// - `GET auth/session` with the bearer token; 401 means no session
#[derive(Clone)]
pub struct HttpAuthGateway {
    client: Client,
    base_url: Url,
}

impl HttpAuthGateway {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Self::with_client(client, &config.service_url)
    }

    pub fn with_client(client: Client, service_url: &str) -> Result<Self, AuthError> {
        let normalized = if service_url.ends_with('/') {
            service_url.to_string()
        } else {
            format!("{}/", service_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| AuthError::NotConfigured(format!("invalid auth service url '{}': {}", service_url, e)))?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|e| AuthError::NotConfigured(e.to_string()))
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn exchange_code(&self, code: &str) -> Result<Option<AuthSession>, AuthError> {
        let url = self.endpoint("auth/exchange")?;
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(&json!({ "code": code })).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        let session: Option<AuthSession> = response.json().await?;
        Ok(session.filter(|s| !s.access_token.is_empty()))
    }

    async fn session(&self, token: Option<&str>) -> Result<Option<AuthSession>, AuthError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let url = self.endpoint("auth/session")?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).bearer_auth(token).send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(AuthError::Rejected {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }
}
