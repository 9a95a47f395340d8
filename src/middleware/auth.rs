use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use url::form_urlencoded;

use crate::app::AppState;
use crate::auth::{session_token, AuthGateway, ServerUser};
use crate::error::ApiError;

/// User resolved by [`require_user`], always `None` on public routes
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<ServerUser>);

/// Session middleware in front of every route.
///
/// Public routes always pass. Elsewhere the user comes from the auth proxy
/// headers or from the session cookie; without one, pages redirect to login
/// and `/api` routes answer 401.
pub async fn require_user(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if state.config.is_public_route(&path) {
        request.extensions_mut().insert(CurrentUser(None));
        return next.run(request).await;
    }

    match resolve_user(state.auth.as_ref(), request.headers()).await {
        Some(user) => {
            tracing::debug!("request {} by user {}", path, user.id);
            request.extensions_mut().insert(CurrentUser(Some(user)));
            next.run(request).await
        }
        None if path.starts_with("/api/") => ApiError::unauthorized("Authentication required").into_response(),
        None => Redirect::to(&login_redirect(&path)).into_response(),
    }
}

async fn resolve_user(gateway: &dyn AuthGateway, headers: &HeaderMap) -> Option<ServerUser> {
    if let Some(user) = ServerUser::from_headers(headers) {
        return Some(user);
    }

    let token = session_token(headers)?;
    match gateway.session(Some(&token)).await {
        Ok(session) => session.and_then(|s| s.user),
        Err(e) => {
            tracing::warn!("session lookup failed: {}", e);
            None
        }
    }
}

pub fn login_redirect(path: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
    format!("/login?redirect={}", encoded)
}
