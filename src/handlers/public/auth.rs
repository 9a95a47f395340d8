use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::{handle_callback, safe_next, session_token, CallbackParams, SESSION_COOKIE};
use crate::config::Environment;
use crate::views::auth::{login_page, reset_password_page};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginQuery {
    pub redirect: Option<String>,
    pub error: Option<String>,
    pub password_updated: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetPasswordQuery {
    pub error: Option<String>,
}

/// GET /login - Sign-in hand-off to the auth service
pub async fn login(State(state): State<AppState>, Query(query): Query<LoginQuery>) -> Html<String> {
    let redirect = safe_next(query.redirect.as_deref());
    Html(login_page(
        &state.config.auth.service_url,
        &redirect,
        query.error.as_deref(),
        query.password_updated.as_deref() == Some("true"),
    ))
}

/// GET /auth/reset-password - Password reset hand-off to the auth service
pub async fn reset_password(
    State(state): State<AppState>,
    Query(query): Query<ResetPasswordQuery>,
) -> Html<String> {
    Html(reset_password_page(&state.config.auth.service_url, query.error.as_deref()))
}

/// GET /auth/callback - Exchange the auth code and redirect
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let token = session_token(&headers);
    let outcome = handle_callback(state.auth.as_ref(), &params, token.as_deref()).await;

    let mut response = Redirect::to(&outcome.location).into_response();
    if let Some(session) = outcome.session {
        let secure = state.config.environment == Environment::Production;
        match session_cookie(&session.access_token, secure) {
            Some(cookie) => {
                response.headers_mut().insert(header::SET_COOKIE, cookie);
            }
            None => tracing::error!("auth callback: session token is not a valid cookie value"),
        }
    }
    response
}

/// GET /logout - Drop the session cookie
pub async fn logout() -> Response {
    let mut response = Redirect::to("/login").into_response();
    let expired = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    if let Ok(value) = HeaderValue::from_str(&expired) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

fn session_cookie(token: &str, secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token);
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}
