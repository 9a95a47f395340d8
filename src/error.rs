// HTTP error types of the JSON endpoints and the HTML pages
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::cache::QueryError;
use crate::sdk::SdkError;
use crate::views;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (entity or auth service failures)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<SdkError> for ApiError {
    fn from(err: SdkError) -> Self {
        match err {
            SdkError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            SdkError::NotConfigured(msg) => {
                tracing::error!("Entity service not configured: {}", msg);
                ApiError::service_unavailable("Entity service is not configured")
            }
            other => {
                // Log the upstream error but return a generic message
                tracing::error!("Entity service error: {}", other);
                ApiError::bad_gateway("Entity service request failed")
            }
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::bad_gateway(err.message())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_json())).into_response()
    }
}

/// Error of an HTML page, rendered as a standalone error page
#[derive(Debug)]
pub struct PageError(pub ApiError);

impl PageError {
    pub fn not_found() -> Self {
        PageError(ApiError::not_found("Page not found"))
    }
}

impl From<ApiError> for PageError {
    fn from(err: ApiError) -> Self {
        PageError(err)
    }
}

impl From<SdkError> for PageError {
    fn from(err: SdkError) -> Self {
        PageError(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let body = if status == StatusCode::NOT_FOUND {
            views::not_found_page()
        } else {
            views::error_page(status.as_u16(), self.0.message())
        };
        (status, Html(body)).into_response()
    }
}

pub type PageResult = Result<Html<String>, PageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdk_errors_map_to_status_codes() {
        assert_eq!(ApiError::from(SdkError::NotFound("instance".into())).status_code(), 404);
        assert_eq!(
            ApiError::from(SdkError::Status { status: 500, message: "boom".into() }),
            ApiError::bad_gateway("Entity service request failed")
        );
        assert_eq!(ApiError::from(SdkError::NotConfigured("x".into())).status_code(), 503);
    }

    #[test]
    fn json_body_carries_code_and_message() {
        let body = ApiError::not_found("Entity 'x' not found").to_json();
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Entity 'x' not found");
        assert_eq!(body["success"], false);
    }

    #[test]
    fn page_error_renders_html_with_status() {
        let response = PageError::not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = PageError(ApiError::bad_gateway("down")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
