pub mod auth;
pub mod response;

pub use auth::{require_user, CurrentUser};
pub use response::{ApiResponse, ApiResult, IntoApiResponse};
