use axum::{extract::State, response::Html, Extension};

use crate::app::AppState;
use crate::middleware::CurrentUser;
use crate::views::{auth::profile_page, Chrome};

/// GET /profile - Current user's email and names
pub async fn show(State(state): State<AppState>, Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    let catalog = state.catalog.get().await;
    Html(profile_page(Chrome {
        catalog: &catalog,
        user: user.as_ref(),
        active_slug: None,
    }))
}
