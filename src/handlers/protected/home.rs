use axum::{extract::State, response::Html, Extension};

use crate::app::AppState;
use crate::middleware::CurrentUser;
use crate::views::{home::home_page, Chrome};

/// GET / - Entity cards of the project
pub async fn index(State(state): State<AppState>, Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    let catalog = state.catalog.get().await;
    Html(home_page(Chrome {
        catalog: &catalog,
        user: user.as_ref(),
        active_slug: None,
    }))
}
