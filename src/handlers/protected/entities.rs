use axum::{
    extract::{Path, RawQuery, State},
    response::Html,
    Extension,
};

use super::{load_filter_options, load_list};
use crate::app::AppState;
use crate::display::detail_sections;
use crate::error::{PageError, PageResult};
use crate::middleware::CurrentUser;
use crate::sdk::SlugLookup;
use crate::views::{detail::detail_page, list::list_page, Chrome};

/// GET /entities/:slug - List page with search, facets and pagination
pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(slug): Path<String>,
    RawQuery(query): RawQuery,
) -> PageResult {
    let context = load_list(&state, &slug, query.as_deref()).await?;
    let options = load_filter_options(&state, &context.controller).await;

    Ok(Html(list_page(
        Chrome {
            catalog: &context.catalog,
            user: user.as_ref(),
            active_slug: Some(slug.as_str()),
        },
        &context.controller,
        &options,
    )))
}

/// GET /entities/:slug/:instance_slug - Detail page of one instance
pub async fn detail(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((slug, instance_slug)): Path<(String, String)>,
) -> PageResult {
    let catalog = state.catalog.get().await;
    let definition = catalog.by_slug(&slug).ok_or_else(PageError::not_found)?;

    let instance = state
        .api
        .get_instance_by_slug(&definition.id, &instance_slug, SlugLookup::default())
        .await?
        .ok_or_else(PageError::not_found)?;

    let sections = detail_sections(definition, &instance);
    Ok(Html(detail_page(
        Chrome {
            catalog: &catalog,
            user: user.as_ref(),
            active_slug: Some(slug.as_str()),
        },
        definition,
        &sections,
    )))
}
