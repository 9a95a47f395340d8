// handlers/protected/mod.rs - Protected handlers (session required)
//
// Pages render HTML through `views`; `/api/*` returns the same data as JSON in
// the `ApiResponse` envelope. Every handler receives the `CurrentUser` set by
// the session middleware.
pub mod api;
pub mod entities;
pub mod home;
pub mod profile;

use futures::future::join_all;

use crate::app::AppState;
use crate::catalog::DefinitionCatalog;
use crate::error::ApiError;
use crate::list::{EntityListController, FieldOptionsState, ListParams};

/// Catalog of the request plus a controller restored from the list query string
pub struct ListContext {
    pub catalog: DefinitionCatalog,
    pub controller: EntityListController,
}

pub async fn load_list(state: &AppState, slug: &str, query: Option<&str>) -> Result<ListContext, ApiError> {
    let catalog = state.catalog.get().await;
    let definition = catalog
        .by_slug(slug)
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("Entity '{}' not found", slug)))?;

    let params = ListParams::parse(query.unwrap_or_default());
    let mut controller = EntityListController::from_params(
        catalog.project_id(),
        definition,
        state.config.list.max_columns,
        params,
    );
    controller.refresh(&state.instances).await;

    Ok(ListContext { catalog, controller })
}

/// Options state of every filter field; only open relation fields fetch
pub async fn load_filter_options(state: &AppState, controller: &EntityListController) -> Vec<FieldOptionsState> {
    join_all(
        controller
            .filter_fields()
            .iter()
            .map(|field| field.load_options(&state.options)),
    )
    .await
}
