use axum::extract::{Path, RawQuery, State};
use serde::Serialize;

use super::load_list;
use crate::app::AppState;
use crate::error::ApiError;
use crate::list::{EntityListController, FieldOptionsState, ListRow, ListStatus};
use crate::middleware::{ApiResponse, ApiResult};
use crate::sdk::{EntityDefinition, Instance, InstanceQuery, Pagination};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstancesResponse {
    pub status: ListStatus,
    pub query: InstanceQuery,
    pub rows: Vec<ListRow>,
    pub data: Vec<Instance>,
    pub pagination: Option<Pagination>,
}

/// GET /api/entities - Entity definitions of the project
pub async fn definitions(State(state): State<AppState>) -> ApiResult<Vec<EntityDefinition>> {
    let catalog = state.catalog.get().await;
    Ok(ApiResponse::success(
        catalog.iter().map(|definition| definition.as_ref().clone()).collect(),
    ))
}

/// GET /api/entities/:slug/instances - List query in the list page's URL format
pub async fn instances(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    RawQuery(query): RawQuery,
) -> ApiResult<InstancesResponse> {
    let context = load_list(&state, &slug, query.as_deref()).await?;
    let controller = context.controller;

    if let Some(err) = controller.error() {
        return Err(ApiError::from(err.clone()));
    }

    Ok(ApiResponse::success(InstancesResponse {
        status: controller.status(),
        query: controller.instance_query(),
        rows: controller.rows(),
        data: controller.data().map(|d| d.data.clone()).unwrap_or_default(),
        pagination: controller.pagination().cloned(),
    }))
}

/// GET /api/entities/:slug/options/:field - Options of one filterable field
pub async fn options(
    State(state): State<AppState>,
    Path((slug, field)): Path<(String, String)>,
) -> ApiResult<FieldOptionsState> {
    let catalog = state.catalog.get().await;
    let definition = catalog
        .by_slug(&slug)
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("Entity '{}' not found", slug)))?;

    let controller = EntityListController::new(
        catalog.project_id(),
        definition,
        state.config.list.max_columns,
    );
    let mut filter = controller
        .filter_fields()
        .iter()
        .find(|f| f.name() == field)
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("Filter field '{}' not found", field)))?;

    // An explicit request for options counts as opening the facet
    filter.set_open(true);
    let options = filter.load_options(&state.options).await;

    if let Some(message) = options.error.clone() {
        return Err(ApiError::bad_gateway(message));
    }
    Ok(ApiResponse::success(options))
}
