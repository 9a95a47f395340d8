use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::QueryError;
use crate::display::value_to_string;
use crate::sdk::{EntityApi, InstanceQuery, SdkError};

/// Default cap on related records fetched for one option list
pub const OPTIONS_LIMIT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityOption {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityOptionsData {
    pub options: Vec<EntityOption>,
    pub title_field: String,
}

/// Load `{id, title}` options of a related entity definition.
///
/// The title field is the one flagged as option title, else the first field
/// of the definition, else `id`. At most `limit` records are fetched.
pub async fn load_entity_options(
    api: &dyn EntityApi,
    related_entity_definition_id: &str,
    limit: u32,
) -> Result<EntityOptionsData, QueryError> {
    fetch_options(api, related_entity_definition_id, limit)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to load options for related entity '{}': {}",
                related_entity_definition_id,
                e
            );
            QueryError::new(format!("Failed to load options: {}", e))
        })
}

async fn fetch_options(
    api: &dyn EntityApi,
    related_entity_definition_id: &str,
    limit: u32,
) -> Result<EntityOptionsData, SdkError> {
    let config = api.get_entity_definition_config(related_entity_definition_id).await?;

    let title_field = config
        .fields
        .iter()
        .find(|f| f.is_option_title_field)
        .or_else(|| config.fields.first())
        .map(|f| f.name.clone())
        .unwrap_or_else(|| "id".to_string());

    let page = api
        .get_instances(related_entity_definition_id, &InstanceQuery::page(1, limit))
        .await?;

    if page.pagination.total > page.data.len() as u64 {
        tracing::warn!(
            "Options for '{}' truncated to {} of {} records",
            related_entity_definition_id,
            page.data.len(),
            page.pagination.total
        );
    }

    let options = page
        .data
        .iter()
        .map(|instance| {
            let id = instance.id();
            let title = match instance.get(&title_field) {
                None | Some(Value::Null) => id.clone(),
                Some(value) => {
                    let text = value_to_string(value);
                    if text.is_empty() {
                        id.clone()
                    } else {
                        text
                    }
                }
            };
            EntityOption { id, title }
        })
        .collect();

    Ok(EntityOptionsData { options, title_field })
}
