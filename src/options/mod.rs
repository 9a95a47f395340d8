//! Filter options of relation fields.
//!
//! Every filter control that points at the same related entity shares one
//! cached option list: the cache key is `(project id, related entity id)`.

pub mod loader;

use std::sync::Arc;

use crate::cache::{CachePolicy, QueryCache, QueryError, QueryStatus};
use crate::sdk::EntityApi;

pub use loader::{load_entity_options, EntityOption, EntityOptionsData, OPTIONS_LIMIT};

pub type OptionsKey = (String, String);

#[derive(Clone)]
pub struct OptionsCache {
    cache: QueryCache<OptionsKey, EntityOptionsData>,
    api: Arc<dyn EntityApi>,
    limit: u32,
}

impl OptionsCache {
    pub fn new(api: Arc<dyn EntityApi>, policy: CachePolicy, limit: u32) -> Self {
        Self {
            cache: QueryCache::new(policy),
            api,
            limit,
        }
    }

    fn key(&self, related_entity_definition_id: &str) -> OptionsKey {
        (
            self.api.project_id().to_string(),
            related_entity_definition_id.to_string(),
        )
    }

    /// Options of a related entity; nothing is fetched for an empty id
    pub async fn load(&self, related_entity_definition_id: &str) -> Result<EntityOptionsData, QueryError> {
        if related_entity_definition_id.is_empty() {
            return Ok(EntityOptionsData::default());
        }

        let api = Arc::clone(&self.api);
        let related = related_entity_definition_id.to_string();
        let limit = self.limit;
        self.cache
            .fetch(self.key(related_entity_definition_id), move || {
                let api = Arc::clone(&api);
                let related = related.clone();
                async move { load_entity_options(api.as_ref(), &related, limit).await }
            })
            .await
    }

    pub fn status(&self, related_entity_definition_id: &str) -> QueryStatus<EntityOptionsData> {
        if related_entity_definition_id.is_empty() {
            return QueryStatus::Idle;
        }
        self.cache.status(&self.key(related_entity_definition_id))
    }

    pub fn sweep(&self) {
        self.cache.sweep();
    }
}
