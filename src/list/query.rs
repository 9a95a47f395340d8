use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::cache::{CachePolicy, QueryCache, QueryError, QueryStatus};
use crate::sdk::{EntityApi, FilterMode, InstanceQuery, InstancesPage};

/// Selected option ids per field; a field without a selection has no key
pub type FilterState = BTreeMap<String, BTreeSet<String>>;

/// Identity of one list request. Equal keys share one cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub project_id: String,
    pub entity_definition_id: String,
    pub page: u32,
    pub search: String,
    pub filters: FilterState,
    pub filter_modes: BTreeMap<String, FilterMode>,
}

/// Shared cache of list pages, keyed by the full query identity
#[derive(Clone)]
pub struct InstancesCache {
    cache: QueryCache<QueryKey, InstancesPage>,
    api: Arc<dyn EntityApi>,
}

impl InstancesCache {
    pub fn new(api: Arc<dyn EntityApi>, policy: CachePolicy) -> Self {
        Self {
            cache: QueryCache::new(policy),
            api,
        }
    }

    pub fn project_id(&self) -> &str {
        self.api.project_id()
    }

    pub async fn load(&self, key: QueryKey, query: InstanceQuery) -> Result<InstancesPage, QueryError> {
        let api = Arc::clone(&self.api);
        let definition_id = key.entity_definition_id.clone();
        self.cache
            .fetch(key, move || {
                let api = Arc::clone(&api);
                let definition_id = definition_id.clone();
                let query = query.clone();
                async move {
                    api.get_instances(&definition_id, &query).await.map_err(|e| {
                        tracing::error!("Failed to load instances of '{}': {}", definition_id, e);
                        QueryError::new(e.to_string())
                    })
                }
            })
            .await
    }

    pub fn status(&self, key: &QueryKey) -> QueryStatus<InstancesPage> {
        self.cache.status(key)
    }

    pub fn sweep(&self) {
        self.cache.sweep();
    }
}
