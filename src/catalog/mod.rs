//! Read-only catalog of a project's entity definitions.
//!
//! Loaded once per project and shared by the layout sidebar and the page of a
//! request through [`CatalogCache`]; handlers receive it by reference.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::{CachePolicy, QueryCache, QueryError};
use crate::sdk::{EntityApi, EntityDefinition};

const SLUG_MAX_LEN: usize = 100;
const SLUG_FALLBACK: &str = "item";

#[derive(Debug, Clone, Default)]
pub struct DefinitionCatalog {
    project_id: String,
    definitions: BTreeMap<String, Arc<EntityDefinition>>,
}

impl DefinitionCatalog {
    pub fn new(project_id: impl Into<String>, definitions: Vec<EntityDefinition>) -> Self {
        Self {
            project_id: project_id.into(),
            definitions: definitions
                .into_iter()
                .map(|d| (d.slug.clone(), Arc::new(d)))
                .collect(),
        }
    }

    pub fn empty(project_id: impl Into<String>) -> Self {
        Self::new(project_id, Vec::new())
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn by_slug(&self, slug: &str) -> Option<&Arc<EntityDefinition>> {
        self.definitions.get(slug)
    }

    /// Slug first, then id
    pub fn by_id_or_slug(&self, key: &str) -> Option<&Arc<EntityDefinition>> {
        self.by_slug(key)
            .or_else(|| self.definitions.values().find(|d| d.id == key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityDefinition>> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// All definitions of the api's project; failures and an unset project yield an empty catalog
pub async fn load_catalog(api: &dyn EntityApi) -> DefinitionCatalog {
    match fetch_catalog(api).await {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::error!("Error loading entity definitions: {}", err);
            DefinitionCatalog::empty(api.project_id())
        }
    }
}

async fn fetch_catalog(api: &dyn EntityApi) -> Result<DefinitionCatalog, QueryError> {
    let project_id = api.project_id();
    if project_id.is_empty() {
        tracing::debug!("no project configured, entity catalog is empty");
        return Ok(DefinitionCatalog::default());
    }

    let definitions = api
        .get_all_entity_definitions()
        .await
        .map_err(|e| QueryError::new(e.to_string()))?;
    tracing::debug!("loaded {} entity definitions for project {}", definitions.len(), project_id);
    Ok(DefinitionCatalog::new(project_id, definitions))
}

/// Catalog per project id, shared across requests while fresh
#[derive(Clone)]
pub struct CatalogCache {
    cache: QueryCache<String, DefinitionCatalog>,
    api: Arc<dyn EntityApi>,
}

impl CatalogCache {
    pub fn new(api: Arc<dyn EntityApi>, policy: CachePolicy) -> Self {
        Self {
            cache: QueryCache::new(policy),
            api,
        }
    }

    pub fn api(&self) -> &Arc<dyn EntityApi> {
        &self.api
    }

    /// Failed loads are not cached; the caller gets an empty catalog
    pub async fn get(&self) -> DefinitionCatalog {
        let api = Arc::clone(&self.api);
        let result = self
            .cache
            .fetch(self.api.project_id().to_string(), move || {
                let api = Arc::clone(&api);
                async move { fetch_catalog(api.as_ref()).await }
            })
            .await;

        result.unwrap_or_else(|err| {
            tracing::error!("Error loading entity definitions: {}", err);
            DefinitionCatalog::empty(self.api.project_id())
        })
    }

    pub fn invalidate(&self) {
        self.cache.invalidate(&self.api.project_id().to_string());
    }

    pub fn sweep(&self) {
        self.cache.sweep();
    }
}

/// Lowercase, runs of anything but `[a-z0-9]` become `-`, trimmed and capped
pub fn generate_slug(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;

    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug.truncate(SLUG_MAX_LEN);
    if slug.is_empty() {
        SLUG_FALLBACK.to_string()
    } else {
        slug
    }
}
