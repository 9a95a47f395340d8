pub mod definitions;
pub mod list;
pub mod options;
pub mod show;

use std::sync::Arc;

use crate::catalog::load_catalog;
use crate::cli::CliContext;
use crate::sdk::EntityDefinition;

/// Definition with the given slug, or an error naming the known slugs
pub(crate) async fn find_definition(context: &CliContext, slug: &str) -> anyhow::Result<Arc<EntityDefinition>> {
    let catalog = load_catalog(context.api.as_ref()).await;
    if let Some(definition) = catalog.by_slug(slug) {
        return Ok(definition.clone());
    }

    let known: Vec<&str> = catalog.iter().map(|d| d.slug.as_str()).collect();
    Err(anyhow::anyhow!(
        "Entity '{}' not found (known: {})",
        slug,
        if known.is_empty() { "none".to_string() } else { known.join(", ") }
    ))
}
