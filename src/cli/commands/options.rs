use serde_json::json;

use super::find_definition;
use crate::cli::utils::*;
use crate::cli::{CliContext, OutputFormat};
use crate::list::{EntityListController, FacetedFilter};
use crate::options::OptionsCache;

pub async fn handle(
    context: &CliContext,
    entity: &str,
    field: &str,
    search: Option<&str>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let definition = find_definition(context, entity).await?;
    let controller = EntityListController::new(context.api.project_id(), definition, context.config.list.max_columns);

    let mut filter = controller
        .filter_fields()
        .iter()
        .find(|f| f.name() == field)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Field '{}' of '{}' is not filterable", field, entity))?;
    filter.set_open(true);

    let cache = OptionsCache::new(
        context.api.clone(),
        context.config.cache.options_policy(),
        context.config.list.options_limit,
    );
    let state = filter.load_options(&cache).await;
    if let Some(message) = state.error {
        return Err(anyhow::anyhow!(message));
    }

    let mut facet = FacetedFilter::new();
    facet.set_search_query(search.unwrap_or_default());
    let options = facet.filtered_options(&state.options);

    if options.is_empty() {
        return output_empty_collection(&output_format, "options", "No results found.");
    }

    match output_format {
        OutputFormat::Text => {
            println!("{:<38} {}", "ID", "LABEL");
            println!("{}", "-".repeat(60));
            for option in options {
                println!("{:<38} {}", option.value, option.label);
            }
        }
        _ => output_data(&output_format, &json!({ "field": field, "options": options }))?,
    }
    Ok(())
}
