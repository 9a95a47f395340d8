use serde_json::json;

use crate::catalog::load_catalog;
use crate::cli::utils::*;
use crate::cli::{CliContext, OutputFormat};

pub async fn handle(context: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let catalog = load_catalog(context.api.as_ref()).await;

    if catalog.is_empty() {
        return output_empty_collection(&output_format, "definitions", "No entity definitions found");
    }

    match output_format {
        OutputFormat::Text => {
            println!("{:<20} {:<25} {:<8} {}", "SLUG", "NAME", "FIELDS", "DESCRIPTION");
            println!("{}", "-".repeat(80));
            for definition in catalog.iter() {
                println!(
                    "{:<20} {:<25} {:<8} {}",
                    definition.slug,
                    definition.name,
                    definition.fields.len(),
                    definition.description.as_deref().unwrap_or("")
                );
            }
        }
        _ => {
            let definitions: Vec<_> = catalog
                .iter()
                .map(|d| {
                    json!({
                        "id": d.id,
                        "slug": d.slug,
                        "name": d.name,
                        "description": d.description,
                        "fields": d.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
                    })
                })
                .collect();
            output_data(&output_format, &json!({ "definitions": definitions }))?;
        }
    }
    Ok(())
}
