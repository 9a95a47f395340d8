use serde_json::json;

use super::find_definition;
use crate::cli::utils::*;
use crate::cli::{CliContext, OutputFormat};
use crate::display::detail_sections;
use crate::sdk::SlugLookup;

pub async fn handle(context: &CliContext, entity: &str, slug: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let definition = find_definition(context, entity).await?;
    let instance = context
        .api
        .get_instance_by_slug(&definition.id, slug, SlugLookup::default())
        .await?
        .ok_or_else(|| anyhow::anyhow!("{} '{}' not found", definition.name, slug))?;

    let sections = detail_sections(&definition, &instance);
    match output_format {
        OutputFormat::Text => {
            println!("{} / {}", definition.name, slug);
            for section in &sections {
                println!();
                if let Some(title) = &section.title {
                    println!("== {} ==", title);
                }
                for field in &section.fields {
                    let value = field.value.to_plain();
                    let mut lines = value.lines();
                    println!("{:<20} {}", field.label, lines.next().unwrap_or_default());
                    for line in lines {
                        println!("{:<20} {}", "", line);
                    }
                }
            }
        }
        _ => output_data(
            &output_format,
            &json!({
                "entity": definition.slug,
                "id": instance.id(),
                "sections": sections,
            }),
        )?,
    }
    Ok(())
}
