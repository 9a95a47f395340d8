use clap::Args;
use serde_json::json;

use super::find_definition;
use crate::cli::utils::*;
use crate::cli::{CliContext, OutputFormat};
use crate::list::{EntityListController, InstancesCache, ListParams};
use crate::sdk::FilterMode;

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(help = "Entity slug")]
    pub entity: String,

    #[arg(long, short, help = "Search text")]
    pub search: Option<String>,

    #[arg(long, default_value_t = 1, help = "Page number")]
    pub page: u32,

    #[arg(long = "filter", short, help = "Filter as field=id, repeatable")]
    pub filters: Vec<String>,

    #[arg(long = "all", help = "Match ALL selected options of this relation field, repeatable")]
    pub match_all: Vec<String>,
}

impl ListArgs {
    fn params(&self) -> anyhow::Result<ListParams> {
        let mut params = ListParams::default();
        if let Some(search) = &self.search {
            params.set_search(search.clone());
        }

        for raw in &self.filters {
            let (field, value) = raw
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Invalid filter '{}', expected field=id", raw))?;
            let mut values = params.selection(field);
            values.push(value.to_string());
            params.set_filter(field, values);
        }
        for field in &self.match_all {
            params.set_filter_mode(field, FilterMode::All);
        }

        params.set_page(self.page);
        Ok(params)
    }
}

pub async fn handle(context: &CliContext, args: ListArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let definition = find_definition(context, &args.entity).await?;
    let params = args.params()?;

    let cache = InstancesCache::new(context.api.clone(), context.config.cache.list_policy());
    let mut controller = EntityListController::from_params(
        context.api.project_id(),
        definition,
        context.config.list.max_columns,
        params,
    );
    controller.refresh(&cache).await;

    if let Some(err) = controller.error() {
        return Err(anyhow::anyhow!("{}: {}", controller.error_text().unwrap_or_default(), err));
    }

    let rows = controller.rows();
    match output_format {
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No items found");
                return Ok(());
            }

            let mut header = vec![format!("{:<24}", "NAME")];
            header.extend(controller.display_fields().iter().map(|f| format!("{:<20}", f.label.to_uppercase())));
            println!("{}", header.join(" "));
            println!("{}", "-".repeat(24 + 21 * controller.display_fields().len()));
            for row in &rows {
                let mut line = vec![format!("{:<24}", truncate(&row.title, 24))];
                line.extend(row.cells.iter().map(|c| format!("{:<20}", truncate(c, 20))));
                println!("{}", line.join(" "));
            }

            if let Some(pagination) = controller.pagination().filter(|p| p.total_pages > 1) {
                println!();
                println!(
                    "Page {} of {} ({} total)",
                    pagination.page, pagination.total_pages, pagination.total
                );
            }
        }
        _ => {
            output_data(
                &output_format,
                &json!({
                    "query": controller.instance_query(),
                    "rows": rows,
                    "pagination": controller.pagination(),
                }),
            )?;
        }
    }
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
