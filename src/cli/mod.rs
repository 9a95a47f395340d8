pub mod commands;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::sdk::{EntityApi, HttpEntityApi};

#[derive(Parser)]
#[command(name = "browse")]
#[command(about = "Browse entity definitions and records of a project from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Output in YAML format")]
    pub yaml: bool,

    #[arg(long, global = true, env = "PROJECT_ID", help = "Project to browse")]
    pub project: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List entity definitions of the project")]
    Definitions,

    #[command(about = "List records of an entity with search, filters and paging")]
    List(commands::list::ListArgs),

    #[command(about = "Show one record by slug, grouped by section")]
    Show {
        #[arg(help = "Entity slug")]
        entity: String,
        #[arg(help = "Record slug")]
        slug: String,
    },

    #[command(about = "List filter options of a filterable field")]
    Options {
        #[arg(help = "Entity slug")]
        entity: String,
        #[arg(help = "Field name")]
        field: String,
        #[arg(long, help = "Only options whose label contains this text")]
        search: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else if cli.yaml {
            OutputFormat::Yaml
        } else {
            OutputFormat::Text
        }
    }
}

/// Configuration and entity service client shared by every command
pub struct CliContext {
    pub config: AppConfig,
    pub api: Arc<dyn EntityApi>,
}

impl CliContext {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let project_id = cli
            .project
            .clone()
            .or_else(|| config.api.project_id.clone())
            .ok_or_else(|| anyhow::anyhow!("No project configured. Pass --project or set PROJECT_ID"))?;

        let api = HttpEntityApi::new(&config.api, project_id)?;
        Ok(Self {
            config,
            api: Arc::new(api),
        })
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let context = CliContext::from_cli(&cli)?;

    match cli.command {
        Commands::Definitions => commands::definitions::handle(&context, output_format).await,
        Commands::List(args) => commands::list::handle(&context, args, output_format).await,
        Commands::Show { entity, slug } => commands::show::handle(&context, &entity, &slug, output_format).await,
        Commands::Options { entity, field, search } => {
            commands::options::handle(&context, &entity, &field, search.as_deref(), output_format).await
        }
    }
}
