pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::app::App;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI - portfolio admin client")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Resolve a location through the route guard")]
    Nav {
        #[arg(help = "Path with optional query, e.g. /login?allowLogin=true")]
        location: String,
    },

    #[command(about = "Project listing and management")]
    Projects {
        #[command(subcommand)]
        cmd: commands::projects::ProjectCommands,
    },

    #[command(about = "Show visit counters")]
    Analytics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let app_config = crate::config::config();
    let config_dir = config::get_config_dir(app_config)?;
    let app = App::open(app_config, &config_dir)?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &app, output_format).await,
        Commands::Nav { location } => commands::nav::handle(&location, &app, output_format),
        Commands::Projects { cmd } => commands::projects::handle(cmd, &app, output_format).await,
        Commands::Analytics => commands::analytics::handle(&app, output_format),
    }
}
