pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "gatectl")]
#[command(about = "Inspect locale gating decisions and tenant slugs")]
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
    #[command(about = "Normalize names into tenant slugs")]
    Slug {
        #[command(subcommand)]
        cmd: commands::slug::SlugCommands,
    },

    #[command(about = "Show how the gate treats a request path")]
    Route(commands::route::RouteArgs),

    #[command(about = "Development session tokens")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },
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

    match cli.command {
        Commands::Slug { cmd } => commands::slug::handle(cmd, output_format),
        Commands::Route(args) => commands::route::handle(args, output_format),
        Commands::Token { cmd } => commands::token::handle(cmd, output_format),
    }
}
