use clap::Subcommand;
use serde_json::json;
use std::collections::HashSet;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::slug::{slugify, SlugAllocator, DEFAULT_MAX_ATTEMPTS};

#[derive(Subcommand)]
pub enum SlugCommands {
    #[command(about = "Print the normalized slug for a name")]
    Normalize {
        #[arg(help = "Organization name")]
        name: String,
    },

    #[command(about = "Pick the first free slug given the slugs already taken")]
    Allocate {
        #[arg(help = "Organization name")]
        name: String,
        #[arg(long, value_delimiter = ',', help = "Comma-separated slugs already in use")]
        taken: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, help = "Candidates to try before giving up")]
        max_attempts: u32,
    },
}

pub fn handle(cmd: SlugCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SlugCommands::Normalize { name } => {
            let slug = slugify(&name);
            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Slug normalized",
                    Some(json!({ "name": name, "slug": slug })),
                ),
                OutputFormat::Text => {
                    println!("{}", slug);
                    Ok(())
                }
            }
        }
        SlugCommands::Allocate {
            name,
            taken,
            max_attempts,
        } => {
            let taken: HashSet<String> = taken.into_iter().map(|s| s.trim().to_string()).collect();
            let slug = SlugAllocator::new(max_attempts).allocate(&name, |candidate| taken.contains(candidate))?;
            output_success(
                &output_format,
                &format!("Allocated slug '{}'", slug),
                Some(json!({ "name": name, "slug": slug })),
            )
        }
    }
}
