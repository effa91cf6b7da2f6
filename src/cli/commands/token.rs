use clap::Subcommand;
use serde_json::json;

use crate::auth::{issue_session_token, SessionClaims};
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint a session token signed with AUTH_JWT_SECRET")]
    Issue {
        #[arg(help = "Subject (user id)")]
        subject: String,
        #[arg(long, help = "Tenant (organization) claim")]
        tenant: Option<String>,
        #[arg(long, default_value_t = 24, help = "Hours until expiry")]
        hours: i64,
        #[arg(long, help = "Signing secret (defaults to AUTH_JWT_SECRET)")]
        secret: Option<String>,
    },
}

pub fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue {
            subject,
            tenant,
            hours,
            secret,
        } => {
            let secret = secret
                .or_else(|| std::env::var("AUTH_JWT_SECRET").ok())
                .ok_or_else(|| anyhow::anyhow!("no signing secret: pass --secret or set AUTH_JWT_SECRET"))?;

            let claims = SessionClaims::new(subject, tenant, hours);
            let token = issue_session_token(&claims, &secret)?;

            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Session token issued",
                    Some(json!({ "token": token, "expires_at": claims.exp })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
    }
}
