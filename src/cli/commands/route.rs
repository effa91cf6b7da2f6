use clap::Args;
use serde_json::{json, Value};

use crate::access::{classify, is_asset_path, AccessPolicy, AccessRequest};
use crate::auth::Identity;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Args)]
pub struct RouteArgs {
    #[arg(help = "Request path, e.g. /es/admin/companies")]
    pub path: String,

    #[arg(long, help = "Decide as this authenticated subject (anonymous when omitted)")]
    pub subject: Option<String>,

    #[arg(long, requires = "subject", help = "Tenant claim of the subject")]
    pub tenant: Option<String>,
}

pub fn handle(args: RouteArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env()?;

    if is_asset_path(&args.path) {
        return output_details(
            &output_format,
            &format!("{} bypasses the gate", args.path),
            &[("path", json!(args.path)), ("outcome", json!("bypass"))],
        );
    }

    let locales = config.locale_set();
    let resolution = locales.resolve(&args.path);
    let route = classify(&resolution.route_path);

    let outcome: Value = if !resolution.had_explicit_prefix {
        json!({
            "redirect": locales.prefixed(&resolution.locale, &resolution.route_path),
            "reason": "locale_prefix",
        })
    } else {
        let identity = match args.subject {
            Some(subject) => Identity::authenticated(subject, args.tenant),
            None => Identity::Anonymous,
        };
        let decision = AccessPolicy::from_config(&config).decide(&AccessRequest {
            identity: &identity,
            route,
            route_path: &resolution.route_path,
            original_path: &args.path,
            locale: &resolution.locale,
        });
        match decision.location() {
            Some(location) => json!({ "redirect": location }),
            None => json!("allow"),
        }
    };

    output_details(
        &output_format,
        &format!("Gate decision for {}", args.path),
        &[
            ("path", json!(args.path)),
            ("locale", json!(resolution.locale)),
            ("route_path", json!(resolution.route_path)),
            ("explicit_locale", json!(resolution.had_explicit_prefix)),
            ("route", json!(route)),
            ("outcome", outcome),
        ],
    )
}
