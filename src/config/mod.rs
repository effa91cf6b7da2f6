use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

use crate::locale::{Locale, LocaleSet};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SUPPORTED_LOCALES must name at least one locale")]
    NoLocales,
    #[error("DEFAULT_LOCALE '{default}' is not one of the supported locales ({supported})")]
    UnsupportedDefaultLocale { default: String, supported: String },
    #[error("{key} is not an absolute URL: {reason}")]
    InvalidUrl { key: &'static str, reason: String },
    #[error("SLUG_MAX_ATTEMPTS must be at least 1")]
    InvalidSlugAttempts,
    #[error("no session authenticator configured: set AUTH_JWT_SECRET or AUTH_URL")]
    MissingAuthenticator,
}

/// Process-wide configuration, read once at start-up and passed explicitly
/// to the gate, the access policy and the services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub locale: LocaleConfig,
    pub access: AccessConfig,
    pub auth: AuthConfig,
    pub slug: SlugConfig,
    pub persistence: Option<PersistenceConfig>,
    pub app_base_url: Option<Url>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub supported: Vec<String>,
    pub default_locale: String,
    pub cookie_name: String,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// The single tenant allowed into AdminRestricted routes.
    pub admin_tenant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub session_cookie: String,
    pub provider: AuthProvider,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuthProvider {
    /// Verify HS256 session tokens locally.
    Jwt { secret: String },
    /// Ask the hosted auth service for the current user.
    Remote { url: Url, api_key: Option<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlugConfig {
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub url: Url,
    pub api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)?;

        config.validate()?;
        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TENANT_GATE_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Locale overrides
        if let Some(v) = lookup("SUPPORTED_LOCALES") {
            self.locale.supported = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("DEFAULT_LOCALE") {
            self.locale.default_locale = v.trim().to_string();
        }
        if let Some(v) = lookup("LOCALE_COOKIE") {
            self.locale.cookie_name = v;
        }

        // Access overrides
        if let Some(v) = lookup("ADMIN_TENANT_ID") {
            let v = v.trim();
            self.access.admin_tenant_id = (!v.is_empty()).then(|| v.to_string());
        }

        // Auth overrides
        if let Some(v) = lookup("SESSION_COOKIE") {
            self.auth.session_cookie = v;
        }
        if let Some(v) = lookup("AUTH_TIMEOUT_MS") {
            self.auth.timeout_ms = v.parse().unwrap_or(self.auth.timeout_ms);
        }
        if let Some(v) = lookup("AUTH_URL") {
            let url = parse_url("AUTH_URL", &v)?;
            self.auth.provider = AuthProvider::Remote {
                url,
                api_key: lookup("AUTH_API_KEY"),
            };
        } else if let Some(secret) = lookup("AUTH_JWT_SECRET") {
            self.auth.provider = AuthProvider::Jwt { secret };
        }

        if let Some(v) = lookup("SLUG_MAX_ATTEMPTS") {
            self.slug.max_attempts = v.parse().unwrap_or(self.slug.max_attempts);
        }

        if let Some(v) = lookup("PERSISTENCE_URL") {
            let url = parse_url("PERSISTENCE_URL", &v)?;
            self.persistence = Some(PersistenceConfig {
                url,
                api_key: lookup("PERSISTENCE_API_KEY"),
            });
        }

        if let Some(v) = lookup("APP_BASE_URL") {
            let url = parse_url("APP_BASE_URL", &v)?;
            self.app_base_url = Some(url);
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.locale.supported.is_empty() {
            return Err(ConfigError::NoLocales);
        }
        if !self.locale.supported.contains(&self.locale.default_locale) {
            return Err(ConfigError::UnsupportedDefaultLocale {
                default: self.locale.default_locale.clone(),
                supported: self.locale.supported.join(","),
            });
        }
        if self.slug.max_attempts == 0 {
            return Err(ConfigError::InvalidSlugAttempts);
        }
        if let AuthProvider::Jwt { secret } = &self.auth.provider {
            if secret.is_empty() {
                return Err(ConfigError::MissingAuthenticator);
            }
        }
        Ok(())
    }

    /// The supported locale set; validated in `from_lookup`.
    pub fn locale_set(&self) -> LocaleSet {
        LocaleSet::new(
            self.locale.supported.iter().cloned(),
            Locale::new(self.locale.default_locale.clone()),
        )
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            locale: LocaleConfig {
                supported: default_locales(),
                default_locale: "pt".to_string(),
                cookie_name: "NEXT_LOCALE".to_string(),
                secure_cookie: false,
            },
            access: AccessConfig { admin_tenant_id: None },
            auth: AuthConfig {
                session_cookie: "session".to_string(),
                // Filled in by AUTH_JWT_SECRET or AUTH_URL; validate() rejects the empty secret.
                provider: AuthProvider::Jwt { secret: String::new() },
                timeout_ms: 10_000,
            },
            slug: SlugConfig { max_attempts: 6 },
            persistence: None,
            app_base_url: None,
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.locale.secure_cookie = true;
        config.auth.timeout_ms = 5_000;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.locale.secure_cookie = true;
        config.auth.timeout_ms = 3_000;
        config
    }
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        key,
        reason: e.to_string(),
    })
}

/// Treat a service base URL as a directory so relative endpoints keep its path
/// (`https://host/prefix` joins to `https://host/prefix/...`).
pub(crate) fn directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string(), "es".to_string(), "pt".to_string()]
}
