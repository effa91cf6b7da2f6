pub mod jwt;
pub mod remote;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, AuthProvider};

pub use jwt::{issue_session_token, JwtSessionAuthenticator, SessionClaims};
pub use remote::RemoteSessionAuthenticator;

/// Who is making the request. Lives for one request only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    Anonymous,
    Authenticated {
        subject_id: String,
        tenant_claim: Option<String>,
    },
}

impl Identity {
    pub fn authenticated(subject_id: impl Into<String>, tenant_claim: Option<String>) -> Self {
        Identity::Authenticated {
            subject_id: subject_id.into(),
            tenant_claim,
        }
    }

    pub fn tenant_claim(&self) -> Option<&str> {
        match self {
            Identity::Authenticated { tenant_claim, .. } => tenant_claim.as_deref(),
            Identity::Anonymous => None,
        }
    }
}

/// Session credentials carried by a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub token: Option<String>,
}

impl Credentials {
    /// Read the session token from the named cookie, falling back to an
    /// `Authorization: Bearer` header.
    pub fn from_headers(headers: &HeaderMap, cookie_name: &str) -> Self {
        let token = session_cookie(headers, cookie_name).or_else(|| bearer_token(headers));
        Self { token }
    }
}

fn session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The session service could not be reached or answered unexpectedly.
    /// Never treated as Anonymous.
    #[error("session service unavailable: {0}")]
    Transport(String),
    #[error("session authenticator misconfigured: {0}")]
    Configuration(String),
}

/// Resolves request credentials into an identity.
///
/// "No session" is `Ok(Identity::Anonymous)`; errors are reserved for
/// infrastructure failures.
#[async_trait]
pub trait SessionAuthenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError>;
}

/// Build the authenticator selected by the configuration.
pub fn authenticator_from_config(config: &AppConfig) -> Result<Arc<dyn SessionAuthenticator>, AuthError> {
    match &config.auth.provider {
        AuthProvider::Jwt { secret } => Ok(Arc::new(JwtSessionAuthenticator::new(secret))),
        AuthProvider::Remote { url, api_key } => {
            let authenticator = RemoteSessionAuthenticator::new(
                url.clone(),
                api_key.clone(),
                Duration::from_millis(config.auth.timeout_ms),
            )?;
            Ok(Arc::new(authenticator))
        }
    }
}
