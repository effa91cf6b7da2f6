use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::jwt::TenantMetadata;
use crate::config::directory_url;
use super::{AuthError, Credentials, Identity, SessionAuthenticator};

/// User record returned by `GET /auth/v1/user`.
#[derive(Debug, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    #[serde(default)]
    pub user_metadata: Option<TenantMetadata>,
    #[serde(default)]
    pub app_metadata: Option<TenantMetadata>,
}

impl RemoteUser {
    pub fn into_identity(self) -> Identity {
        let tenant_claim = self
            .user_metadata
            .and_then(|m| m.org_id)
            .or_else(|| self.app_metadata.and_then(|m| m.org_id))
            .filter(|org| !org.is_empty());
        Identity::authenticated(self.id, tenant_claim)
    }
}

/// Asks the hosted auth service who owns the session token.
pub struct RemoteSessionAuthenticator {
    client: reqwest::Client,
    user_url: Url,
    api_key: Option<String>,
}

impl RemoteSessionAuthenticator {
    pub fn new(base_url: Url, api_key: Option<String>, timeout: Duration) -> Result<Self, AuthError> {
        let user_url = directory_url(base_url)
            .join("auth/v1/user")
            .map_err(|e| AuthError::Configuration(format!("invalid auth URL: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Configuration(e.to_string()))?;
        Ok(Self {
            client,
            user_url,
            api_key,
        })
    }
}

#[async_trait]
impl SessionAuthenticator for RemoteSessionAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let Some(token) = credentials.token.as_deref() else {
            return Ok(Identity::Anonymous);
        };

        let mut request = self.client.get(self.user_url.clone()).bearer_auth(token);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(Identity::Anonymous),
            status if status.is_success() => {
                let user: RemoteUser = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Transport(format!("malformed user response: {}", e)))?;
                Ok(user.into_identity())
            }
            status => Err(AuthError::Transport(format!(
                "unexpected status {} from session service",
                status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_metadata_claim_wins() {
        let user: RemoteUser = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "user_metadata": { "org_id": "org-user" },
            "app_metadata": { "org_id": "org-app" }
        }))
        .unwrap();
        assert_eq!(user.into_identity().tenant_claim(), Some("org-user"));
    }

    #[test]
    fn app_metadata_claim_is_fallback() {
        let user: RemoteUser = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "user_metadata": {},
            "app_metadata": { "org_id": "org-app", "provider": "email" }
        }))
        .unwrap();
        assert_eq!(user.into_identity().tenant_claim(), Some("org-app"));
    }

    #[test]
    fn missing_metadata_has_no_claim() {
        let user: RemoteUser = serde_json::from_value(serde_json::json!({ "id": "u1" })).unwrap();
        assert_eq!(user.into_identity(), Identity::authenticated("u1", None));
    }

    #[test]
    fn user_endpoint_keeps_base_path() {
        for base in ["https://auth.example.com/prefix", "https://auth.example.com/prefix/"] {
            let authenticator =
                RemoteSessionAuthenticator::new(Url::parse(base).unwrap(), None, Duration::from_secs(1)).unwrap();
            assert_eq!(authenticator.user_url.as_str(), "https://auth.example.com/prefix/auth/v1/user");
        }
    }

    #[tokio::test]
    async fn no_token_skips_network_call() {
        // Unroutable base URL: a network call here would fail the test.
        let authenticator = RemoteSessionAuthenticator::new(
            Url::parse("http://127.0.0.1:9/").unwrap(),
            None,
            Duration::from_millis(50),
        )
        .unwrap();
        let identity = authenticator.authenticate(&Credentials::default()).await.unwrap();
        assert_eq!(identity, Identity::Anonymous);
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let authenticator = RemoteSessionAuthenticator::new(
            Url::parse("http://127.0.0.1:9/").unwrap(),
            None,
            Duration::from_millis(200),
        )
        .unwrap();
        let credentials = Credentials {
            token: Some("tok".to_string()),
        };
        let err = authenticator.authenticate(&credentials).await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
    }
}
