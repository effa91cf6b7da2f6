use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{AuthError, Credentials, Identity, SessionAuthenticator};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

/// Session token claims, shaped like the hosted auth service's access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    #[serde(default)]
    pub user_metadata: TenantMetadata,
    #[serde(default)]
    pub app_metadata: TenantMetadata,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn new(subject: impl Into<String>, org_id: Option<String>, expiry_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.into(),
            user_metadata: TenantMetadata { org_id },
            app_metadata: TenantMetadata::default(),
            exp: (now + Duration::hours(expiry_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// `user_metadata.org_id` wins over `app_metadata.org_id`.
    pub fn tenant_claim(&self) -> Option<String> {
        self.user_metadata
            .org_id
            .clone()
            .or_else(|| self.app_metadata.org_id.clone())
            .filter(|org| !org.is_empty())
    }
}

pub fn issue_session_token(claims: &SessionClaims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Configuration("empty JWT secret".to_string()));
    }
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::Configuration(format!("JWT generation error: {}", e)))
}

/// Verifies HS256 session tokens in-process.
pub struct JwtSessionAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionAuthenticator {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        // Hosted auth tokens carry an audience we do not pin.
        validation.validate_aud = false;
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl SessionAuthenticator for JwtSessionAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let Some(token) = credentials.token.as_deref() else {
            return Ok(Identity::Anonymous);
        };

        match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => {
                let tenant_claim = data.claims.tenant_claim();
                Ok(Identity::authenticated(data.claims.sub, tenant_claim))
            }
            Err(e) => {
                tracing::debug!("Rejected session token: {}", e);
                Ok(Identity::Anonymous)
            }
        }
    }
}
