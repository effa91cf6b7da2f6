#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use tower::ServiceExt;

use tenant_gate::app::{router, AppState};
use tenant_gate::auth::{AuthError, Credentials, Identity, SessionAuthenticator};
use tenant_gate::config::AppConfig;
use tenant_gate::database::InMemoryOrganizationRepository;

pub const ADMIN_TENANT: &str = "a44bd713-601b-4ec1-800d-c0fa2cf618c8";

/// Session tokens understood by the stub authenticator.
pub const MEMBER_TOKEN: &str = "member-token";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const OUTAGE_TOKEN: &str = "outage-token";

/// Maps fixed tokens to identities; `OUTAGE_TOKEN` simulates a dead session service.
pub struct StubAuthenticator;

#[async_trait]
impl SessionAuthenticator for StubAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        match credentials.token.as_deref() {
            Some(MEMBER_TOKEN) => Ok(Identity::authenticated("user-member", None)),
            Some(ADMIN_TOKEN) => Ok(Identity::authenticated("user-admin", Some(ADMIN_TENANT.to_string()))),
            Some(OUTAGE_TOKEN) => Err(AuthError::Transport("connection reset".to_string())),
            _ => Ok(Identity::Anonymous),
        }
    }
}

pub fn config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "AUTH_JWT_SECRET" => Some("unused".to_string()),
        "ADMIN_TENANT_ID" => Some(ADMIN_TENANT.to_string()),
        _ => None,
    })
    .expect("test config")
}

pub fn app() -> Router {
    let state = AppState::with_collaborators(
        config(),
        Arc::new(StubAuthenticator),
        Arc::new(InMemoryOrganizationRepository::new()),
    );
    router(state)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("session={}", token));
    }
    builder.body(Body::empty()).expect("request")
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("session={}", token));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub async fn send(app: &Router, request: Request<Body>) -> Result<Response<Body>> {
    Ok(app.clone().oneshot(request).await?)
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn body_json(response: Response<Body>) -> Result<serde_json::Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
