// PostgREST-style client for the hosted organization store.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::database::models::{Organization, OrganizationChanges, OrganizationDraft};
use crate::database::repository::{OrganizationRepository, RepositoryError};
use crate::config::directory_url;
use crate::slug::is_duplicate_message;

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

const ORGANIZATION_COLUMNS: &str = "id,name,slug,legal_name,description,is_active,created_at";

#[derive(Debug, Deserialize)]
struct StoreError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct RpcOrganizationRepository {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl RpcOrganizationRepository {
    pub fn new(base_url: Url, api_key: Option<String>, timeout: Duration) -> Result<Self, RepositoryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: directory_url(base_url),
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RepositoryError> {
        self.base_url
            .join(path)
            .map_err(|e| RepositoryError::Backend(format!("invalid endpoint {}: {}", path, e)))
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }
        request
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, RepositoryError> {
        let response = request
            .send()
            .await
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;

        if status.is_success() {
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&body)
                .map_err(|e| RepositoryError::Backend(format!("malformed store response: {}", e)));
        }

        Err(classify_failure(&body))
    }
}

/// Typed SQLSTATE first, message heuristic only when no code is present.
fn classify_failure(body: &str) -> RepositoryError {
    let parsed: Option<StoreError> = serde_json::from_str(body).ok();
    let (code, message) = match parsed {
        Some(err) => (err.code, err.message.unwrap_or_else(|| body.to_string())),
        None => (None, body.to_string()),
    };

    let duplicate = match code.as_deref() {
        Some(code) => code == UNIQUE_VIOLATION,
        None => is_duplicate_message(&message),
    };

    if duplicate {
        RepositoryError::DuplicateSlug(message)
    } else {
        RepositoryError::Backend(message)
    }
}

#[async_trait]
impl OrganizationRepository for RpcOrganizationRepository {
    async fn insert(&self, draft: OrganizationDraft) -> Result<Organization, RepositoryError> {
        let url = self.endpoint("rest/v1/rpc/create_organization")?;
        let body = json!({
            "p_name": draft.name,
            "p_slug": draft.slug,
            "p_logo_url": null,
            "p_description": draft.description,
            "p_legal_name": draft.legal_name,
            "p_is_active": draft.is_active,
        });

        let value = self.send(self.request(reqwest::Method::POST, url).json(&body)).await?;
        let id = value
            .as_str()
            .or_else(|| value.get("id").and_then(Value::as_str))
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| RepositoryError::Backend("create_organization returned no id".to_string()))?;

        Ok(Organization {
            id,
            name: draft.name,
            slug: draft.slug,
            legal_name: draft.legal_name,
            description: draft.description,
            is_active: draft.is_active,
            created_at: chrono::Utc::now(),
        })
    }

    async fn update(&self, id: Uuid, changes: OrganizationChanges) -> Result<Organization, RepositoryError> {
        let url = self.endpoint("rest/v1/rpc/admin_update_organization")?;
        let body = json!({
            "p_id": id,
            "p_name": changes.name,
            "p_description": changes.description,
            "p_legal_name": changes.legal_name,
            "p_is_active": changes.is_active,
        });
        self.send(self.request(reqwest::Method::POST, url).json(&body)).await?;

        // The RPC reports nothing back; read the row to return the stored slug and timestamps.
        let mut url = self.endpoint("rest/v1/organizations")?;
        url.query_pairs_mut()
            .append_pair("select", ORGANIZATION_COLUMNS)
            .append_pair("id", &format!("eq.{}", id))
            .append_pair("limit", "1");

        let value = self.send(self.request(reqwest::Method::GET, url)).await?;
        let rows: Vec<Organization> = serde_json::from_value(value)
            .map_err(|e| RepositoryError::Backend(format!("malformed organization row: {}", e)))?;
        rows.into_iter().next().ok_or(RepositoryError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Organization>, RepositoryError> {
        let mut url = self.endpoint("rest/v1/organizations")?;
        url.query_pairs_mut()
            .append_pair("select", ORGANIZATION_COLUMNS)
            .append_pair("order", "created_at.desc");

        let value = self.send(self.request(reqwest::Method::GET, url)).await?;
        serde_json::from_value(value)
            .map_err(|e| RepositoryError::Backend(format!("malformed organization list: {}", e)))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<usize, RepositoryError> {
        let url = self.endpoint("rest/v1/rpc/admin_delete_organizations")?;
        let body = json!({ "p_ids": ids });
        let value = self.send(self.request(reqwest::Method::POST, url).json(&body)).await?;
        Ok(value.as_u64().map(|n| n as usize).unwrap_or(ids.len()))
    }
}
