use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Organization, OrganizationChanges, OrganizationDraft};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// Unique constraint on the slug rejected the insert.
    #[error("slug '{0}' already exists")]
    DuplicateSlug(String),
    /// The store answered with an error; the message is passed through verbatim.
    #[error("{0}")]
    Backend(String),
    #[error("organization {0} not found")]
    NotFound(Uuid),
    #[error("persistence service unavailable: {0}")]
    Unavailable(String),
}

/// Persistence operations used by the organization service.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Insert one organization. A taken slug must fail with `DuplicateSlug`.
    async fn insert(&self, draft: OrganizationDraft) -> Result<Organization, RepositoryError>;

    /// Overwrite the editable fields of one organization; the slug is kept.
    async fn update(&self, id: Uuid, changes: OrganizationChanges) -> Result<Organization, RepositoryError>;

    /// All organizations, newest first.
    async fn list(&self) -> Result<Vec<Organization>, RepositoryError>;

    /// Delete by id; returns how many were removed.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<usize, RepositoryError>;
}

/// Process-local store keyed by slug.
#[derive(Default)]
pub struct InMemoryOrganizationRepository {
    by_slug: RwLock<HashMap<String, Organization>>,
}

impl InMemoryOrganizationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn insert(&self, draft: OrganizationDraft) -> Result<Organization, RepositoryError> {
        let mut by_slug = self.by_slug.write().await;
        if by_slug.contains_key(&draft.slug) {
            return Err(RepositoryError::DuplicateSlug(draft.slug));
        }

        let organization = Organization {
            id: Uuid::new_v4(),
            name: draft.name,
            slug: draft.slug,
            legal_name: draft.legal_name,
            description: draft.description,
            is_active: draft.is_active,
            created_at: Utc::now(),
        };
        by_slug.insert(organization.slug.clone(), organization.clone());
        Ok(organization)
    }

    async fn update(&self, id: Uuid, changes: OrganizationChanges) -> Result<Organization, RepositoryError> {
        let mut by_slug = self.by_slug.write().await;
        let organization = by_slug
            .values_mut()
            .find(|org| org.id == id)
            .ok_or(RepositoryError::NotFound(id))?;

        organization.name = changes.name;
        organization.legal_name = changes.legal_name;
        organization.description = changes.description;
        organization.is_active = changes.is_active;
        Ok(organization.clone())
    }

    async fn list(&self) -> Result<Vec<Organization>, RepositoryError> {
        let by_slug = self.by_slug.read().await;
        let mut organizations: Vec<Organization> = by_slug.values().cloned().collect();
        organizations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.slug.cmp(&b.slug)));
        Ok(organizations)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<usize, RepositoryError> {
        let mut by_slug = self.by_slug.write().await;
        let before = by_slug.len();
        by_slug.retain(|_, org| !ids.contains(&org.id));
        Ok(before - by_slug.len())
    }
}
