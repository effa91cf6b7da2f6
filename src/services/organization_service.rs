use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{Organization, OrganizationChanges, OrganizationDraft};
use crate::database::repository::{OrganizationRepository, RepositoryError};
use crate::slug::{AllocateError, CreateError, SlugAllocator, SlugError};

/// Input for creating an organization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewOrganization {
    pub name: String,
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Input for editing an organization; the slug is not editable.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrganization {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum OrganizationError {
    #[error("Organization name is required")]
    NameRequired,
    #[error("No organization ids given")]
    NothingSelected,
    #[error("Organization name is unavailable: {0}")]
    SlugUnavailable(#[from] SlugError),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<AllocateError<RepositoryError>> for OrganizationError {
    fn from(err: AllocateError<RepositoryError>) -> Self {
        match err {
            AllocateError::Slug(e) => OrganizationError::SlugUnavailable(e),
            AllocateError::Create(e) => OrganizationError::Repository(e),
        }
    }
}

pub struct OrganizationService {
    repository: Arc<dyn OrganizationRepository>,
    allocator: SlugAllocator,
}

impl OrganizationService {
    pub fn new(repository: Arc<dyn OrganizationRepository>, allocator: SlugAllocator) -> Self {
        Self {
            repository,
            allocator,
        }
    }

    /// Create an organization under the first free slug derived from its
    /// legal name (or name when no legal name is given).
    pub async fn create(&self, input: NewOrganization) -> Result<Organization, OrganizationError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(OrganizationError::NameRequired);
        }
        let legal_name = non_empty(input.legal_name);
        let description = non_empty(input.description);
        let is_active = input.is_active.unwrap_or(true);

        let slug_source = legal_name.clone().unwrap_or_else(|| name.clone());
        let repository = &self.repository;

        let organization = self
            .allocator
            .allocate_with(&slug_source, |slug| {
                let draft = OrganizationDraft {
                    name: name.clone(),
                    slug,
                    legal_name: legal_name.clone(),
                    description: description.clone(),
                    is_active,
                };
                async move {
                    match repository.insert(draft).await {
                        Ok(organization) => Ok(organization),
                        Err(RepositoryError::DuplicateSlug(_)) => Err(CreateError::Duplicate),
                        Err(other) => Err(CreateError::Other(other)),
                    }
                }
            })
            .await?;

        tracing::info!("Created organization '{}' with slug '{}'", organization.name, organization.slug);
        Ok(organization)
    }

    /// Overwrite name, legal name, description and active flag. Blank
    /// optional fields are stored as absent; the slug stays as allocated.
    pub async fn update(&self, input: UpdateOrganization) -> Result<Organization, OrganizationError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(OrganizationError::NameRequired);
        }
        let changes = OrganizationChanges {
            name,
            legal_name: non_empty(input.legal_name),
            description: non_empty(input.description),
            is_active: input.is_active.unwrap_or(true),
        };

        let organization = self
            .repository
            .update(input.id, changes)
            .await
            .map_err(OrganizationError::Repository)?;
        tracing::info!("Updated organization {} ('{}')", organization.id, organization.slug);
        Ok(organization)
    }

    pub async fn list(&self) -> Result<Vec<Organization>, OrganizationError> {
        self.repository.list().await.map_err(OrganizationError::Repository)
    }

    pub async fn delete(&self, ids: &[Uuid]) -> Result<usize, OrganizationError> {
        if ids.is_empty() {
            return Err(OrganizationError::NothingSelected);
        }
        let removed = self
            .repository
            .delete_many(ids)
            .await
            .map_err(OrganizationError::Repository)?;
        tracing::info!("Deleted {} organization(s)", removed);
        Ok(removed)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::InMemoryOrganizationRepository;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service() -> OrganizationService {
        OrganizationService::new(
            Arc::new(InMemoryOrganizationRepository::new()),
            SlugAllocator::default(),
        )
    }

    fn named(name: &str) -> NewOrganization {
        NewOrganization {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn colliding_names_get_suffixes() {
        let service = service();
        let slugs: Vec<String> = {
            let mut slugs = Vec::new();
            for _ in 0..4 {
                slugs.push(service.create(named("Acme Inc.")).await.unwrap().slug);
            }
            slugs
        };
        assert_eq!(slugs, vec!["acme-inc", "acme-inc-2", "acme-inc-3", "acme-inc-4"]);
    }

    #[tokio::test]
    async fn legal_name_drives_slug() {
        let org = service()
            .create(NewOrganization {
                name: "Acme".to_string(),
                legal_name: Some("Acme Indústria Ltda".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(org.slug, "acme-industria-ltda");
        assert_eq!(org.name, "Acme");
        assert!(org.is_active);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let err = service().create(named("   ")).await.unwrap_err();
        assert!(matches!(err, OrganizationError::NameRequired));
    }

    #[tokio::test]
    async fn exhaustion_is_slug_unavailable() {
        let service = OrganizationService::new(
            Arc::new(InMemoryOrganizationRepository::new()),
            SlugAllocator::new(2),
        );
        service.create(named("Acme")).await.unwrap();
        service.create(named("Acme")).await.unwrap();
        let err = service.create(named("Acme")).await.unwrap_err();
        assert!(matches!(
            err,
            OrganizationError::SlugUnavailable(SlugError::CollisionExhausted { attempts: 2, .. })
        ));
    }

    struct FailingRepository {
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl OrganizationRepository for FailingRepository {
        async fn insert(&self, _draft: OrganizationDraft) -> Result<Organization, RepositoryError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Err(RepositoryError::Backend("permission denied for function create_organization".to_string()))
        }

        async fn update(&self, id: Uuid, _changes: OrganizationChanges) -> Result<Organization, RepositoryError> {
            Err(RepositoryError::NotFound(id))
        }

        async fn list(&self) -> Result<Vec<Organization>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn delete_many(&self, _ids: &[Uuid]) -> Result<usize, RepositoryError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn other_failures_are_not_retried() {
        let repository = Arc::new(FailingRepository {
            inserts: AtomicUsize::new(0),
        });
        let service = OrganizationService::new(repository.clone(), SlugAllocator::default());
        let err = service.create(named("Acme")).await.unwrap_err();
        assert_eq!(repository.inserts.load(Ordering::SeqCst), 1);
        assert_eq!(err.to_string(), "permission denied for function create_organization");
    }

    #[tokio::test]
    async fn delete_requires_ids() {
        let err = service().delete(&[]).await.unwrap_err();
        assert!(matches!(err, OrganizationError::NothingSelected));
    }

    #[tokio::test]
    async fn update_trims_fields_and_keeps_slug() {
        let service = service();
        let created = service
            .create(NewOrganization {
                name: "Acme".to_string(),
                legal_name: Some("Acme Ltda".to_string()),
                description: Some("Anvils".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = service
            .update(UpdateOrganization {
                id: created.id,
                name: "  Acme Global  ".to_string(),
                legal_name: Some("   ".to_string()),
                description: Some(" Rockets ".to_string()),
                is_active: Some(false),
            })
            .await
            .unwrap();

        assert_eq!(updated.slug, "acme-ltda");
        assert_eq!(updated.name, "Acme Global");
        assert_eq!(updated.legal_name, None);
        assert_eq!(updated.description.as_deref(), Some("Rockets"));
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn update_requires_name() {
        let service = service();
        let created = service.create(named("Acme")).await.unwrap();
        let err = service
            .update(UpdateOrganization {
                id: created.id,
                name: " ".to_string(),
                legal_name: None,
                description: None,
                is_active: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrganizationError::NameRequired));
    }

    #[tokio::test]
    async fn update_of_missing_organization_is_not_found() {
        let id = Uuid::new_v4();
        let err = service()
            .update(UpdateOrganization {
                id,
                name: "Acme".to_string(),
                legal_name: None,
                description: None,
                is_active: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrganizationError::Repository(RepositoryError::NotFound(missing)) if missing == id));
    }
}
