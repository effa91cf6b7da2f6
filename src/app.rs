use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::access::AccessPolicy;
use crate::auth::{authenticator_from_config, AuthError, SessionAuthenticator};
use crate::config::AppConfig;
use crate::database::repository::{InMemoryOrganizationRepository, OrganizationRepository, RepositoryError};
use crate::database::rpc::RpcOrganizationRepository;
use crate::gate::Gate;
use crate::handlers;
use crate::middleware::gate_middleware;
use crate::services::OrganizationService;
use crate::slug::SlugAllocator;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gate: Arc<Gate>,
    pub policy: AccessPolicy,
    pub organizations: Arc<OrganizationService>,
}

impl AppState {
    /// Wire the collaborators selected by the configuration.
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let authenticator = authenticator_from_config(&config)?;

        let repository: Arc<dyn OrganizationRepository> = match &config.persistence {
            Some(persistence) => Arc::new(RpcOrganizationRepository::new(
                persistence.url.clone(),
                persistence.api_key.clone(),
                Duration::from_millis(config.auth.timeout_ms),
            )?),
            None => {
                tracing::warn!("PERSISTENCE_URL not set; organizations are kept in memory");
                Arc::new(InMemoryOrganizationRepository::new())
            }
        };

        Ok(Self::with_collaborators(config, authenticator, repository))
    }

    pub fn with_collaborators(
        config: AppConfig,
        authenticator: Arc<dyn SessionAuthenticator>,
        repository: Arc<dyn OrganizationRepository>,
    ) -> Self {
        let gate = Arc::new(Gate::new(&config, authenticator));
        let policy = AccessPolicy::from_config(&config);
        let organizations = Arc::new(OrganizationService::new(
            repository,
            SlugAllocator::new(config.slug.max_attempts),
        ));

        Self {
            config: Arc::new(config),
            gate,
            policy,
            organizations,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/:locale/me", get(handlers::me))
        .route(
            "/:locale/admin/companies",
            get(handlers::admin::companies_list)
                .post(handlers::admin::companies_create)
                .put(handlers::admin::companies_update)
                .delete(handlers::admin::companies_delete),
        )
        .fallback(handlers::page)
        .layer(from_fn_with_state(state.gate.clone(), gate_middleware))
        .with_state(state);

    Router::new()
        .route("/health", get(handlers::health))
        .merge(gated)
        .layer(TraceLayer::new_for_http())
}
