pub mod models;
pub mod repository;
pub mod rpc;

pub use models::{Organization, OrganizationChanges, OrganizationDraft};
pub use repository::{InMemoryOrganizationRepository, OrganizationRepository, RepositoryError};
pub use rpc::RpcOrganizationRepository;
