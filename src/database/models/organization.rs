use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tenant record as stored by the persistence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub legal_name: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for one creation attempt; `slug` changes between attempts.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationDraft {
    pub name: String,
    pub slug: String,
    pub legal_name: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Editable fields; the slug never changes after creation.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationChanges {
    pub name: String,
    pub legal_name: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}
