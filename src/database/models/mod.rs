pub mod organization;

pub use organization::{Organization, OrganizationChanges, OrganizationDraft};
