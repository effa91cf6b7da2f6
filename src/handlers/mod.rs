// handlers/mod.rs - HTTP handlers
//
// Public: /health (outside the gate)
// Gated:  /:locale/* pages, /:locale/admin/companies GET/POST/PUT/DELETE (AdminRestricted)
pub mod admin;
pub mod health;
pub mod pages;

pub use health::health;
pub use pages::{me, page};
