// handlers/admin/companies.rs - /:locale/admin/companies
//
// The gate has already required the admin tenant claim for this subtree;
// a request without a gate context (asset bypass) is refused.

use axum::extract::{Extension, Json, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Organization;
use crate::gate::GateContext;
use crate::handlers::pages::gated;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{NewOrganization, UpdateOrganization};

#[derive(Debug, Deserialize)]
pub struct DeleteCompaniesRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct DeleteCompaniesResponse {
    pub deleted: usize,
}

/// GET /:locale/admin/companies
pub async fn companies_list(
    State(state): State<AppState>,
    context: Option<Extension<GateContext>>,
) -> ApiResult<Vec<Organization>> {
    gated(context)?;
    let organizations = state.organizations.list().await?;
    Ok(ApiResponse::success(organizations))
}

/// POST /:locale/admin/companies
///
/// ```json
/// { "name": "Acme", "legal_name": "Acme Ltda", "description": null, "is_active": true }
/// ```
pub async fn companies_create(
    State(state): State<AppState>,
    context: Option<Extension<GateContext>>,
    Json(input): Json<NewOrganization>,
) -> ApiResult<Organization> {
    gated(context)?;
    let organization = state.organizations.create(input).await?;
    Ok(ApiResponse::created(organization))
}

/// PUT /:locale/admin/companies
///
/// ```json
/// { "id": "...", "name": "Acme", "legal_name": null, "description": "", "is_active": false }
/// ```
pub async fn companies_update(
    State(state): State<AppState>,
    context: Option<Extension<GateContext>>,
    Json(input): Json<UpdateOrganization>,
) -> ApiResult<Organization> {
    gated(context)?;
    let organization = state.organizations.update(input).await?;
    Ok(ApiResponse::success(organization))
}

/// DELETE /:locale/admin/companies with `{ "ids": [...] }`
pub async fn companies_delete(
    State(state): State<AppState>,
    context: Option<Extension<GateContext>>,
    Json(request): Json<DeleteCompaniesRequest>,
) -> ApiResult<DeleteCompaniesResponse> {
    gated(context)?;
    let deleted = state.organizations.delete(&request.ids).await?;
    Ok(ApiResponse::success(DeleteCompaniesResponse { deleted }))
}
