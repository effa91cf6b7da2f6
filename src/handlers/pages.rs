// handlers/pages.rs - gated page handlers
//
// Rendering lives elsewhere; these return the request's gate context so a
// front end (or a test) can see what the gate decided.

use axum::extract::{Extension, RawQuery, State};
use serde::Serialize;
use url::form_urlencoded;

use crate::access::RouteClassification;
use crate::app::AppState;
use crate::error::ApiError;
use crate::gate::GateContext;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct PageView {
    #[serde(flatten)]
    pub context: GateContext,
    /// Where a successful login on this screen will land.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_login: Option<String>,
}

/// The gate context, or 404 when the request bypassed the gate as an asset.
pub fn gated(context: Option<Extension<GateContext>>) -> Result<GateContext, ApiError> {
    context
        .map(|Extension(context)| context)
        .ok_or_else(|| ApiError::not_found("Not found"))
}

/// GET /:locale/me - identity and locale attached by the gate
pub async fn me(context: Option<Extension<GateContext>>) -> ApiResult<GateContext> {
    Ok(ApiResponse::success(gated(context)?))
}

/// Fallback for every other gated page.
pub async fn page(
    State(state): State<AppState>,
    context: Option<Extension<GateContext>>,
    RawQuery(query): RawQuery,
) -> ApiResult<PageView> {
    let context = gated(context)?;
    let after_login = (context.route == RouteClassification::AuthOnly).then(|| {
        let return_to = query.as_deref().and_then(|q| first_param(q, "returnTo"));
        state.policy.post_login_target(return_to.as_deref(), &context.locale)
    });

    Ok(ApiResponse::success(PageView { context, after_login }))
}

/// First value of `key`; repeated or unrelated parameters never reject the page.
fn first_param(query: &str, key: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}
