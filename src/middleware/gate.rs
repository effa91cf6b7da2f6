use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::gate::{Gate, GateOutcome};

/// Runs the gating pipeline in front of every page route.
///
/// On Allow the `GateContext` is inserted into request extensions and the
/// locale headers are appended to whatever the handler returns. Dropping
/// this future (client gone) drops the pending session lookup with it.
pub async fn gate_middleware(State(gate): State<Arc<Gate>>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    let outcome = match gate.evaluate(&path, query.as_deref(), request.headers()).await {
        Ok(outcome) => outcome,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match outcome {
        GateOutcome::Bypass => next.run(request).await,
        GateOutcome::Allow { context, headers } => {
            request.extensions_mut().insert(context);
            let mut response = next.run(request).await;
            for (name, value) in headers {
                response.headers_mut().append(name, value);
            }
            response
        }
        GateOutcome::Redirect {
            location,
            reason,
            headers,
        } => {
            let Ok(location) = HeaderValue::from_str(&location) else {
                tracing::error!("Unencodable redirect target for {}: {}", path, location);
                return ApiError::internal_server_error("Invalid redirect target").into_response();
            };
            tracing::info!("Redirecting {} ({:?})", path, reason);
            let mut response = StatusCode::TEMPORARY_REDIRECT.into_response();
            response.headers_mut().insert(header::LOCATION, location);
            for (name, value) in headers {
                response.headers_mut().append(name, value);
            }
            response
        }
    }
}
