//! Per-request gating pipeline.
//!
//! Asset bypass, then locale resolution, then session authentication, then
//! the access decision. The outcome is a single value that the HTTP layer
//! applies once; nothing here touches a response object.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::sync::Arc;
use url::Url;

use crate::access::{classify, is_asset_path, AccessDecision, AccessPolicy, AccessRequest, RouteClassification};
use crate::auth::{AuthError, Credentials, Identity, SessionAuthenticator};
use crate::config::AppConfig;
use crate::locale::{Locale, LocaleSet};

/// Request-scoped context handed to downstream handlers on Allow.
#[derive(Debug, Clone, Serialize)]
pub struct GateContext {
    pub locale: Locale,
    pub route: RouteClassification,
    pub route_path: String,
    pub identity: Identity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectReason {
    LocalePrefix,
    Login,
    Dashboard,
    Forbidden,
}

#[derive(Debug)]
pub enum GateOutcome {
    /// Asset path: no locale handling, no header changes.
    Bypass,
    Allow {
        context: GateContext,
        headers: Vec<(HeaderName, HeaderValue)>,
    },
    Redirect {
        location: String,
        reason: RedirectReason,
        headers: Vec<(HeaderName, HeaderValue)>,
    },
}

pub struct Gate {
    locales: LocaleSet,
    policy: AccessPolicy,
    authenticator: Arc<dyn SessionAuthenticator>,
    session_cookie: String,
    locale_cookie: String,
    secure_cookie: bool,
    base_url: Option<Url>,
}

impl Gate {
    pub fn new(config: &AppConfig, authenticator: Arc<dyn SessionAuthenticator>) -> Self {
        Self {
            locales: config.locale_set(),
            policy: AccessPolicy::from_config(config),
            authenticator,
            session_cookie: config.auth.session_cookie.clone(),
            locale_cookie: config.locale.cookie_name.clone(),
            secure_cookie: config.locale.secure_cookie,
            base_url: config.app_base_url.clone(),
        }
    }

    /// Run the pipeline for one request.
    ///
    /// The only error is a session-service failure, which must become a
    /// server error rather than an anonymous decision.
    pub async fn evaluate(
        &self,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
    ) -> Result<GateOutcome, AuthError> {
        if is_asset_path(path) {
            return Ok(GateOutcome::Bypass);
        }

        let resolution = self.locales.resolve(path);
        if !resolution.had_explicit_prefix {
            let mut target = self.locales.prefixed(&resolution.locale, &resolution.route_path);
            if let Some(query) = query.filter(|q| !q.is_empty()) {
                target.push('?');
                target.push_str(query);
            }
            tracing::debug!("Adding locale prefix: {} -> {}", path, target);
            return Ok(GateOutcome::Redirect {
                location: self.absolute(&target),
                reason: RedirectReason::LocalePrefix,
                headers: Vec::new(),
            });
        }

        let locale_headers = self.locale_headers(&resolution.locale);

        let credentials = Credentials::from_headers(headers, &self.session_cookie);
        let identity = self.authenticator.authenticate(&credentials).await.map_err(|e| {
            tracing::warn!("Session lookup failed for {}: {}", path, e);
            e
        })?;

        let route = classify(&resolution.route_path);
        let decision = self.policy.decide(&AccessRequest {
            identity: &identity,
            route,
            route_path: &resolution.route_path,
            original_path: path,
            locale: &resolution.locale,
        });

        match decision.location() {
            Some(target) => {
                let reason = redirect_reason(&decision);
                tracing::debug!("Gate redirect ({:?}): {} -> {}", reason, path, target);
                Ok(GateOutcome::Redirect {
                    location: self.absolute(&target),
                    reason,
                    headers: locale_headers,
                })
            }
            None => {
                tracing::debug!("Gate allow: {} ({:?}, {})", path, route, resolution.locale);
                Ok(GateOutcome::Allow {
                    context: GateContext {
                        locale: resolution.locale,
                        route,
                        route_path: resolution.route_path,
                        identity,
                    },
                    headers: locale_headers,
                })
            }
        }
    }

    fn locale_headers(&self, locale: &Locale) -> Vec<(HeaderName, HeaderValue)> {
        let mut cookie = format!("{}={}; Path=/; SameSite=Lax", self.locale_cookie, locale);
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }

        let mut headers = Vec::with_capacity(2);
        if let Ok(value) = HeaderValue::from_str(locale.as_str()) {
            headers.push((header::CONTENT_LANGUAGE, value));
        }
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.push((header::SET_COOKIE, value));
        }
        headers
    }

    fn absolute(&self, target: &str) -> String {
        match &self.base_url {
            Some(base) => base
                .join(target)
                .map(String::from)
                .unwrap_or_else(|_| target.to_string()),
            None => target.to_string(),
        }
    }
}

fn redirect_reason(decision: &AccessDecision) -> RedirectReason {
    match decision {
        AccessDecision::Redirect { target, .. } if target.ends_with("/login") => RedirectReason::Login,
        AccessDecision::Redirect { target, .. } if target.ends_with("/forbidden") => RedirectReason::Forbidden,
        _ => RedirectReason::Dashboard,
    }
}
