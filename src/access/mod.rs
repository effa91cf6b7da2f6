//! Access decisions for gated routes.
//!
//! `AccessPolicy::decide` is pure: identical inputs always give identical
//! decisions, and nothing here performs I/O.

pub mod routes;

use serde::Serialize;
use url::form_urlencoded;

use crate::auth::Identity;
use crate::config::AppConfig;
use crate::locale::Locale;

pub use routes::{classify, is_asset_path, RouteClassification};

/// Outcome of the access decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    Allow,
    Redirect {
        target: String,
        query: Vec<(String, String)>,
    },
}

impl AccessDecision {
    fn redirect(target: String) -> Self {
        AccessDecision::Redirect {
            target,
            query: Vec::new(),
        }
    }

    /// Target path with the query additions encoded, or `None` for Allow.
    pub fn location(&self) -> Option<String> {
        match self {
            AccessDecision::Allow => None,
            AccessDecision::Redirect { target, query } if query.is_empty() => Some(target.clone()),
            AccessDecision::Redirect { target, query } => {
                let encoded = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(query.iter())
                    .finish();
                Some(format!("{}?{}", target, encoded))
            }
        }
    }
}

/// Inputs to a single access decision.
#[derive(Debug, Clone)]
pub struct AccessRequest<'a> {
    pub identity: &'a Identity,
    pub route: RouteClassification,
    /// Route path with the locale prefix removed.
    pub route_path: &'a str,
    /// Path exactly as requested; becomes `returnTo` on login redirects.
    pub original_path: &'a str,
    pub locale: &'a Locale,
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    admin_tenant_id: Option<String>,
}

impl AccessPolicy {
    pub fn new(admin_tenant_id: Option<String>) -> Self {
        Self { admin_tenant_id }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.access.admin_tenant_id.clone())
    }

    /// First matching rule wins:
    /// 1. anonymous outside AuthOnly routes goes to login with `returnTo`
    /// 2. authenticated on `/` or an AuthOnly route goes to the dashboard
    /// 3. authenticated on AdminRestricted without the admin tenant claim is forbidden
    /// 4. everything else is allowed
    pub fn decide(&self, request: &AccessRequest<'_>) -> AccessDecision {
        let locale = request.locale;

        match request.identity {
            Identity::Anonymous => {
                if request.route == RouteClassification::AuthOnly {
                    AccessDecision::Allow
                } else {
                    AccessDecision::Redirect {
                        target: format!("/{}/login", locale),
                        query: vec![("returnTo".to_string(), request.original_path.to_string())],
                    }
                }
            }
            Identity::Authenticated { .. } => {
                if request.route_path == "/" || request.route == RouteClassification::AuthOnly {
                    return AccessDecision::redirect(format!("/{}/dashboard", locale));
                }
                if request.route == RouteClassification::AdminRestricted
                    && !self.is_admin_tenant(request.identity.tenant_claim())
                {
                    return AccessDecision::redirect(format!("/{}/forbidden", locale));
                }
                AccessDecision::Allow
            }
        }
    }

    fn is_admin_tenant(&self, claim: Option<&str>) -> bool {
        match (&self.admin_tenant_id, claim) {
            (Some(admin), Some(claim)) => admin == claim,
            _ => false,
        }
    }

    /// Where to send a user after a successful login.
    ///
    /// Only same-origin absolute paths are honored, and never a path back
    /// into an AuthOnly screen (with or without a locale prefix).
    pub fn post_login_target(&self, requested: Option<&str>, locale: &Locale) -> String {
        let fallback = format!("/{}/dashboard", locale);
        let Some(target) = requested.filter(|t| !t.is_empty()) else {
            return fallback;
        };
        if !target.starts_with('/') || target.starts_with("//") || target.starts_with("/\\") {
            return fallback;
        }
        if points_at_auth_screen(target) {
            return fallback;
        }
        target.to_string()
    }
}

/// Matches `(/xx)?/(login|signup|forgot-password|reset-password)(/|$)`.
fn points_at_auth_screen(target: &str) -> bool {
    let path = target.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.split('/').skip(1);
    let first = segments.next().unwrap_or_default();

    let candidate = if first.len() == 2 && first.bytes().all(|b| b.is_ascii_lowercase()) {
        segments.next().unwrap_or_default()
    } else {
        first
    };
    routes::AUTH_SEGMENTS.contains(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: &str = "a44bd713-601b-4ec1-800d-c0fa2cf618c8";

    fn policy() -> AccessPolicy {
        AccessPolicy::new(Some(ADMIN.to_string()))
    }

    fn decide(identity: &Identity, route_path: &str, original_path: &str, locale: &str) -> AccessDecision {
        let locale = Locale::new(locale);
        policy().decide(&AccessRequest {
            identity,
            route: classify(route_path),
            route_path,
            original_path,
            locale: &locale,
        })
    }

    fn member(claim: Option<&str>) -> Identity {
        Identity::authenticated("user-1", claim.map(str::to_string))
    }

    #[test]
    fn anonymous_is_sent_to_login_with_return_to() {
        let decision = decide(&Identity::Anonymous, "/admin/companies", "/admin/companies", "pt");
        assert_eq!(
            decision.location().as_deref(),
            Some("/pt/login?returnTo=%2Fadmin%2Fcompanies")
        );
    }

    #[test]
    fn anonymous_login_redirect_covers_every_non_auth_route() {
        for route_path in ["/", "/dashboard", "/admin", "/forbidden", "/me"] {
            let original = format!("/en{}", route_path);
            match decide(&Identity::Anonymous, route_path, &original, "en") {
                AccessDecision::Redirect { target, query } => {
                    assert_eq!(target, "/en/login");
                    assert_eq!(query, vec![("returnTo".to_string(), original.clone())]);
                }
                AccessDecision::Allow => panic!("{route_path} should redirect"),
            }
        }
    }

    #[test]
    fn anonymous_may_see_auth_screens() {
        for route_path in ["/login", "/signup", "/forgot-password", "/reset-password/token"] {
            assert_eq!(
                decide(&Identity::Anonymous, route_path, route_path, "pt"),
                AccessDecision::Allow
            );
        }
    }

    #[test]
    fn authenticated_on_auth_screen_goes_to_dashboard() {
        for claim in [None, Some("org-x"), Some(ADMIN)] {
            let decision = decide(&member(claim), "/login", "/es/login", "es");
            assert_eq!(decision.location().as_deref(), Some("/es/dashboard"));
        }
    }

    #[test]
    fn authenticated_on_root_goes_to_dashboard() {
        let decision = decide(&member(None), "/", "/en", "en");
        assert_eq!(decision.location().as_deref(), Some("/en/dashboard"));
    }

    #[test]
    fn admin_routes_require_admin_tenant() {
        for claim in [None, Some("org-x"), Some("")] {
            let decision = decide(&member(claim), "/admin", "/en/admin", "en");
            assert_eq!(decision.location().as_deref(), Some("/en/forbidden"));
        }
        assert_eq!(
            decide(&member(Some(ADMIN)), "/admin/users", "/en/admin/users", "en"),
            AccessDecision::Allow
        );
    }

    #[test]
    fn no_admin_tenant_configured_forbids_everyone() {
        let locale = Locale::new("pt");
        let identity = member(None);
        let decision = AccessPolicy::new(None).decide(&AccessRequest {
            identity: &identity,
            route: RouteClassification::AdminRestricted,
            route_path: "/admin",
            original_path: "/pt/admin",
            locale: &locale,
        });
        assert_eq!(decision.location().as_deref(), Some("/pt/forbidden"));
    }

    #[test]
    fn ordinary_routes_are_allowed_for_members() {
        assert_eq!(
            decide(&member(Some("org-x")), "/dashboard", "/pt/dashboard", "pt"),
            AccessDecision::Allow
        );
    }

    #[test]
    fn decision_is_deterministic() {
        let identity = member(Some("org-x"));
        let first = decide(&identity, "/admin", "/pt/admin", "pt");
        let second = decide(&identity, "/admin", "/pt/admin", "pt");
        assert_eq!(first, second);
    }

    #[test]
    fn post_login_target_sanitizes_return_to() {
        let policy = policy();
        let pt = Locale::new("pt");
        assert_eq!(policy.post_login_target(Some("/pt/admin/companies"), &pt), "/pt/admin/companies");
        assert_eq!(policy.post_login_target(None, &pt), "/pt/dashboard");
        assert_eq!(policy.post_login_target(Some("https://evil.example"), &pt), "/pt/dashboard");
        assert_eq!(policy.post_login_target(Some("//evil.example"), &pt), "/pt/dashboard");
        assert_eq!(policy.post_login_target(Some("/es/login"), &pt), "/pt/dashboard");
        assert_eq!(policy.post_login_target(Some("/signup?x=1"), &pt), "/pt/dashboard");
        assert_eq!(policy.post_login_target(Some("/pt/loginhelp"), &pt), "/pt/loginhelp");
    }
}
