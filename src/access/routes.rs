use serde::Serialize;

/// First route segments that only make sense to anonymous visitors.
pub const AUTH_SEGMENTS: [&str; 4] = ["login", "signup", "forgot-password", "reset-password"];

const ADMIN_SEGMENT: &str = "admin";
const PUBLIC_SEGMENTS: [&str; 1] = ["forbidden"];

const ASSET_PREFIXES: [&str; 4] = ["/_next", "/images", "/public", "/api"];
const ASSET_FILES: [&str; 3] = ["/favicon.ico", "/robots.txt", "/sitemap.xml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClassification {
    Public,
    AuthOnly,
    AdminRestricted,
    Ordinary,
}

/// Classify a locale-stripped route path by its first segment.
pub fn classify(route_path: &str) -> RouteClassification {
    let first = route_path
        .split('/')
        .find(|s| !s.is_empty())
        .unwrap_or_default();

    if AUTH_SEGMENTS.contains(&first) {
        RouteClassification::AuthOnly
    } else if first == ADMIN_SEGMENT {
        RouteClassification::AdminRestricted
    } else if PUBLIC_SEGMENTS.contains(&first) {
        RouteClassification::Public
    } else {
        RouteClassification::Ordinary
    }
}

/// Static files and API paths never enter the gate.
pub fn is_asset_path(path: &str) -> bool {
    if ASSET_FILES.contains(&path) {
        return true;
    }
    if ASSET_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }) {
        return true;
    }
    // Anything that looks like a file name: `/fonts/inter.woff2`.
    path.rsplit('/').next().is_some_and(|last| last.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_first_segment() {
        assert_eq!(classify("/login"), RouteClassification::AuthOnly);
        assert_eq!(classify("/reset-password/abc"), RouteClassification::AuthOnly);
        assert_eq!(classify("/admin"), RouteClassification::AdminRestricted);
        assert_eq!(classify("/admin/companies"), RouteClassification::AdminRestricted);
        assert_eq!(classify("/forbidden"), RouteClassification::Public);
        assert_eq!(classify("/dashboard"), RouteClassification::Ordinary);
        assert_eq!(classify("/"), RouteClassification::Ordinary);
        assert_eq!(classify("/administrator"), RouteClassification::Ordinary);
        assert_eq!(classify("/me/admin"), RouteClassification::Ordinary);
    }

    #[test]
    fn recognizes_assets() {
        for path in [
            "/_next/static/chunk.js",
            "/images/logo",
            "/public",
            "/api/turnstile/verify",
            "/favicon.ico",
            "/robots.txt",
            "/sitemap.xml",
            "/fonts/inter.woff2",
        ] {
            assert!(is_asset_path(path), "{path} should bypass");
        }
    }

    #[test]
    fn pages_are_not_assets() {
        for path in ["/", "/pt/admin", "/apiary", "/publicity", "/en/login"] {
            assert!(!is_asset_path(path), "{path} should be gated");
        }
    }
}
