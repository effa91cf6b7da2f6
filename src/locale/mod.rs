//! Locale resolution for locale-prefixed routes.
//!
//! Every externally visible URL carries the active locale as its first path
//! segment (`/es/admin`). Paths without a supported prefix resolve to the
//! default locale and must be redirected to their prefixed form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A locale code that belongs to the configured set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub(crate) fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of resolving a raw request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleResolution {
    pub locale: Locale,
    /// Route path with the locale segment removed, always starting with `/`.
    pub route_path: String,
    pub had_explicit_prefix: bool,
}

/// The closed set of supported locales plus the fallback.
#[derive(Debug, Clone)]
pub struct LocaleSet {
    supported: Vec<Locale>,
    default_locale: Locale,
}

impl LocaleSet {
    /// `default_locale` must be one of `supported`; `AppConfig` validates this.
    pub fn new(supported: impl IntoIterator<Item = String>, default_locale: Locale) -> Self {
        Self {
            supported: supported.into_iter().map(Locale::new).collect(),
            default_locale,
        }
    }

    fn get(&self, code: &str) -> Option<&Locale> {
        self.supported.iter().find(|l| l.as_str() == code)
    }

    /// Keep a supported code, fall back to the default for anything else.
    pub fn sanitize(&self, code: Option<&str>) -> Locale {
        code.and_then(|c| self.get(c))
            .unwrap_or(&self.default_locale)
            .clone()
    }

    /// Split the locale prefix off `path`.
    ///
    /// Never fails: empty or relative input resolves to the default locale
    /// with route path `/`. Empty segments (`//`, trailing `/`) are dropped.
    pub fn resolve(&self, path: &str) -> LocaleResolution {
        if !path.starts_with('/') {
            return LocaleResolution {
                locale: self.default_locale.clone(),
                route_path: "/".to_string(),
                had_explicit_prefix: false,
            };
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.first().and_then(|first| self.get(first)) {
            Some(locale) => LocaleResolution {
                locale: locale.clone(),
                route_path: join_segments(&segments[1..]),
                had_explicit_prefix: true,
            },
            None => LocaleResolution {
                locale: self.default_locale.clone(),
                route_path: join_segments(&segments),
                had_explicit_prefix: false,
            },
        }
    }

    /// `/{locale}` for the root, `/{locale}{route_path}` otherwise.
    pub fn prefixed(&self, locale: &Locale, route_path: &str) -> String {
        if route_path == "/" || route_path.is_empty() {
            format!("/{}", locale)
        } else {
            format!("/{}{}", locale, route_path)
        }
    }
}

fn join_segments(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}
