//! Tenant slug normalization and collision-resolving allocation.
//!
//! Candidates are tried in a fixed order: `base`, `base-2`, `base-3`, ...
//! (there is never a `-1`). The async variant folds the uniqueness check into
//! the creation call itself, so the store's unique constraint decides and no
//! separate check-then-insert window exists.

use std::future::Future;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("'{source_name}' does not produce a usable slug")]
    EmptySlug { source_name: String },
    #[error("slug '{base}' and its variants are taken ({attempts} attempts)")]
    CollisionExhausted { base: String, attempts: u32 },
}

/// Failure reported by a creation primitive.
#[derive(Debug)]
pub enum CreateError<E> {
    /// Uniqueness constraint rejected the candidate; try the next one.
    Duplicate,
    /// Anything else; allocation stops and the error is returned as-is.
    Other(E),
}

#[derive(Debug, thiserror::Error)]
pub enum AllocateError<E> {
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error("{0}")]
    Create(E),
}

/// Lowercase ASCII, hyphen-separated, no leading or trailing hyphen.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.nfd().filter(|c| !is_combining_mark(*c)) {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Candidate for a zero-based attempt index.
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt + 1)
    }
}

/// Heuristic for stores that only report collisions as text.
///
/// Prefer a typed signal; this matches `duplicate`, `already exists` and
/// `unique` case-insensitively.
pub fn is_duplicate_message(message: &str) -> bool {
    let message = message.to_lowercase();
    ["duplicate", "already exists", "unique"]
        .iter()
        .any(|needle| message.contains(needle))
}

#[derive(Debug, Clone, Copy)]
pub struct SlugAllocator {
    max_attempts: u32,
}

impl Default for SlugAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl SlugAllocator {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn base(source_name: &str) -> Result<String, SlugError> {
        let base = slugify(source_name);
        if base.is_empty() {
            return Err(SlugError::EmptySlug {
                source_name: source_name.to_string(),
            });
        }
        Ok(base)
    }

    /// Return the first candidate for which `exists` is false.
    pub fn allocate<F>(&self, source_name: &str, mut exists: F) -> Result<String, SlugError>
    where
        F: FnMut(&str) -> bool,
    {
        let base = Self::base(source_name)?;
        for attempt in 0..self.max_attempts {
            let slug = candidate(&base, attempt);
            if !exists(&slug) {
                return Ok(slug);
            }
        }
        Err(SlugError::CollisionExhausted {
            base,
            attempts: self.max_attempts,
        })
    }

    /// Call `create` with successive candidates until it succeeds.
    ///
    /// Only `CreateError::Duplicate` advances to the next candidate; any
    /// other failure ends the loop immediately.
    pub async fn allocate_with<T, E, F, Fut>(
        &self,
        source_name: &str,
        mut create: F,
    ) -> Result<T, AllocateError<E>>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, CreateError<E>>>,
    {
        let base = Self::base(source_name)?;
        for attempt in 0..self.max_attempts {
            let slug = candidate(&base, attempt);
            match create(slug.clone()).await {
                Ok(created) => return Ok(created),
                Err(CreateError::Duplicate) => {
                    tracing::debug!("Slug '{}' taken, trying next candidate", slug);
                }
                Err(CreateError::Other(e)) => return Err(AllocateError::Create(e)),
            }
        }
        Err(SlugError::CollisionExhausted {
            base,
            attempts: self.max_attempts,
        }
        .into())
    }
}
