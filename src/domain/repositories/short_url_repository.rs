//! Repository trait for short URL data access.

use crate::domain::entities::{NewShortUrl, OwnerScope, ResolvedShortUrl, ShortUrl, ShortUrlContent};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Substring filters for listing short URLs.
///
/// Each non-empty field must be contained (case-sensitively) in the matching
/// column. Non-empty filters are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListFilter {
    pub owner_name: String,
    pub slug: String,
    pub target: String,
    pub title: String,
    pub description: String,
    pub image: String,
}

impl ListFilter {
    /// Returns `(column, needle)` pairs for every non-empty filter.
    pub fn active_filters(&self) -> Vec<(&'static str, &str)> {
        [
            ("owner_name", self.owner_name.as_str()),
            ("slug", self.slug.as_str()),
            ("target", self.target.as_str()),
            ("title", self.title.as_str()),
            ("description", self.description.as_str()),
            ("image", self.image.as_str()),
        ]
        .into_iter()
        .filter(|(_, needle)| !needle.is_empty())
        .collect()
    }
}

/// Validated, 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    /// Row offset of the page, or `None` if it does not fit in an `i64`.
    pub fn checked_offset(&self) -> Option<i64> {
        (self.page - 1).checked_mul(self.size)
    }

    pub fn offset(&self) -> i64 {
        self.checked_offset().unwrap_or(i64::MAX)
    }
}

/// One page of results plus the total matching count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub total: i64,
    pub list: Vec<T>,
}

/// Entry counts for an owner scope.
///
/// [`EntryCounts::UNAVAILABLE`] marks a failed count; it can never be confused
/// with a real zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryCounts {
    pub total: i64,
    pub month_total: i64,
}

impl EntryCounts {
    pub const UNAVAILABLE: EntryCounts = EntryCounts {
        total: -1,
        month_total: -1,
    };

    pub fn is_unavailable(&self) -> bool {
        *self == Self::UNAVAILABLE
    }
}

/// Repository interface for managing short URLs.
///
/// Ownership checks are expressed through `owner_id` / [`OwnerScope`] arguments;
/// mutating methods return `Ok(None)` (or `Ok(false)`) when no row matched.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortUrlRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_short_url.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Inserts a new short URL owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the slug is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, owner_id: &str, new_url: NewShortUrl) -> Result<ShortUrl, AppError>;

    /// Replaces the editable content of the row matching `(id, owner_id)`.
    ///
    /// Never touches `owner_id` or `active`. Bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the new slug is already taken.
    async fn update_content(
        &self,
        owner_id: &str,
        id: i64,
        content: ShortUrlContent,
    ) -> Result<Option<ShortUrl>, AppError>;

    /// Sets the `active` flag on the row matching `id` within `scope`.
    async fn set_active(
        &self,
        scope: &OwnerScope,
        id: i64,
        active: bool,
    ) -> Result<Option<ShortUrl>, AppError>;

    /// Sets the `visible` flag on the row matching `id` within `scope`.
    async fn set_visible(
        &self,
        scope: &OwnerScope,
        id: i64,
        visible: bool,
    ) -> Result<Option<ShortUrl>, AppError>;

    /// Deletes the row matching `(id, owner_id)`.
    ///
    /// Returns `Ok(true)` if a row was deleted.
    async fn delete(&self, owner_id: &str, id: i64) -> Result<bool, AppError>;

    /// Lists short URLs within `scope`, newest update first.
    ///
    /// `total` and `list` come from the same snapshot.
    async fn list(
        &self,
        scope: &OwnerScope,
        filter: &ListFilter,
        page: PageRequest,
    ) -> Result<Page<ShortUrl>, AppError>;

    /// Finds the redirect projection for an exact slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<ResolvedShortUrl>, AppError>;

    /// Counts entries within `scope`, and those created in `[since, until)`.
    ///
    /// Both counts come from the same snapshot.
    async fn count(
        &self,
        scope: &OwnerScope,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<EntryCounts, AppError>;
}
