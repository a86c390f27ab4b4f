//! Repository trait for visit accounting and reporting.

use crate::domain::entities::{ActivityLogEntry, NewVisit, OwnerScope, VisitMeta};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for per-visitor click records.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgVisitRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_visit.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Records one visit atomically.
    ///
    /// Inserts a row with `click = 1` for a new `(url_id, ip)` pair, otherwise
    /// increments `click` by one and bumps `updated_at`. Concurrent calls for the
    /// same pair never produce duplicate rows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if `url_id` does not reference a short URL.
    /// Returns [`AppError::Internal`] on database errors.
    async fn upsert_visit(&self, visit: NewVisit) -> Result<VisitMeta, AppError>;

    /// Lists visits for a short URL, oldest update first.
    ///
    /// When `since` is set, only rows created at or after it are returned.
    async fn list_for_url(
        &self,
        url_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<VisitMeta>, AppError>;

    /// Returns the most recently updated visits within `scope`, joined with
    /// their short URL's display fields.
    async fn recent_activity(
        &self,
        scope: &OwnerScope,
        limit: i64,
    ) -> Result<Vec<ActivityLogEntry>, AppError>;
}
