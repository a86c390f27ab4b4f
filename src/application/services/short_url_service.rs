//! Short URL management, listing, resolution and counting.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::config::DEFAULT_MAX_PAGE_SIZE;
use crate::domain::entities::short_url::{normalize_owner_name, normalize_password};
use crate::domain::entities::{NewShortUrl, Principal, ResolvedShortUrl, ShortUrl, ShortUrlContent};
use crate::domain::repositories::{EntryCounts, ListFilter, Page, PageRequest, ShortUrlRepository};
use crate::error::AppError;
use crate::utils::date_range::month_window;
use crate::utils::target_url::normalize_target;

/// Listing parameters as received from a caller.
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
    #[serde(flatten)]
    pub filter: ListFilter,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
            filter: ListFilter::default(),
        }
    }
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    10
}

/// Service for owner-scoped short URL operations.
///
/// Every mutating method takes a verified [`Principal`]. Ownership is enforced
/// in the SQL predicate itself, so a mismatched owner surfaces as
/// [`AppError::NotFound`] without revealing that the row exists.
pub struct ShortUrlService<R: ShortUrlRepository> {
    repository: Arc<R>,
    max_page_size: i64,
}

impl<R: ShortUrlRepository> ShortUrlService<R> {
    /// Creates a new service with the default page size cap.
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_max_page_size(repository, DEFAULT_MAX_PAGE_SIZE)
    }

    pub fn with_max_page_size(repository: Arc<R>, max_page_size: i64) -> Self {
        Self {
            repository,
            max_page_size,
        }
    }

    /// Creates a short URL owned by `principal`.
    ///
    /// Blank owner names become `"Anonymous"`, blank passwords become `None`,
    /// and the target is canonicalised.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for invalid input.
    /// Returns [`AppError::Conflict`] if the slug is already taken.
    #[tracing::instrument(skip(self, principal, input), fields(user = principal.user_id(), slug = %input.slug))]
    pub async fn create_entry(
        &self,
        principal: &Principal,
        input: NewShortUrl,
    ) -> Result<ShortUrl, AppError> {
        input.validate()?;

        let new_url = NewShortUrl {
            owner_name: normalize_owner_name(&input.owner_name),
            target: canonical_target(&input.target)?,
            password: normalize_password(input.password),
            ..input
        };

        let created = self
            .repository
            .create(principal.user_id(), new_url)
            .await
            .map_err(|e| slug_conflict(e, "create"))?;

        metrics::counter!("shortlink_entries_created_total").increment(1);
        tracing::info!(id = created.id, "Short URL created");

        Ok(created)
    }

    /// Replaces the editable content of an entry owned by `principal`.
    ///
    /// The `active` flag and the owner are never changed here.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if `principal` owns no entry with `id`.
    /// Returns [`AppError::Conflict`] if the new slug is already taken.
    #[tracing::instrument(skip(self, principal, content), fields(user = principal.user_id()))]
    pub async fn update_entry(
        &self,
        principal: &Principal,
        id: i64,
        content: ShortUrlContent,
    ) -> Result<ShortUrl, AppError> {
        content.validate()?;

        let content = ShortUrlContent {
            target: canonical_target(&content.target)?,
            password: normalize_password(content.password),
            ..content
        };

        let updated = self
            .repository
            .update_content(principal.user_id(), id, content)
            .await
            .map_err(|e| slug_conflict(e, "update"))?
            .ok_or_else(|| entry_not_found(id))?;

        tracing::info!("Short URL updated");
        Ok(updated)
    }

    /// Enables or disables an entry.
    ///
    /// Admins may toggle any entry; users only their own.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no entry with `id` is in the principal's scope.
    #[tracing::instrument(skip(self, principal), fields(user = principal.user_id(), role = principal.role().as_str()))]
    pub async fn update_entry_active_flag(
        &self,
        principal: &Principal,
        id: i64,
        active: bool,
    ) -> Result<ShortUrl, AppError> {
        let updated = self
            .repository
            .set_active(&principal.scope(), id, active)
            .await?
            .ok_or_else(|| entry_not_found(id))?;

        tracing::info!("Short URL active flag changed");
        Ok(updated)
    }

    /// Shows or hides an entry.
    ///
    /// Scoped the same way as [`Self::update_entry_active_flag`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no entry with `id` is in the principal's scope.
    #[tracing::instrument(skip(self, principal), fields(user = principal.user_id(), role = principal.role().as_str()))]
    pub async fn update_entry_visibility(
        &self,
        principal: &Principal,
        id: i64,
        visible: bool,
    ) -> Result<ShortUrl, AppError> {
        let updated = self
            .repository
            .set_visible(&principal.scope(), id, visible)
            .await?
            .ok_or_else(|| entry_not_found(id))?;

        tracing::info!("Short URL visibility changed");
        Ok(updated)
    }

    /// Deletes an entry owned by `principal`.
    ///
    /// Admin status does not widen the scope: only the owner may delete.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if `principal` owns no entry with `id`.
    #[tracing::instrument(skip(self, principal), fields(user = principal.user_id()))]
    pub async fn delete_entry(&self, principal: &Principal, id: i64) -> Result<(), AppError> {
        if !self.repository.delete(principal.user_id(), id).await? {
            return Err(entry_not_found(id));
        }

        tracing::info!("Short URL deleted");
        Ok(())
    }

    /// Lists entries visible to `principal`, newest update first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `page < 1`, `size` is outside
    /// `1..=max_page_size`, or the page offset overflows.
    pub async fn list_entries(
        &self,
        principal: &Principal,
        query: &ListQuery,
    ) -> Result<Page<ShortUrl>, AppError> {
        let page = self.page_request(query.page, query.size)?;

        tracing::debug!(
            user = principal.user_id(),
            page = page.page,
            size = page.size,
            "Listing short URLs"
        );

        self.repository
            .list(&principal.scope(), &query.filter, page)
            .await
    }

    /// Finds the redirect projection for `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no entry has this slug.
    pub async fn resolve_by_slug(&self, slug: &str) -> Result<ResolvedShortUrl, AppError> {
        self.repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "slug": slug })))
    }

    /// Counts entries in the principal's scope, overall and for the current month.
    ///
    /// # Errors
    ///
    /// Returns the repository error unchanged.
    pub async fn try_count_for_owner(&self, principal: &Principal) -> Result<EntryCounts, AppError> {
        let (since, until) = month_window(Utc::now());
        self.repository
            .count(&principal.scope(), since, until)
            .await
    }

    /// Like [`Self::try_count_for_owner`], but never fails.
    ///
    /// Returns [`EntryCounts::UNAVAILABLE`] (`-1`/`-1`) when the count cannot be
    /// read, for dashboards that render a placeholder instead of an error.
    pub async fn count_for_owner(&self, principal: &Principal) -> EntryCounts {
        match self.try_count_for_owner(principal).await {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!(user = principal.user_id(), error = %e, "Entry count unavailable");
                EntryCounts::UNAVAILABLE
            }
        }
    }

    fn page_request(&self, page: i64, size: i64) -> Result<PageRequest, AppError> {
        if page < 1 {
            return Err(AppError::bad_request(
                "Page must be at least 1",
                json!({ "page": page }),
            ));
        }

        if size < 1 || size > self.max_page_size {
            return Err(AppError::bad_request(
                format!("Page size must be between 1 and {}", self.max_page_size),
                json!({ "size": size }),
            ));
        }

        let request = PageRequest { page, size };
        if request.checked_offset().is_none() {
            return Err(AppError::bad_request(
                "Page is out of range",
                json!({ "page": page, "size": size }),
            ));
        }

        Ok(request)
    }
}

fn canonical_target(target: &str) -> Result<String, AppError> {
    normalize_target(target).map_err(|e| {
        AppError::bad_request("Invalid target URL", json!({ "reason": e.to_string() }))
    })
}

fn entry_not_found(id: i64) -> AppError {
    AppError::not_found("Short URL not found", json!({ "id": id }))
}

fn slug_conflict(e: AppError, action: &str) -> AppError {
    match e {
        AppError::Conflict { .. } => {
            tracing::info!(action, "Slug already taken");
            AppError::conflict("Slug already taken", json!({}))
        }
        other => other,
    }
}
