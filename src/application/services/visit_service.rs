//! Visit recording and reporting service.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::domain::entities::{ActivityLogEntry, NewVisit, Principal, VisitDetails, VisitMeta};
use crate::domain::repositories::VisitRepository;
use crate::error::AppError;
use crate::utils::date_range::DateRange;

/// Number of rows returned by the recent activity log.
pub const RECENT_ACTIVITY_LIMIT: i64 = 10;

/// Service for recording visits and reading them back.
///
/// Visits are aggregated per `(url_id, ip)`: the first visit from an address
/// creates a row with `click = 1`, later ones increment it atomically.
pub struct VisitService<R: VisitRepository> {
    repository: Arc<R>,
}

impl<R: VisitRepository> VisitService<R> {
    /// Creates a new visit service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Records one visit to `url_id` from `ip`.
    ///
    /// `ip` is stored in canonical form, so `::FFFF:10.0.0.1` and
    /// `::ffff:10.0.0.1` count as the same visitor. Geo details are kept from
    /// the first visit only.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `ip` is not an IP address.
    /// Returns [`AppError::NotFound`] if `url_id` does not exist.
    #[tracing::instrument(skip(self, details))]
    pub async fn record_visit(
        &self,
        url_id: i64,
        ip: &str,
        details: VisitDetails,
    ) -> Result<VisitMeta, AppError> {
        let ip: IpAddr = ip.trim().parse().map_err(|_| {
            AppError::bad_request("Invalid IP address", json!({ "ip": ip }))
        })?;

        let visit = NewVisit {
            url_id,
            ip: ip.to_string(),
            city: details.city.filter(|c| !c.trim().is_empty()),
            country: details.country.filter(|c| !c.trim().is_empty()),
        };

        let meta = self.repository.upsert_visit(visit).await?;

        metrics::counter!("shortlink_visits_recorded_total").increment(1);
        tracing::debug!(click = meta.click, "Visit recorded");

        Ok(meta)
    }

    /// Lists visit rows for `url_id` created within the named range.
    ///
    /// Accepted labels: `all` (or blank), `24h`, `7d`, `30d`, `60d`, `90d`,
    /// `180d`, `365d`. Rows are ordered by last visit, oldest first.
    ///
    /// Access control is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an unknown label.
    pub async fn list_visits_for_entry(
        &self,
        url_id: i64,
        range_label: &str,
    ) -> Result<Vec<VisitMeta>, AppError> {
        let range = range_label
            .parse::<DateRange>()
            .map_err(|e| AppError::bad_request(e.to_string(), json!({ "range": range_label })))?;

        self.repository
            .list_for_url(url_id, range.start_from(Utc::now()))
            .await
    }

    /// Returns the most recent visits in the principal's scope, newest first.
    ///
    /// Admins see visits to every entry, users only to their own.
    pub async fn recent_activity_log(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ActivityLogEntry>, AppError> {
        self.repository
            .recent_activity(&principal.scope(), RECENT_ACTIVITY_LIMIT)
            .await
    }
}
