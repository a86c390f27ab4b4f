//! Aggregated visit metadata for one (short URL, visitor IP) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Visits from a single IP to a single short URL.
///
/// There is at most one row per `(url_id, ip)`; `click` counts how many times
/// that visitor resolved the link.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitMeta {
    pub id: i64,
    pub url_id: i64,
    pub ip: String,
    pub click: i32,
    pub city: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional geo details attached to the first visit from an IP.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitDetails {
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Input for recording a visit.
///
/// `ip` is expected in canonical textual form; see
/// [`crate::application::services::VisitService::record_visit`].
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub url_id: i64,
    pub ip: String,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// A visit row enriched with display fields from its short URL.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityLogEntry {
    pub ip: String,
    pub click: i32,
    pub city: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub slug: String,
    pub target: String,
    pub title: String,
    pub description: String,
    pub image: String,
}
