//! Short URL entity and its write-side inputs.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Owner name stored when the creator did not supply one.
pub const ANONYMOUS_OWNER: &str = "Anonymous";

/// Expiration policy meaning "never expires".
pub const NEVER_EXPIRES: &str = "-1";

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("slug pattern is valid"));

/// A short URL owned by a user.
///
/// `slug` is the public path segment; `target` is where it redirects. `owner_id`
/// never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortUrl {
    pub id: i64,
    pub owner_id: String,
    pub owner_name: String,
    pub target: String,
    pub slug: String,
    pub prefix: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub visible: bool,
    pub active: bool,
    pub expiration: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShortUrl {
    /// Returns true if resolving this entry requires a password.
    pub fn requires_password(&self) -> bool {
        self.password.is_some()
    }
}

/// Projection returned by public slug resolution.
///
/// Carries only what a redirect needs; owner identity is deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedShortUrl {
    pub id: i64,
    pub target: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub active: bool,
    pub prefix: String,
    pub expiration: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ResolvedShortUrl {
    pub fn requires_password(&self) -> bool {
        self.password.is_some()
    }

    /// Checks the expiration policy against `now`.
    ///
    /// `"-1"` or blank never expires. Any other value is a number of seconds
    /// counted from the last update. Unparseable policies are treated as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let policy = self.expiration.trim();
        if policy.is_empty() || policy == NEVER_EXPIRES {
            return false;
        }

        match policy.parse::<i64>() {
            // Out-of-range durations never elapse.
            Ok(seconds) if seconds >= 0 => Duration::try_seconds(seconds)
                .and_then(|d| self.updated_at.checked_add_signed(d))
                .is_some_and(|deadline| now >= deadline),
            _ => true,
        }
    }

    /// Returns true if the entry is active and not expired.
    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.is_expired_at(now)
    }
}

/// Input for creating a short URL.
///
/// The owner is taken from the verified principal, never from this struct.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewShortUrl {
    #[serde(default)]
    #[validate(length(max = 128))]
    pub owner_name: String,
    #[validate(url, length(max = 2048))]
    pub target: String,
    #[validate(length(min = 1, max = 64), regex(path = *SLUG_PATTERN))]
    pub slug: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub prefix: String,
    #[serde(default)]
    #[validate(length(max = 256))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub image: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "default_expiration")]
    #[validate(length(max = 32))]
    pub expiration: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Editable content of an existing short URL.
///
/// `active` is intentionally absent; it changes only through the dedicated
/// active-flag operation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ShortUrlContent {
    #[validate(url, length(max = 2048))]
    pub target: String,
    #[validate(length(min = 1, max = 64), regex(path = *SLUG_PATTERN))]
    pub slug: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub prefix: String,
    #[serde(default)]
    #[validate(length(max = 256))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub image: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default = "default_expiration")]
    #[validate(length(max = 32))]
    pub expiration: String,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_active() -> bool {
    true
}

fn default_expiration() -> String {
    NEVER_EXPIRES.to_string()
}

/// Maps a blank password to `None`.
pub fn normalize_password(password: Option<String>) -> Option<String> {
    password.filter(|p| !p.trim().is_empty())
}

/// Returns the owner name to store, falling back to [`ANONYMOUS_OWNER`].
pub fn normalize_owner_name(owner_name: &str) -> String {
    let trimmed = owner_name.trim();
    if trimmed.is_empty() {
        ANONYMOUS_OWNER.to_string()
    } else {
        trimmed.to_string()
    }
}
