//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`ShortUrl`] - A short URL owned by a user
//! - [`ResolvedShortUrl`] - The redirect-only projection of a short URL
//! - [`VisitMeta`] - Aggregated visits from one IP to one short URL
//! - [`ActivityLogEntry`] - A visit joined with its short URL's display fields
//! - [`Principal`] - A verified caller and the [`OwnerScope`] it grants
//!
//! # Design Pattern
//!
//! Write inputs are separate structs:
//! - `NewShortUrl`, `NewVisit` - For creating new records
//! - `ShortUrlContent` - For replacing editable content

pub mod principal;
pub mod short_url;
pub mod visit_meta;

pub use principal::{OwnerScope, Principal, Role};
pub use short_url::{NewShortUrl, ResolvedShortUrl, ShortUrl, ShortUrlContent};
pub use visit_meta::{ActivityLogEntry, NewVisit, VisitDetails, VisitMeta};
