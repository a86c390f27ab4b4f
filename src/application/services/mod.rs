//! Business logic services for the application layer.

pub mod auth_service;
pub mod short_url_service;
pub mod visit_service;

pub use auth_service::AuthService;
pub use short_url_service::{ListQuery, ShortUrlService};
pub use visit_service::{RECENT_ACTIVITY_LIMIT, VisitService};
