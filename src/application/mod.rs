//! Application layer services implementing business logic.
//!
//! Services validate input, apply ownership rules and delegate to repository
//! traits. Callers obtain a [`crate::domain::entities::Principal`] from
//! [`services::AuthService::verify`] and pass it to every scoped operation.
//!
//! # Available Services
//!
//! - [`services::short_url_service::ShortUrlService`] - Short URL management, listing and resolution
//! - [`services::visit_service::VisitService`] - Visit recording and reporting
//! - [`services::auth_service::AuthService`] - Principal assertion signing and verification

pub mod services;
