//! Repository trait definitions for the domain layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`ShortUrlRepository`] - Short URL CRUD, listing, resolution and counts
//! - [`VisitRepository`] - Visit accounting and reporting queries
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod short_url_repository;
pub mod visit_repository;

pub use short_url_repository::{EntryCounts, ListFilter, Page, PageRequest, ShortUrlRepository};
pub use visit_repository::VisitRepository;

#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
#[cfg(test)]
pub use visit_repository::MockVisitRepository;
