//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries are
//! runtime-checked (`query_as` + `FromRow`) so the crate builds without a live
//! database or an offline query cache.
//!
//! # Repositories
//!
//! - [`PgShortUrlRepository`] - Short URL storage, listing, resolution and counts
//! - [`PgVisitRepository`] - Visit upserts and reporting queries
//!
//! [`pool`] opens the connection pool and runs embedded migrations.

pub mod pg_short_url_repository;
pub mod pg_visit_repository;
pub mod pool;

pub use pg_short_url_repository::PgShortUrlRepository;
pub use pg_visit_repository::PgVisitRepository;
