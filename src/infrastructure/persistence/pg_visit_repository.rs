//! PostgreSQL implementation of the visit repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{ActivityLogEntry, NewVisit, OwnerScope, VisitMeta};
use crate::domain::repositories::VisitRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct VisitRow {
    id: i64,
    url_id: i64,
    ip: String,
    click: i32,
    city: Option<String>,
    country: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VisitRow> for VisitMeta {
    fn from(r: VisitRow) -> Self {
        VisitMeta {
            id: r.id,
            url_id: r.url_id,
            ip: r.ip,
            click: r.click,
            city: r.city,
            country: r.country,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    ip: String,
    click: i32,
    city: Option<String>,
    country: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    slug: String,
    target: String,
    title: String,
    description: String,
    image: String,
}

impl From<ActivityRow> for ActivityLogEntry {
    fn from(r: ActivityRow) -> Self {
        ActivityLogEntry {
            ip: r.ip,
            click: r.click,
            city: r.city,
            country: r.country,
            created_at: r.created_at,
            updated_at: r.updated_at,
            slug: r.slug,
            target: r.target,
            title: r.title,
            description: r.description,
            image: r.image,
        }
    }
}

/// PostgreSQL repository for visit accounting.
///
/// Relies on the `url_meta_url_id_ip_key` unique constraint: the upsert turns a
/// concurrent duplicate insert into an increment instead of a second row.
pub struct PgVisitRepository {
    pool: Arc<PgPool>,
}

impl PgVisitRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitRepository for PgVisitRepository {
    async fn upsert_visit(&self, visit: NewVisit) -> Result<VisitMeta, AppError> {
        let row = sqlx::query_as::<_, VisitRow>(
            r#"
            INSERT INTO url_meta (url_id, ip, city, country)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT ON CONSTRAINT url_meta_url_id_ip_key
            DO UPDATE SET click = url_meta.click + 1, updated_at = NOW()
            RETURNING id, url_id, ip, click, city, country, created_at, updated_at
            "#,
        )
        .bind(visit.url_id)
        .bind(visit.ip)
        .bind(visit.city)
        .bind(visit.country)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_for_url(
        &self,
        url_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<VisitMeta>, AppError> {
        let rows = sqlx::query_as::<_, VisitRow>(
            r#"
            SELECT id, url_id, ip, click, city, country, created_at, updated_at
            FROM url_meta
            WHERE url_id = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
            ORDER BY updated_at ASC, id ASC
            "#,
        )
        .bind(url_id)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn recent_activity(
        &self,
        scope: &OwnerScope,
        limit: i64,
    ) -> Result<Vec<ActivityLogEntry>, AppError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT
                m.ip, m.click, m.city, m.country, m.created_at, m.updated_at,
                s.slug, s.target, s.title, s.description, s.image
            FROM url_meta m
            INNER JOIN short_urls s ON s.id = m.url_id
            WHERE ($1::text IS NULL OR s.owner_id = $1)
            ORDER BY m.updated_at DESC, m.id DESC
            LIMIT $2
            "#,
        )
        .bind(scope.owner_id())
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
