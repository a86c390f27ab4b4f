//! PostgreSQL implementation of the short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::{
    NewShortUrl, OwnerScope, ResolvedShortUrl, ShortUrl, ShortUrlContent,
};
use crate::domain::repositories::{EntryCounts, ListFilter, Page, PageRequest, ShortUrlRepository};
use crate::error::AppError;

macro_rules! short_url_columns {
    () => {
        "id, owner_id, owner_name, target, slug, prefix, title, description, image, \
         visible, active, expiration, password, created_at, updated_at"
    };
}

#[derive(sqlx::FromRow)]
struct ShortUrlRow {
    id: i64,
    owner_id: String,
    owner_name: String,
    target: String,
    slug: String,
    prefix: String,
    title: String,
    description: String,
    image: String,
    visible: bool,
    active: bool,
    expiration: String,
    password: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShortUrlRow> for ShortUrl {
    fn from(r: ShortUrlRow) -> Self {
        ShortUrl {
            id: r.id,
            owner_id: r.owner_id,
            owner_name: r.owner_name,
            target: r.target,
            slug: r.slug,
            prefix: r.prefix,
            title: r.title,
            description: r.description,
            image: r.image,
            visible: r.visible,
            active: r.active,
            expiration: r.expiration,
            password: r.password,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ResolvedRow {
    id: i64,
    target: String,
    title: String,
    description: String,
    image: String,
    active: bool,
    prefix: String,
    expiration: String,
    password: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<ResolvedRow> for ResolvedShortUrl {
    fn from(r: ResolvedRow) -> Self {
        ResolvedShortUrl {
            id: r.id,
            target: r.target,
            title: r.title,
            description: r.description,
            image: r.image,
            active: r.active,
            prefix: r.prefix,
            expiration: r.expiration,
            password: r.password,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for short URLs.
///
/// Scope arguments are bound as `$n::text IS NULL OR owner_id = $n`, so a single
/// statement serves both admin and per-owner callers.
pub struct PgShortUrlRepository {
    pool: Arc<PgPool>,
}

impl PgShortUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Appends ownership and substring conditions to a query ending in `WHERE TRUE`.
fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, scope: &OwnerScope, filter: &ListFilter) {
    if let Some(owner_id) = scope.owner_id() {
        builder.push(" AND owner_id = ").push_bind(owner_id.to_string());
    }

    // strpos is case-sensitive and needs no LIKE escaping.
    for (column, needle) in filter.active_filters() {
        builder
            .push(" AND strpos(")
            .push(column)
            .push(", ")
            .push_bind(needle.to_string())
            .push(") > 0");
    }
}

#[async_trait]
impl ShortUrlRepository for PgShortUrlRepository {
    async fn create(&self, owner_id: &str, new_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(concat!(
            "INSERT INTO short_urls (owner_id, owner_name, target, slug, prefix, title, \
             description, image, visible, active, expiration, password, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW(), NOW()) \
             RETURNING ",
            short_url_columns!()
        ))
        .bind(owner_id)
        .bind(new_url.owner_name)
        .bind(new_url.target)
        .bind(new_url.slug)
        .bind(new_url.prefix)
        .bind(new_url.title)
        .bind(new_url.description)
        .bind(new_url.image)
        .bind(new_url.visible)
        .bind(new_url.active)
        .bind(new_url.expiration)
        .bind(new_url.password)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn update_content(
        &self,
        owner_id: &str,
        id: i64,
        content: ShortUrlContent,
    ) -> Result<Option<ShortUrl>, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(concat!(
            "UPDATE short_urls SET target = $3, slug = $4, prefix = $5, title = $6, \
             description = $7, image = $8, visible = $9, expiration = $10, password = $11, \
             updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING ",
            short_url_columns!()
        ))
        .bind(id)
        .bind(owner_id)
        .bind(content.target)
        .bind(content.slug)
        .bind(content.prefix)
        .bind(content.title)
        .bind(content.description)
        .bind(content.image)
        .bind(content.visible)
        .bind(content.expiration)
        .bind(content.password)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn set_active(
        &self,
        scope: &OwnerScope,
        id: i64,
        active: bool,
    ) -> Result<Option<ShortUrl>, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(concat!(
            "UPDATE short_urls SET active = $3, updated_at = NOW() \
             WHERE id = $1 AND ($2::text IS NULL OR owner_id = $2) \
             RETURNING ",
            short_url_columns!()
        ))
        .bind(id)
        .bind(scope.owner_id())
        .bind(active)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn set_visible(
        &self,
        scope: &OwnerScope,
        id: i64,
        visible: bool,
    ) -> Result<Option<ShortUrl>, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(concat!(
            "UPDATE short_urls SET visible = $3, updated_at = NOW() \
             WHERE id = $1 AND ($2::text IS NULL OR owner_id = $2) \
             RETURNING ",
            short_url_columns!()
        ))
        .bind(id)
        .bind(scope.owner_id())
        .bind(visible)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, owner_id: &str, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM short_urls WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        scope: &OwnerScope,
        filter: &ListFilter,
        page: PageRequest,
    ) -> Result<Page<ShortUrl>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM short_urls WHERE TRUE");
        push_conditions(&mut count_query, scope, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&mut *tx)
            .await?;

        let mut list_query = QueryBuilder::<Postgres>::new(concat!(
            "SELECT ",
            short_url_columns!(),
            " FROM short_urls WHERE TRUE"
        ));
        push_conditions(&mut list_query, scope, filter);
        list_query
            .push(" ORDER BY updated_at DESC, id DESC LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows: Vec<ShortUrlRow> = list_query.build_query_as().fetch_all(&mut *tx).await?;

        tx.commit().await?;

        Ok(Page {
            total,
            list: rows.into_iter().map(Into::into).collect(),
        })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ResolvedShortUrl>, AppError> {
        let row = sqlx::query_as::<_, ResolvedRow>(
            r#"
            SELECT id, target, title, description, image, active, prefix, expiration,
                   password, updated_at
            FROM short_urls
            WHERE slug = $1
            LIMIT 1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn count(
        &self,
        scope: &OwnerScope,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<EntryCounts, AppError> {
        // One statement, one snapshot.
        let (total, month_total) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE created_at >= $2 AND created_at < $3)
            FROM short_urls
            WHERE ($1::text IS NULL OR owner_id = $1)
            "#,
        )
        .bind(scope.owner_id())
        .bind(since)
        .bind(until)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(EntryCounts { total, month_total })
    }
}
