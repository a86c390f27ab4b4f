#![allow(dead_code)]

use sqlx::PgPool;
use std::sync::Arc;
use shortlink_store::application::services::{AuthService, ShortUrlService, VisitService};
use shortlink_store::domain::entities::{NewShortUrl, Principal, Role};
use shortlink_store::infrastructure::persistence::{PgShortUrlRepository, PgVisitRepository};

pub const TEST_SECRET: &str = "test-signing-secret";

/// Returns a verified principal, the same way a host application obtains one.
pub fn principal(user_id: &str, role: Role) -> Principal {
    let auth = AuthService::new(TEST_SECRET.to_string());
    let assertion = auth.issue(user_id, role).unwrap();
    auth.verify(&assertion).unwrap()
}

pub fn user(user_id: &str) -> Principal {
    principal(user_id, Role::User)
}

pub fn admin(user_id: &str) -> Principal {
    principal(user_id, Role::Admin)
}

pub fn new_short_url(slug: &str, target: &str) -> NewShortUrl {
    NewShortUrl {
        owner_name: "Alice".to_string(),
        target: target.to_string(),
        slug: slug.to_string(),
        active: true,
        expiration: "-1".to_string(),
        ..Default::default()
    }
}

pub async fn create_test_entry(pool: &PgPool, owner_id: &str, slug: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO short_urls (owner_id, target, slug) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(owner_id)
    .bind(format!("https://example.com/{slug}"))
    .bind(slug)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Inserts an entry whose `updated_at` lies `minutes_ago` in the past.
pub async fn create_aged_entry(pool: &PgPool, owner_id: &str, slug: &str, minutes_ago: i32) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO short_urls (owner_id, target, slug, updated_at) \
         VALUES ($1, $2, $3, NOW() - make_interval(mins => $4)) RETURNING id",
    )
    .bind(owner_id)
    .bind(format!("https://example.com/{slug}"))
    .bind(slug)
    .bind(minutes_ago)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_visit(pool: &PgPool, url_id: i64, ip: &str, days_ago: i32) {
    sqlx::query(
        "INSERT INTO url_meta (url_id, ip, created_at, updated_at) \
         VALUES ($1, $2, NOW() - make_interval(days => $3), NOW() - make_interval(days => $3))",
    )
    .bind(url_id)
    .bind(ip)
    .bind(days_ago)
    .execute(pool)
    .await
    .unwrap();
}

pub fn create_short_url_service(pool: PgPool) -> ShortUrlService<PgShortUrlRepository> {
    ShortUrlService::new(Arc::new(PgShortUrlRepository::new(Arc::new(pool))))
}

pub fn create_visit_service(pool: PgPool) -> VisitService<PgVisitRepository> {
    VisitService::new(Arc::new(PgVisitRepository::new(Arc::new(pool))))
}
