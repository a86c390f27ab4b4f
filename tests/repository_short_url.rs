mod common;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use shortlink_store::AppError;
use shortlink_store::domain::entities::{OwnerScope, ShortUrlContent};
use shortlink_store::domain::repositories::{ListFilter, PageRequest, ShortUrlRepository};
use shortlink_store::infrastructure::persistence::PgShortUrlRepository;
use shortlink_store::utils::date_range::month_window;

#[sqlx::test]
async fn test_create_then_resolve(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let mut new_url = common::new_short_url("launch", "https://example.com/launch");
    new_url.password = Some("hunter2".to_string());

    let created = repo.create("user-1", new_url).await.unwrap();
    assert_eq!(created.owner_id, "user-1");
    assert_eq!(created.slug, "launch");
    assert!(created.active);
    assert!(!created.visible);

    let resolved = repo.find_by_slug("launch").await.unwrap().unwrap();
    assert_eq!(resolved.id, created.id);
    assert_eq!(resolved.target, "https://example.com/launch");
    assert_eq!(resolved.expiration, "-1");
    assert!(resolved.requires_password());
}

#[sqlx::test]
async fn test_column_defaults(pool: PgPool) {
    common::create_test_entry(&pool, "user-1", "bare").await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let page = repo
        .list(
            &OwnerScope::Owner("user-1".to_string()),
            &ListFilter::default(),
            PageRequest { page: 1, size: 10 },
        )
        .await
        .unwrap();

    let entry = &page.list[0];
    assert_eq!(entry.owner_name, "Anonymous");
    assert_eq!(entry.expiration, "-1");
    assert!(entry.active);
    assert!(!entry.visible);
    assert!(entry.password.is_none());
}

#[sqlx::test]
async fn test_duplicate_slug_is_conflict(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    repo.create("user-1", common::new_short_url("dup", "https://a.example/"))
        .await
        .unwrap();
    let result = repo
        .create("user-2", common::new_short_url("dup", "https://b.example/"))
        .await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
async fn test_find_by_slug_not_found(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let result = repo.find_by_slug("missing").await;

    assert!(result.is_ok());
    assert!(result.unwrap().is_none());
}

#[sqlx::test]
async fn test_update_content_requires_owner(pool: PgPool) {
    let id = common::create_test_entry(&pool, "user-1", "mine").await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let content = ShortUrlContent {
        target: "https://example.org/".to_string(),
        slug: "renamed".to_string(),
        title: "Renamed".to_string(),
        expiration: "3600".to_string(),
        ..Default::default()
    };

    let foreign = repo.update_content("user-2", id, content.clone()).await.unwrap();
    assert!(foreign.is_none());

    let updated = repo.update_content("user-1", id, content).await.unwrap().unwrap();
    assert_eq!(updated.slug, "renamed");
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.expiration, "3600");
    assert!(updated.active);
}

#[sqlx::test]
async fn test_set_active_cross_tenant(pool: PgPool) {
    let id = common::create_test_entry(&pool, "user-1", "flag").await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let foreign = repo
        .set_active(&OwnerScope::Owner("user-2".to_string()), id, false)
        .await
        .unwrap();
    assert!(foreign.is_none());

    let unchanged = repo.find_by_slug("flag").await.unwrap().unwrap();
    assert!(unchanged.active);

    let by_admin = repo
        .set_active(&OwnerScope::All, id, false)
        .await
        .unwrap()
        .unwrap();
    assert!(!by_admin.active);
    assert_eq!(by_admin.owner_id, "user-1");
}

#[sqlx::test]
async fn test_mutations_advance_updated_at(pool: PgPool) {
    let id = common::create_aged_entry(&pool, "user-1", "stale", 30).await;
    let (created_at, seeded_updated_at): (DateTime<Utc>, DateTime<Utc>) =
        sqlx::query_as("SELECT created_at, updated_at FROM short_urls WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    let repo = PgShortUrlRepository::new(Arc::new(pool));
    let scope = OwnerScope::Owner("user-1".to_string());

    let content = ShortUrlContent {
        target: "https://example.com/fresh".to_string(),
        slug: "stale".to_string(),
        expiration: "-1".to_string(),
        ..Default::default()
    };
    let edited = repo.update_content("user-1", id, content).await.unwrap().unwrap();
    let toggled = repo.set_active(&scope, id, false).await.unwrap().unwrap();
    let shown = repo.set_visible(&scope, id, true).await.unwrap().unwrap();

    for entry in [&edited, &toggled, &shown] {
        assert!(entry.updated_at > seeded_updated_at);
        assert_eq!(entry.created_at, created_at);
        assert_eq!(entry.owner_id, "user-1");
    }
    assert!(toggled.updated_at >= edited.updated_at);
    assert!(shown.updated_at >= toggled.updated_at);
}

#[sqlx::test]
async fn test_set_visible(pool: PgPool) {
    let id = common::create_test_entry(&pool, "user-1", "shown").await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let foreign = repo
        .set_visible(&OwnerScope::Owner("user-2".to_string()), id, true)
        .await
        .unwrap();
    assert!(foreign.is_none());

    let updated = repo
        .set_visible(&OwnerScope::Owner("user-1".to_string()), id, true)
        .await
        .unwrap()
        .unwrap();
    assert!(updated.visible);
}

#[sqlx::test]
async fn test_delete_cascades_visits(pool: PgPool) {
    let id = common::create_test_entry(&pool, "user-1", "gone").await;
    common::create_test_visit(&pool, id, "10.0.0.1", 0).await;
    let repo = PgShortUrlRepository::new(Arc::new(pool.clone()));

    assert!(!repo.delete("user-2", id).await.unwrap());
    assert!(repo.delete("user-1", id).await.unwrap());
    assert!(repo.find_by_slug("gone").await.unwrap().is_none());

    let visits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_meta WHERE url_id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(visits, 0);
}

#[sqlx::test]
async fn test_list_order_and_pagination(pool: PgPool) {
    common::create_aged_entry(&pool, "user-1", "oldest", 30).await;
    common::create_aged_entry(&pool, "user-1", "middle", 20).await;
    common::create_aged_entry(&pool, "user-1", "newest", 10).await;
    common::create_aged_entry(&pool, "user-2", "foreign", 5).await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));
    let scope = OwnerScope::Owner("user-1".to_string());

    let first = repo
        .list(&scope, &ListFilter::default(), PageRequest { page: 1, size: 2 })
        .await
        .unwrap();
    assert_eq!(first.total, 3);
    let slugs: Vec<_> = first.list.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, ["newest", "middle"]);

    let second = repo
        .list(&scope, &ListFilter::default(), PageRequest { page: 2, size: 2 })
        .await
        .unwrap();
    assert_eq!(second.total, 3);
    assert_eq!(second.list.len(), 1);
    assert_eq!(second.list[0].slug, "oldest");

    let beyond = repo
        .list(&scope, &ListFilter::default(), PageRequest { page: 5, size: 2 })
        .await
        .unwrap();
    assert_eq!(beyond.total, 3);
    assert!(beyond.list.is_empty());
}

#[sqlx::test]
async fn test_list_admin_sees_all(pool: PgPool) {
    common::create_test_entry(&pool, "user-1", "a1").await;
    common::create_test_entry(&pool, "user-2", "b1").await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let page = repo
        .list(&OwnerScope::All, &ListFilter::default(), PageRequest { page: 1, size: 10 })
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.list.len(), 2);
}

#[sqlx::test]
async fn test_list_substring_filters(pool: PgPool) {
    sqlx::query(
        "INSERT INTO short_urls (owner_id, target, slug, title) VALUES \
         ('user-1', 'https://docs.example.com/guide', 'guide', 'Getting Started Guide'), \
         ('user-1', 'https://blog.example.com/post', 'post', 'Release notes'), \
         ('user-1', 'https://docs.example.com/api', 'api', 'API reference')",
    )
    .execute(&pool)
    .await
    .unwrap();
    let repo = PgShortUrlRepository::new(Arc::new(pool));
    let scope = OwnerScope::Owner("user-1".to_string());
    let page = PageRequest { page: 1, size: 10 };

    let docs = ListFilter {
        target: "docs.example".to_string(),
        ..Default::default()
    };
    let result = repo.list(&scope, &docs, page).await.unwrap();
    assert_eq!(result.total, 2);

    let combined = ListFilter {
        target: "docs.example".to_string(),
        title: "Guide".to_string(),
        ..Default::default()
    };
    let result = repo.list(&scope, &combined, page).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.list[0].slug, "guide");

    // Case-sensitive and wildcard characters are literal.
    let lower = ListFilter {
        title: "guide".to_string(),
        ..Default::default()
    };
    assert_eq!(repo.list(&scope, &lower, page).await.unwrap().total, 0);

    let wildcard = ListFilter {
        title: "%".to_string(),
        ..Default::default()
    };
    assert_eq!(repo.list(&scope, &wildcard, page).await.unwrap().total, 0);
}

#[sqlx::test]
async fn test_count_with_no_entries(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));
    let (since, until) = month_window(Utc::now());

    let counts = repo
        .count(&OwnerScope::Owner("nobody".to_string()), since, until)
        .await
        .unwrap();

    assert_eq!(counts.total, 0);
    assert_eq!(counts.month_total, 0);
}

#[sqlx::test]
async fn test_count_month_window(pool: PgPool) {
    common::create_test_entry(&pool, "user-1", "this-month").await;
    sqlx::query(
        "INSERT INTO short_urls (owner_id, target, slug, created_at) \
         VALUES ('user-1', 'https://example.com/', 'last-year', NOW() - INTERVAL '400 days')",
    )
    .execute(&pool)
    .await
    .unwrap();
    common::create_test_entry(&pool, "user-2", "other-owner").await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let now = Utc::now();
    let (since, until) = month_window(now);
    assert!(since <= now && now < until && until - since <= Duration::days(31));

    let own = repo
        .count(&OwnerScope::Owner("user-1".to_string()), since, until)
        .await
        .unwrap();
    assert_eq!(own.total, 2);
    assert_eq!(own.month_total, 1);

    let all = repo.count(&OwnerScope::All, since, until).await.unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.month_total, 2);
}
