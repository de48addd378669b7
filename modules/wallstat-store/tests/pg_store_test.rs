//! Integration tests for PgStore.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use wallstat_common::{NewGroup, NewPost};
use wallstat_store::{GroupStore, PgStore, StoreError};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

async fn test_store() -> Option<PgStore> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let store = PgStore::connect(&url, 5).await.ok()?;
    store.migrate().await.ok()?;
    Some(store)
}

/// Tests share one database; every test works on its own domain.
fn unique_domain(prefix: &str) -> String {
    format!(
        "{prefix}_{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn upsert_is_idempotent_per_domain() {
    let Some(store) = test_store().await else {
        return;
    };
    let domain = unique_domain("upsert");

    let first = store
        .upsert_group(
            &NewGroup::builder()
                .domain(domain.as_str())
                .name("First")
                .subscribers(10)
                .parsed_at(Utc::now())
                .build(),
        )
        .await
        .unwrap();
    let second = store
        .upsert_group(&NewGroup::builder().domain(domain.as_str()).subscribers(20).build())
        .await
        .unwrap();

    assert_eq!(first, second);
    let group = store.find_group_by_domain(&domain).await.unwrap().unwrap();
    assert_eq!(group.subscribers, 20);
    assert_eq!(group.name.as_deref(), Some("First"));
    assert!(group.parsed_at.is_some());
}

#[tokio::test]
async fn duplicate_post_key_is_skipped() {
    let Some(store) = test_store().await else {
        return;
    };
    let gid = store
        .upsert_group(&NewGroup::builder().domain(unique_domain("dedup")).build())
        .await
        .unwrap();

    let post = NewPost::builder()
        .group_id(gid)
        .date(day(4))
        .text("a long body ".repeat(1000))
        .likes(5)
        .build();

    assert!(store.insert_post(&post).await.unwrap().is_some());
    assert!(store.insert_post(&post).await.unwrap().is_none());
    assert!(store.find_post_by_key(post.key()).await.unwrap().is_some());
    assert_eq!(store.find_posts_by_group(gid).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_inserts_of_one_key_store_one_row() {
    let Some(store) = test_store().await else {
        return;
    };
    let store = Arc::new(store);
    let gid = store
        .upsert_group(&NewGroup::builder().domain(unique_domain("race")).build())
        .await
        .unwrap();

    let post = NewPost::builder().group_id(gid).date(day(4)).text("race").build();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            let post = post.clone();
            tokio::spawn(async move { store.insert_post(&post).await })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_some() {
            inserted += 1;
        }
    }

    assert_eq!(inserted, 1);
    assert_eq!(store.find_posts_by_group(gid).await.unwrap().len(), 1);
}

#[tokio::test]
async fn post_for_missing_group_is_unknown_group() {
    let Some(store) = test_store().await else {
        return;
    };
    let post = NewPost::builder().group_id(i64::MAX).date(day(4)).text("orphan").build();

    assert!(matches!(
        store.insert_post(&post).await,
        Err(StoreError::UnknownGroup(id)) if id == i64::MAX
    ));
}
