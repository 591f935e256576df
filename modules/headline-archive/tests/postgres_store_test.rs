//! Integration tests for PgHeadlineStore against a real Postgres.
//!
//! Requirements: Docker (for Postgres via testcontainers)
//!
//! Run with: cargo test -p headline-archive --features test-utils --test postgres_store_test

#![cfg(feature = "test-utils")]

use std::sync::Arc;

use headline_archive::testutil::postgres_container;
use headline_archive::{HeadlineArchive, HeadlineError, HeadlineStore, SeedOutcome, Seeder};
use headline_classifier::{MockStanceClassifier, Normalizer, SuspiciousWordScanner};
use headline_common::{HeadlinePatch, NewHeadline, PageRequest};

fn headline(text: &str) -> NewHeadline {
    NewHeadline {
        text: text.to_string(),
        category: "Neutral".to_string(),
        score: 73.21,
        suspicious_words: vec!["leak".to_string(), "cover-up".to_string()],
    }
}

#[tokio::test]
async fn insert_roundtrips_all_fields() {
    let (_container, store) = postgres_container().await;

    let record = store.insert(headline("Leak points to cover-up")).await.unwrap();

    let found = store
        .find_by_text("Leak points to cover-up")
        .await
        .unwrap()
        .expect("record should be found by text");
    assert_eq!(found, record);
    assert_eq!(found.suspicious_words, vec!["leak", "cover-up"]);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_text_is_rejected() {
    let (_container, store) = postgres_container().await;

    store.insert(headline("Only once")).await.unwrap();
    let err = store.insert(headline("Only once")).await.unwrap_err();

    assert!(matches!(err, HeadlineError::Duplicate { .. }));
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_inserts_of_same_text_yield_one_record() {
    let (_container, store) = postgres_container().await;
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.insert(headline("Racing headline")).await })
        })
        .collect();

    let mut ok = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) if e.is_duplicate() => duplicates += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(ok, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn list_page_is_bounded_and_ordered_by_id() {
    let (_container, store) = postgres_container().await;
    for i in 0..7 {
        store.insert(headline(&format!("Headline {i}"))).await.unwrap();
    }

    let page = store
        .list_page(PageRequest::new(2, 3).unwrap())
        .await
        .unwrap();

    let texts: Vec<_> = page.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["Headline 2", "Headline 3", "Headline 4"]);
}

#[tokio::test]
async fn partial_update_leaves_other_fields() {
    let (_container, store) = postgres_container().await;
    let original = store.insert(headline("Patch me")).await.unwrap();

    let updated = store
        .update_partial(
            original.id,
            HeadlinePatch {
                category: None,
                score: Some(5.5),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.score, 5.5);
    assert_eq!(updated.category, original.category);
    assert_eq!(updated.text, original.text);
    assert_eq!(updated.suspicious_words, original.suspicious_words);
    assert_eq!(updated.created_at, original.created_at);
}

#[tokio::test]
async fn update_and_delete_of_unknown_id_are_not_found() {
    let (_container, store) = postgres_container().await;

    assert!(matches!(
        store
            .update_partial(
                99999,
                HeadlinePatch {
                    category: Some("X".to_string()),
                    score: None,
                },
            )
            .await,
        Err(HeadlineError::NotFound(99999))
    ));
    assert!(matches!(
        store.delete(99999).await,
        Err(HeadlineError::NotFound(99999))
    ));
}

#[tokio::test]
async fn seeding_populated_database_is_a_no_op() {
    let (_container, store) = postgres_container().await;
    store.insert(headline("Existing")).await.unwrap();

    let store: Arc<dyn HeadlineStore> = Arc::new(store);
    let classifier = Arc::new(MockStanceClassifier::returning("neutral", 0.5));
    let normalizer = Normalizer::new(SuspiciousWordScanner::default(), classifier.clone());
    let seeder = Seeder::new(Arc::new(HeadlineArchive::new(normalizer, store.clone())));

    let outcome = seeder.seed("/nonexistent/dataset.json").await;

    assert_eq!(outcome, SeedOutcome::Skipped { existing: 1 });
    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(classifier.call_count(), 0);
}
