use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use headline_common::{
    HeadlineError, HeadlinePatch, HeadlineRecord, NewHeadline, PageRequest, Result,
};

use crate::store::HeadlineStore;

/// Process-local store with the same contract as the Postgres one.
/// Ids start at 1 and are never reused.
#[derive(Default)]
pub struct InMemoryHeadlineStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    last_id: i64,
    rows: BTreeMap<i64, HeadlineRecord>,
}

impl InMemoryHeadlineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HeadlineStore for InMemoryHeadlineStore {
    async fn insert(&self, headline: NewHeadline) -> Result<HeadlineRecord> {
        headline.validate()?;

        let mut state = self.state.lock().unwrap();
        if state.rows.values().any(|r| r.text == headline.text) {
            return Err(HeadlineError::duplicate(headline.text));
        }

        state.last_id += 1;
        let record = HeadlineRecord {
            id: state.last_id,
            text: headline.text,
            category: headline.category,
            score: headline.score,
            suspicious_words: headline.suspicious_words,
            created_at: Utc::now(),
        };
        state.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_text(&self, text: &str) -> Result<Option<HeadlineRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state.rows.values().find(|r| r.text == text).cloned())
    }

    async fn list_page(&self, page: PageRequest) -> Result<Vec<HeadlineRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .rows
            .values()
            .skip(page.skip() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn update_partial(&self, id: i64, patch: HeadlinePatch) -> Result<HeadlineRecord> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .rows
            .get_mut(&id)
            .ok_or(HeadlineError::NotFound(id))?;
        patch.apply(record);
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(HeadlineError::NotFound(id))
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.state.lock().unwrap().rows.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headline(text: &str) -> NewHeadline {
        NewHeadline {
            text: text.to_string(),
            category: "Neutral".to_string(),
            score: 42.5,
            suspicious_words: vec!["leak".to_string()],
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = InMemoryHeadlineStore::new();
        let a = store.insert(headline("a")).await.unwrap();
        let b = store.insert(headline("b")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = InMemoryHeadlineStore::new();
        let a = store.insert(headline("a")).await.unwrap();
        store.delete(a.id).await.unwrap();
        let b = store.insert(headline("b")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn second_insert_of_same_text_is_duplicate() {
        let store = InMemoryHeadlineStore::new();
        store.insert(headline("same")).await.unwrap();
        let err = store.insert(headline("same")).await.unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn uniqueness_is_exact_match() {
        let store = InMemoryHeadlineStore::new();
        store.insert(headline("Same")).await.unwrap();
        store.insert(headline("same")).await.unwrap();
        store.insert(headline("same ")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn insert_rejects_oversized_text() {
        let store = InMemoryHeadlineStore::new();
        let err = store.insert(headline(&"x".repeat(501))).await.unwrap_err();
        assert!(matches!(err, HeadlineError::Validation(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_page_respects_skip_and_limit() {
        let store = InMemoryHeadlineStore::new();
        for i in 0..5 {
            store.insert(headline(&format!("h{i}"))).await.unwrap();
        }

        let page = store
            .list_page(PageRequest::new(1, 2).unwrap())
            .await
            .unwrap();
        let texts: Vec<_> = page.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["h1", "h2"]);

        let tail = store
            .list_page(PageRequest::new(4, 1000).unwrap())
            .await
            .unwrap();
        assert_eq!(tail.len(), 1);

        let past_end = store
            .list_page(PageRequest::new(10, 10).unwrap())
            .await
            .unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn update_overwrites_only_given_fields() {
        let store = InMemoryHeadlineStore::new();
        let original = store.insert(headline("x")).await.unwrap();

        let updated = store
            .update_partial(
                original.id,
                HeadlinePatch {
                    category: Some("X".to_string()),
                    score: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.category, "X");
        assert_eq!(updated.score, original.score);
        assert_eq!(updated.text, original.text);
        assert_eq!(updated.suspicious_words, original.suspicious_words);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[tokio::test]
    async fn update_does_not_revalidate() {
        let store = InMemoryHeadlineStore::new();
        let original = store.insert(headline("x")).await.unwrap();
        let updated = store
            .update_partial(
                original.id,
                HeadlinePatch {
                    category: Some("c".repeat(80)),
                    score: Some(250.0),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.category.len(), 80);
        assert_eq!(updated.score, 250.0);
    }

    #[tokio::test]
    async fn update_and_delete_of_unknown_id_are_not_found() {
        let store = InMemoryHeadlineStore::new();
        assert!(matches!(
            store.update_partial(99999, HeadlinePatch::default()).await,
            Err(HeadlineError::NotFound(99999))
        ));
        assert!(matches!(
            store.delete(99999).await,
            Err(HeadlineError::NotFound(99999))
        ));
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let store = InMemoryHeadlineStore::new();
        let r = store.insert(headline("gone")).await.unwrap();
        store.delete(r.id).await.unwrap();
        assert!(store.delete(r.id).await.unwrap_err().is_not_found());
        assert!(store.find_by_text("gone").await.unwrap().is_none());
    }
}
