use std::sync::Arc;

use tracing::info;

use headline_classifier::Normalizer;
use headline_common::{
    validate_text, HeadlineError, HeadlinePatch, HeadlineRecord, NewHeadline, PageRequest,
    Result,
};

use crate::store::HeadlineStore;

/// Classify-and-archive service: the surface the HTTP layer and the seeder call.
#[derive(Clone)]
pub struct HeadlineArchive {
    normalizer: Normalizer,
    store: Arc<dyn HeadlineStore>,
}

impl HeadlineArchive {
    pub fn new(normalizer: Normalizer, store: Arc<dyn HeadlineStore>) -> Self {
        Self { normalizer, store }
    }

    /// Classify `text` once and store the result.
    ///
    /// Known duplicates and invalid text are rejected before the classifier
    /// is called. A duplicate that slips past the lookup is still reported as
    /// `Duplicate` by the store.
    pub async fn classify_and_insert(&self, text: &str) -> Result<HeadlineRecord> {
        validate_text(text)?;

        if self.store.find_by_text(text).await?.is_some() {
            info!(chars = text.chars().count(), "Headline already archived");
            return Err(HeadlineError::duplicate(text));
        }

        let classification = self.normalizer.classify(text).await;
        let record = self
            .store
            .insert(NewHeadline::from_classification(text, classification))
            .await?;

        info!(
            id = record.id,
            category = %record.category,
            score = record.score,
            suspicious_words = record.suspicious_words.len(),
            "Headline archived"
        );
        Ok(record)
    }

    pub async fn list_page(&self, page: PageRequest) -> Result<Vec<HeadlineRecord>> {
        self.store.list_page(page).await
    }

    pub async fn update_partial(&self, id: i64, patch: HeadlinePatch) -> Result<HeadlineRecord> {
        let record = self.store.update_partial(id, patch).await?;
        info!(id, category = %record.category, score = record.score, "Headline updated");
        Ok(record)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.delete(id).await?;
        info!(id, "Headline deleted");
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        self.store.count().await
    }
}
