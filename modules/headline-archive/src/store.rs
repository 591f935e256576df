use async_trait::async_trait;

use headline_common::{HeadlinePatch, HeadlineRecord, NewHeadline, PageRequest, Result};

/// Persistence boundary for classified headlines.
///
/// Every implementation upholds the same contract:
/// - `insert` validates the schema limits, then fails with
///   `HeadlineError::Duplicate` when a record with identical text exists.
///   The exact-text lookup is a fast path; the storage layer must enforce
///   uniqueness itself and report a conflict as the same error.
/// - `update_partial` and `delete` fail with `HeadlineError::NotFound` for an
///   unknown id. Updates overwrite only the provided fields and are not
///   re-validated.
/// - `list_page` never returns more than `page.limit()` records.
///
/// No in-process locking: concurrent writers are resolved by the storage layer.
#[async_trait]
pub trait HeadlineStore: Send + Sync {
    async fn insert(&self, headline: NewHeadline) -> Result<HeadlineRecord>;

    async fn find_by_text(&self, text: &str) -> Result<Option<HeadlineRecord>>;

    async fn list_page(&self, page: PageRequest) -> Result<Vec<HeadlineRecord>>;

    async fn update_partial(&self, id: i64, patch: HeadlinePatch) -> Result<HeadlineRecord>;

    async fn delete(&self, id: i64) -> Result<()>;

    async fn count(&self) -> Result<i64>;
}
