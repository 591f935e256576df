// Postgres persistence for classified headlines.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use headline_common::{
    HeadlineError, HeadlinePatch, HeadlineRecord, NewHeadline, PageRequest, Result,
};

use crate::store::HeadlineStore;

const COLUMNS: &str = "id, text, category, score, suspicious_words, created_at";

#[derive(Clone)]
pub struct PgHeadlineStore {
    pool: PgPool,
}

/// A row from the headlines table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct HeadlineRow {
    id: i64,
    text: String,
    category: String,
    score: f64,
    suspicious_words: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<HeadlineRow> for HeadlineRecord {
    fn from(row: HeadlineRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            category: row.category,
            score: row.score,
            suspicious_words: row.suspicious_words,
            created_at: row.created_at,
        }
    }
}

impl PgHeadlineStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| HeadlineError::Database(e.to_string()))?;
        Ok(())
    }
}

fn database_error(e: sqlx::Error) -> HeadlineError {
    HeadlineError::Database(e.to_string())
}

/// A unique-index conflict means another writer stored the same text first.
fn insert_error(e: sqlx::Error, text: &str) -> HeadlineError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return HeadlineError::duplicate(text);
        }
    }
    database_error(e)
}

#[async_trait]
impl HeadlineStore for PgHeadlineStore {
    async fn insert(&self, headline: NewHeadline) -> Result<HeadlineRecord> {
        headline.validate()?;

        // The unique index on text is the only duplicate check here.
        let row = sqlx::query_as::<_, HeadlineRow>(&format!(
            r#"
            INSERT INTO headlines (text, category, score, suspicious_words)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&headline.text)
        .bind(&headline.category)
        .bind(headline.score)
        .bind(&headline.suspicious_words)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(e, &headline.text))?;

        Ok(row.into())
    }

    async fn find_by_text(&self, text: &str) -> Result<Option<HeadlineRecord>> {
        let row = sqlx::query_as::<_, HeadlineRow>(&format!(
            "SELECT {COLUMNS} FROM headlines WHERE text = $1"
        ))
        .bind(text)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(Into::into))
    }

    async fn list_page(&self, page: PageRequest) -> Result<Vec<HeadlineRecord>> {
        let rows = sqlx::query_as::<_, HeadlineRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM headlines
            ORDER BY id
            OFFSET $1
            LIMIT $2
            "#
        ))
        .bind(page.skip())
        .bind(page.limit())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_partial(&self, id: i64, patch: HeadlinePatch) -> Result<HeadlineRecord> {
        let row = sqlx::query_as::<_, HeadlineRow>(&format!(
            r#"
            UPDATE headlines
            SET category = COALESCE($2, category),
                score = COALESCE($3, score)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.category)
        .bind(patch.score)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(Into::into).ok_or(HeadlineError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM headlines WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(HeadlineError::NotFound(id));
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM headlines")
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)
    }
}
