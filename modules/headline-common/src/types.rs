use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HeadlineError, Result};

/// Maximum headline length, in characters.
pub const MAX_TEXT_CHARS: usize = 500;
/// Maximum category length, in characters.
pub const MAX_CATEGORY_CHARS: usize = 50;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Category recorded when the stance classifier could not produce a verdict.
pub const CLASSIFICATION_ERROR_CATEGORY: &str = "Classification Error";

// --- Records ---

/// A classified headline as persisted in the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineRecord {
    pub id: i64,
    pub text: String,
    pub category: String,
    pub score: f64,
    pub suspicious_words: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// The classification record produced for one headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: String,
    /// Confidence percentage in [0, 100], rounded to 2 decimal places.
    pub score: f64,
    pub suspicious_words: Vec<String>,
}

impl ClassificationResult {
    /// Sentinel result used whenever the classifier fails. The lexical scan is
    /// discarded along with the verdict.
    pub fn fallback() -> Self {
        Self {
            category: CLASSIFICATION_ERROR_CATEGORY.to_string(),
            score: 0.0,
            suspicious_words: Vec::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.category == CLASSIFICATION_ERROR_CATEGORY
            && self.score == 0.0
            && self.suspicious_words.is_empty()
    }
}

/// Parameters for inserting a new headline.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHeadline {
    pub text: String,
    pub category: String,
    pub score: f64,
    pub suspicious_words: Vec<String>,
}

impl NewHeadline {
    pub fn from_classification(text: impl Into<String>, result: ClassificationResult) -> Self {
        Self {
            text: text.into(),
            category: result.category,
            score: result.score,
            suspicious_words: result.suspicious_words,
        }
    }

    /// Schema checks applied at insert time.
    pub fn validate(&self) -> Result<()> {
        validate_text(&self.text)?;
        let category_chars = self.category.chars().count();
        if category_chars > MAX_CATEGORY_CHARS {
            return Err(HeadlineError::Validation(format!(
                "category is {category_chars} characters (max {MAX_CATEGORY_CHARS})"
            )));
        }
        Ok(())
    }
}

/// Headline text must be non-empty and at most [`MAX_TEXT_CHARS`] characters.
/// Whitespace-only text is a valid headline.
pub fn validate_text(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(HeadlineError::Validation(
            "headline text must not be empty".to_string(),
        ));
    }
    let text_chars = text.chars().count();
    if text_chars > MAX_TEXT_CHARS {
        return Err(HeadlineError::Validation(format!(
            "headline text is {text_chars} characters (max {MAX_TEXT_CHARS})"
        )));
    }
    Ok(())
}

/// Manual override of a record's classification. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadlinePatch {
    pub category: Option<String>,
    pub score: Option<f64>,
}

impl HeadlinePatch {
    /// Overwrite the provided fields on `record`.
    pub fn apply(&self, record: &mut HeadlineRecord) {
        if let Some(ref category) = self.category {
            record.category = category.clone();
        }
        if let Some(score) = self.score {
            record.score = score;
        }
    }
}

// --- Pagination ---

/// Offset/limit window over the archive. Construct through [`PageRequest::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    skip: i64,
    limit: i64,
}

impl PageRequest {
    pub fn new(skip: i64, limit: i64) -> Result<Self> {
        if skip < 0 {
            return Err(HeadlineError::InvalidPage(format!(
                "skip must be >= 0 (got {skip})"
            )));
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(HeadlineError::InvalidPage(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT} (got {limit})"
            )));
        }
        Ok(Self { skip, limit })
    }

    pub fn skip(&self) -> i64 {
        self.skip
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}
