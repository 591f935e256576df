use thiserror::Error;

/// Result type alias for headline store and archive operations.
pub type Result<T> = std::result::Result<T, HeadlineError>;

#[derive(Error, Debug)]
pub enum HeadlineError {
    #[error("Headline already exists: {text}")]
    Duplicate { text: String },

    #[error("Headline not found: {0}")]
    NotFound(i64),

    #[error("Invalid page request: {0}")]
    InvalidPage(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl HeadlineError {
    pub fn duplicate(text: impl Into<String>) -> Self {
        Self::Duplicate { text: text.into() }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
