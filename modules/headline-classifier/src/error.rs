use std::time::Duration;

use thiserror::Error;

/// Failure of the stance classification capability.
///
/// Never leaves the crate boundary through [`crate::Normalizer`]; it is
/// folded into the fallback classification record there.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classifier timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Malformed verdict: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ClassifierError {
    fn from(e: reqwest::Error) -> Self {
        ClassifierError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ClassifierError {
    fn from(e: serde_json::Error) -> Self {
        ClassifierError::Malformed(e.to_string())
    }
}
