// Stance classification: trait boundary + non-network implementations.
//
// The normalizer calls this without knowing which model answers. Production
// wires in the Claude-backed classifier; tests use MockStanceClassifier.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// The single best label for a text and the classifier's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceLabel {
    pub label: String,
    /// In [0, 1].
    pub confidence: f64,
}

impl StanceLabel {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// A frozen, external text classifier.
///
/// Implementations own any input-length limit and must truncate the text
/// themselves; callers always pass the full headline.
#[async_trait]
pub trait StanceClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<StanceLabel, ClassifierError>;
}

// ---------------------------------------------------------------------------
// UnavailableClassifier
// ---------------------------------------------------------------------------

/// Stands in when no model is configured. Every call fails, so every headline
/// is archived with the fallback classification.
#[derive(Debug, Clone)]
pub struct UnavailableClassifier {
    reason: String,
}

impl UnavailableClassifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl StanceClassifier for UnavailableClassifier {
    async fn classify(&self, _text: &str) -> Result<StanceLabel, ClassifierError> {
        Err(ClassifierError::Unavailable(self.reason.clone()))
    }
}

// ---------------------------------------------------------------------------
// MockStanceClassifier (for tests)
// ---------------------------------------------------------------------------

enum Script {
    Verdict(StanceLabel),
    Fail(String),
}

/// Returns a scripted verdict and records every text it was asked about.
pub struct MockStanceClassifier {
    script: Script,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockStanceClassifier {
    pub fn returning(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            script: Script::Verdict(StanceLabel::new(label, confidence)),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            script: Script::Fail(reason.into()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl StanceClassifier for MockStanceClassifier {
    async fn classify(&self, text: &str) -> Result<StanceLabel, ClassifierError> {
        self.calls.lock().unwrap().push(text.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Verdict(label) => Ok(label.clone()),
            Script::Fail(reason) => Err(ClassifierError::Api(reason.clone())),
        }
    }
}
