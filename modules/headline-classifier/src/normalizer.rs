use std::sync::Arc;
use std::time::Duration;

use headline_common::ClassificationResult;
use tracing::warn;

use crate::error::ClassifierError;
use crate::lexical::SuspiciousWordScanner;
use crate::stance::{StanceClassifier, StanceLabel};

/// Combines the lexical scan and the stance verdict into one classification record.
///
/// Holds the long-lived classifier handle built at startup. `classify` never
/// fails: any classifier error, including a timeout, yields
/// [`ClassificationResult::fallback`].
#[derive(Clone)]
pub struct Normalizer {
    scanner: SuspiciousWordScanner,
    classifier: Arc<dyn StanceClassifier>,
    timeout: Option<Duration>,
}

impl Normalizer {
    pub fn new(scanner: SuspiciousWordScanner, classifier: Arc<dyn StanceClassifier>) -> Self {
        Self {
            scanner,
            classifier,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn classify(&self, text: &str) -> ClassificationResult {
        let suspicious_words = self.scanner.scan(text);
        let outcome = self.stance(text).await;

        if let Err(ref e) = outcome {
            warn!(
                error = %e,
                chars = text.chars().count(),
                "Stance classification failed, using fallback"
            );
        }

        normalize(suspicious_words, outcome)
    }

    async fn stance(&self, text: &str) -> Result<StanceLabel, ClassifierError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.classifier.classify(text))
                .await
                .unwrap_or(Err(ClassifierError::Timeout(limit))),
            None => self.classifier.classify(text).await,
        }
    }
}

/// Build the classification record from a scan and a classifier outcome.
///
/// On failure the scan is discarded along with the verdict.
pub fn normalize(
    suspicious_words: Vec<String>,
    outcome: Result<StanceLabel, ClassifierError>,
) -> ClassificationResult {
    match outcome {
        Ok(stance) => ClassificationResult {
            category: capitalize_first(&stance.label),
            score: round2(stance.confidence * 100.0),
            suspicious_words,
        },
        Err(_) => ClassificationResult::fallback(),
    }
}

/// Upper-case the first character, leave the rest untouched.
fn capitalize_first(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stance::{MockStanceClassifier, UnavailableClassifier};

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn capitalizes_only_the_first_letter() {
        assert_eq!(capitalize_first("neutral"), "Neutral");
        assert_eq!(capitalize_first("cONTRADICTION"), "CONTRADICTION");
        assert_eq!(capitalize_first("élite"), "Élite");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round2(87.314), 87.31);
        assert_eq!(round2(87.316), 87.32);
        assert_eq!(round2(100.0), 100.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn success_scales_confidence_to_percentage() {
        let result = normalize(
            words(&["secret"]),
            Ok(StanceLabel::new("sensational", 0.873_14)),
        );
        assert_eq!(result.category, "Sensational");
        assert_eq!(result.score, 87.31);
        assert_eq!(result.suspicious_words, vec!["secret"]);
    }

    #[test]
    fn failure_discards_the_scan() {
        let result = normalize(
            words(&["hoax", "leak"]),
            Err(ClassifierError::Api("down".to_string())),
        );
        assert_eq!(result, ClassificationResult::fallback());
    }

    #[tokio::test]
    async fn classify_combines_scan_and_verdict() {
        let mock = Arc::new(MockStanceClassifier::returning("conspiratorial", 0.9));
        let normalizer = Normalizer::new(SuspiciousWordScanner::default(), mock.clone());

        let result = normalizer.classify("Secret government project revealed!").await;

        assert_eq!(result.category, "Conspiratorial");
        assert_eq!(result.score, 90.0);
        assert_eq!(result.suspicious_words, vec!["secret"]);
        assert_eq!(mock.calls(), vec!["Secret government project revealed!"]);
    }

    #[tokio::test]
    async fn classify_passes_untruncated_text() {
        let mock = Arc::new(MockStanceClassifier::returning("neutral", 0.5));
        let normalizer = Normalizer::new(SuspiciousWordScanner::default(), mock.clone());
        let long = "word ".repeat(2_000);

        normalizer.classify(&long).await;

        assert_eq!(mock.calls()[0], long);
    }

    #[tokio::test]
    async fn failing_classifier_always_yields_fallback() {
        let normalizer = Normalizer::new(
            SuspiciousWordScanner::default(),
            Arc::new(UnavailableClassifier::new("no model")),
        );

        for text in [
            "Hoax exposed: the hidden agenda behind the leak",
            "City council approves new park budget",
            "secret",
        ] {
            assert_eq!(
                normalizer.classify(text).await,
                ClassificationResult::fallback()
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_classifier_times_out_into_fallback() {
        let mock = Arc::new(
            MockStanceClassifier::returning("neutral", 0.99).with_delay(Duration::from_secs(60)),
        );
        let normalizer = Normalizer::new(SuspiciousWordScanner::default(), mock.clone())
            .with_timeout(Duration::from_secs(5));

        let result = normalizer.classify("Leak exposed").await;

        assert!(result.is_fallback());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_classifier_beats_the_timeout() {
        let mock = Arc::new(
            MockStanceClassifier::returning("neutral", 0.25).with_delay(Duration::from_millis(10)),
        );
        let normalizer = Normalizer::new(SuspiciousWordScanner::default(), mock)
            .with_timeout(Duration::from_secs(5));

        let result = normalizer.classify("Leak exposed").await;

        assert_eq!(result.category, "Neutral");
        assert_eq!(result.score, 25.0);
        assert_eq!(result.suspicious_words, vec!["leak", "exposed"]);
    }
}
