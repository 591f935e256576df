// Seeder: one-time bulk import of a headline dataset into an empty archive.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use headline_common::HeadlineError;

use crate::archive::HeadlineArchive;

/// Dataset file layout: `{ "articles": [ { "headline": "..." }, ... ] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    pub articles: Vec<DatasetArticle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetArticle {
    pub headline: String,
}

impl Dataset {
    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub async fn from_path(path: &Path) -> Result<Self, SeedError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SeedError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&raw)
    }
}

/// Why a seeding run could not proceed. Logged, never propagated past [`Seeder::seed`].
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] HeadlineError),

    #[error("Seeding already in progress")]
    AlreadyRunning,
}

/// Per-item tally of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub total: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The archive already had records; nothing was read or written.
    Skipped { existing: i64 },
    Seeded(SeedReport),
    Failed(String),
}

pub struct Seeder {
    archive: Arc<HeadlineArchive>,
    running: Mutex<()>,
}

impl Seeder {
    pub fn new(archive: Arc<HeadlineArchive>) -> Self {
        Self {
            archive,
            running: Mutex::new(()),
        }
    }

    /// Seed the archive from `path` if it is empty. Best-effort: failures are
    /// logged and reported in the outcome, never returned as errors.
    pub async fn seed(&self, path: impl AsRef<Path>) -> SeedOutcome {
        let path = path.as_ref();
        match self.try_seed(path).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error loading initial data");
                SeedOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_seed(&self, path: &Path) -> Result<SeedOutcome, SeedError> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| SeedError::AlreadyRunning)?;

        let existing = self.archive.count().await?;
        if existing > 0 {
            info!(existing, "Archive already populated, skipping seed");
            return Ok(SeedOutcome::Skipped { existing });
        }

        let dataset = Dataset::from_path(path).await?;
        let report = self.import(dataset).await;

        info!(
            total = report.total,
            inserted = report.inserted,
            duplicates = report.duplicates,
            failed = report.failed,
            "Loaded initial headlines"
        );
        if report.duplicates + report.failed > 0 {
            warn!(
                skipped = report.duplicates + report.failed,
                "Some dataset headlines were not archived"
            );
        }

        Ok(SeedOutcome::Seeded(report))
    }

    async fn import(&self, dataset: Dataset) -> SeedReport {
        let mut report = SeedReport {
            total: dataset.articles.len(),
            ..SeedReport::default()
        };

        for (index, article) in dataset.articles.into_iter().enumerate() {
            match self.archive.classify_and_insert(&article.headline).await {
                Ok(_) => report.inserted += 1,
                Err(e) if e.is_duplicate() => {
                    warn!(index, "Duplicate headline in dataset, skipping");
                    report.duplicates += 1;
                }
                Err(e) => {
                    warn!(index, error = %e, "Failed to archive dataset headline");
                    report.failed += 1;
                }
            }
        }

        report
    }
}
