//! Batch extraction use case: documents in, post-processed records out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::application::post_process::{dedupe, filter_by_year, year_histogram};
use crate::domain::review::ReviewRecord;
use crate::infrastructure::document_loader::{load_document, LoadError};
use crate::infrastructure::parsing::ReviewParser;
use crate::infrastructure::site_config::{CompiledConfig, ConfigError, SiteConfig};

/// A document that could not be loaded during the batch.
#[derive(Debug)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub error: LoadError,
}

/// Result of one batch run over a set of snapshot files.
#[derive(Debug)]
pub struct ExtractionSummary {
    /// Final, deduplicated and filtered records, in stable order:
    /// documents in the given file order, reviews in document order.
    pub records: Vec<ReviewRecord>,
    pub documents_processed: usize,
    pub failures: Vec<DocumentFailure>,
    /// Records extracted before deduplication.
    pub total_extracted: usize,
    /// Records after deduplication, before the year filter.
    pub unique_records: usize,
    pub year_histogram: BTreeMap<i32, usize>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExtractionSummary {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Runs the extraction pipeline over a batch of documents with one compiled
/// site configuration.
pub struct ExtractionService {
    parser: ReviewParser,
}

impl ExtractionService {
    pub fn new(config: &SiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            parser: ReviewParser::new(config)?,
        })
    }

    pub fn config(&self) -> &CompiledConfig {
        self.parser.config()
    }

    /// Process the documents in the given order. A document that cannot be
    /// loaded is reported in the summary and does not abort the batch.
    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> ExtractionSummary {
        let started_at = Utc::now();
        let mut extracted: Vec<ReviewRecord> = Vec::new();
        let mut failures = Vec::new();
        let mut documents_processed = 0usize;

        for path in paths {
            let path = path.as_ref();
            match load_document(path) {
                Ok(document) => {
                    let records = self.parser.parse_document(&document);
                    info!(path = %path.display(), reviews = records.len(), "processed document");
                    extracted.extend(records);
                    documents_processed += 1;
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping unreadable document");
                    failures.push(DocumentFailure {
                        path: path.to_path_buf(),
                        error,
                    });
                }
            }
        }

        let total_extracted = extracted.len();
        let unique = dedupe(extracted);
        let unique_records = unique.len();
        let records = match self.config().year_range {
            Some((start, end)) => filter_by_year(unique, start, end),
            None => unique,
        };
        let year_histogram = year_histogram(&records);

        ExtractionSummary {
            records,
            documents_processed,
            failures,
            total_extracted,
            unique_records,
            year_histogram,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
