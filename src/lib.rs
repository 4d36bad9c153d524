//! review-miner - Configurable review extraction from saved HTML pages
//!
//! A single generic engine, parameterized by a declarative per-site
//! configuration, turns locally saved review-listing snapshots into
//! deduplicated, optionally year-filtered records with a fixed column
//! schema.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the main entry points
pub use application::{ExtractionService, ExtractionSummary, ValidationReport};
pub use domain::review::ReviewRecord;
pub use infrastructure::document_loader::LoadError;
pub use infrastructure::site_config::{ConfigError, SiteConfig};
