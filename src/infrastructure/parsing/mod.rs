//! HTML parsing and review extraction.
//!
//! The pipeline for one document: locate candidate review-text nodes,
//! resolve each candidate's enclosing container, extract the configured
//! fields. All stages are driven by a [`CompiledConfig`]; there is no
//! site-specific code here.

pub mod candidate_locator;
pub mod container_resolver;
pub mod field_extractor;
pub mod text;

use scraper::Html;
use tracing::debug;

use crate::domain::review::ReviewRecord;
use crate::infrastructure::site_config::{CompiledConfig, ConfigError, SiteConfig};

pub use container_resolver::ContainerMatch;
pub use field_extractor::FieldExtractor;

/// Configuration-driven review parser for one site family.
pub struct ReviewParser {
    config: CompiledConfig,
}

impl ReviewParser {
    /// Compile a site configuration into a parser. Fails fast on a
    /// malformed configuration.
    pub fn new(config: &SiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.compile()?,
        })
    }

    pub fn from_compiled(config: CompiledConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompiledConfig {
        &self.config
    }

    /// Extract every valid review record from one parsed document, in
    /// document order. A document without candidates yields an empty list.
    pub fn parse_document(&self, document: &Html) -> Vec<ReviewRecord> {
        let extractor = FieldExtractor::new(&self.config);
        let mut records = Vec::new();
        let mut skipped = 0usize;
        for candidate in candidate_locator::locate(document, &self.config.candidate_rule) {
            match extractor.extract(candidate) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }
        debug!(site = %self.config.name, found = records.len(), skipped, "parsed document");
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::site_config::presets;

    #[test]
    fn zero_candidates_is_an_empty_list() {
        let parser = ReviewParser::new(&presets::yelp()).unwrap();
        let doc = Html::parse_document("<html><body><p>nothing to see</p></body></html>");
        assert!(parser.parse_document(&doc).is_empty());
    }

    #[test]
    fn records_follow_document_order() {
        let parser = ReviewParser::new(&presets::yelp()).unwrap();
        let review = |id: u32, text: &str| {
            format!(
                r#"<li><a href="/user_details?userid={id}">User{id}</a>
                   <span lang="en" class="raw">{text}</span></li>"#
            )
        };
        let long_a = "a".repeat(60);
        let long_b = "b".repeat(60);
        let doc = Html::parse_document(&format!(
            "<html><body><ul>{}{}</ul></body></html>",
            review(1, &long_a),
            review(2, &long_b)
        ));
        let records = parser.parse_document(&doc);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].username(), "User1");
        assert_eq!(records[1].username(), "User2");
    }
}
