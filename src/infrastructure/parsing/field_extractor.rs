//! Builds a review record from a resolved container.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use tracing::debug;

use crate::domain::review::{
    ReviewRecord, MIN_REVIEW_TEXT_CHARS, REVIEW_TEXT_COLUMN, USERNAME_COLUMN,
};
use crate::infrastructure::parsing::container_resolver::resolve;
use crate::infrastructure::parsing::text::{collapsed_text, joined_text};
use crate::infrastructure::site_config::{CompiledConfig, CompiledFieldRule};

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Applies the configured field rules to one candidate node and its
/// container. Extraction is a pure read over the parsed tree.
pub struct FieldExtractor<'c> {
    config: &'c CompiledConfig,
}

impl<'c> FieldExtractor<'c> {
    pub fn new(config: &'c CompiledConfig) -> Self {
        Self { config }
    }

    /// Extract a record for one candidate. Returns `None` when the candidate
    /// fails a validity check (short text, unresolvable container, no
    /// username) — an expected skip, not an error. A returned record is
    /// always fully valid; partial records are never produced.
    pub fn extract(&self, candidate: ElementRef<'_>) -> Option<ReviewRecord> {
        let review_text = collapsed_text(candidate);
        if review_text.chars().count() < MIN_REVIEW_TEXT_CHARS {
            debug!(len = review_text.chars().count(), "skipping short review text");
            return None;
        }

        let container = match resolve(candidate, self.config) {
            Some(container) => container,
            None => {
                debug!("skipping detached candidate");
                return None;
            }
        };
        let container_el = container.element();

        let username = match self.extract_username(container_el) {
            Some(name) => name,
            None => {
                debug!(resolved = container.is_resolved(), "skipping review without username");
                return None;
            }
        };

        let mut record = ReviewRecord::new(&self.config.columns);
        record.set(USERNAME_COLUMN, username);
        record.set(REVIEW_TEXT_COLUMN, review_text);

        let haystack = joined_text(container_el);
        for (column, rule) in &self.config.fields {
            if !record.contains_column(column) {
                continue;
            }
            if let Some(value) = apply_rule(rule, container_el, &haystack) {
                record.set(column, value);
            }
        }
        for alias in &self.config.aliases {
            let value = record.get(&alias.source).to_string();
            record.set(&alias.target, value);
        }

        Some(record)
    }

    /// First identity match whose trimmed text looks like a display name:
    /// at least two characters, starting with a letter. Filters out
    /// decorative icon-only links that match the identity rule but carry no
    /// visible name.
    fn extract_username(&self, container: ElementRef<'_>) -> Option<String> {
        container
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| self.config.identity.matches(*el))
            .map(collapsed_text)
            .find(|text| {
                text.chars().count() >= 2
                    && text.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            })
    }
}

fn apply_rule(
    rule: &CompiledFieldRule,
    container: ElementRef<'_>,
    haystack: &str,
) -> Option<String> {
    match rule {
        CompiledFieldRule::Text(pattern) => pattern.captures(haystack).map(|caps| {
            caps.get(1)
                .map_or_else(|| caps.get(0).unwrap().as_str(), |m| m.as_str())
                .to_string()
        }),

        CompiledFieldRule::Attribute { attr, pattern } => container
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find_map(|el| {
                el.value()
                    .attr(attr)
                    .filter(|value| pattern.is_match(value))
            })
            .and_then(|value| DIGIT_RUN.find(value))
            .map(|m| m.as_str().to_string()),

        CompiledFieldRule::ClassToken { pattern, divide_by } => container
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find_map(|el| {
                el.value().classes().find_map(|class| {
                    let caps = pattern.captures(class)?;
                    let tier: u32 = caps.get(1)?.as_str().parse().ok()?;
                    Some((tier / divide_by).to_string())
                })
            }),

        CompiledFieldRule::Composite(pattern) => pattern.captures(haystack).and_then(|caps| {
            let first = caps.get(1)?;
            let second = caps.get(2)?;
            Some(format!(
                "{} reviews, {} photos",
                first.as_str(),
                second.as_str()
            ))
        }),

        CompiledFieldRule::Badge { tag, attr, value } => container
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == tag && el.value().attr(attr) == Some(value.as_str()))
            .map(collapsed_text),
    }
}
