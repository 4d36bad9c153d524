//! Review record entity and its validity rules.

use std::collections::HashMap;

/// Column that must carry the reviewer's display name.
pub const USERNAME_COLUMN: &str = "username";
/// Column that must carry the review free text.
pub const REVIEW_TEXT_COLUMN: &str = "review_text";
/// Column the year filter reads.
pub const WRITTEN_DATE_COLUMN: &str = "written_date";
/// Column the validation report interprets as a 1-5 star rating.
pub const RATING_COLUMN: &str = "rating";

/// Minimum length of `review_text` for a record to be kept.
pub const MIN_REVIEW_TEXT_CHARS: usize = 50;
/// How much of the review text participates in the deduplication key.
pub const DEDUP_PREFIX_CHARS: usize = 100;

/// One extracted review: a mapping from every configured output column to a
/// string value (possibly empty). The column set is fixed at construction;
/// `set` on an unknown column is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    values: HashMap<String, String>,
}

/// Equality key for "same review": reviewer name plus the leading slice of
/// the review text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub username: String,
    pub text_prefix: String,
}

impl ReviewRecord {
    /// Create a record with every column initialized to the empty string.
    pub fn new(columns: &[String]) -> Self {
        Self {
            values: columns
                .iter()
                .map(|c| (c.clone(), String::new()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map_or("", String::as_str)
    }

    /// Set a column value. Columns outside the configured set are ignored.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        if let Some(slot) = self.values.get_mut(column) {
            *slot = value.into();
        }
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn username(&self) -> &str {
        self.get(USERNAME_COLUMN)
    }

    pub fn review_text(&self) -> &str {
        self.get(REVIEW_TEXT_COLUMN)
    }

    /// Whether the record clears the minimum-validity bar: a non-empty
    /// username and a review text of at least [`MIN_REVIEW_TEXT_CHARS`].
    pub fn is_valid(&self) -> bool {
        !self.username().is_empty()
            && self.review_text().chars().count() >= MIN_REVIEW_TEXT_CHARS
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            username: self.username().to_string(),
            text_prefix: self.review_text().chars().take(DEDUP_PREFIX_CHARS).collect(),
        }
    }

    /// Project the record onto an ordered column list.
    pub fn to_row(&self, columns: &[String]) -> Vec<String> {
        columns.iter().map(|c| self.get(c).to_string()).collect()
    }
}
