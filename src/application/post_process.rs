//! Deduplication and year filtering over the merged record set.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::review::{ReviewRecord, WRITTEN_DATE_COLUMN};

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());

/// Drop repeated reviews, keeping the first occurrence. Records with an
/// empty username are dropped as well. Order-preserving and idempotent.
pub fn dedupe(records: Vec<ReviewRecord>) -> Vec<ReviewRecord> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        if record.username().is_empty() {
            continue;
        }
        if seen.insert(record.dedup_key()) {
            unique.push(record);
        }
    }
    unique
}

/// First 4-digit run in a date string, as a year.
pub fn extract_year(date: &str) -> Option<i32> {
    YEAR.find(date).and_then(|m| m.as_str().parse().ok())
}

/// Keep records whose written date carries a year inside
/// `[start, end]` (inclusive). Records with no parseable year are dropped.
pub fn filter_by_year(records: Vec<ReviewRecord>, start: i32, end: i32) -> Vec<ReviewRecord> {
    records
        .into_iter()
        .filter(|record| {
            extract_year(record.get(WRITTEN_DATE_COLUMN))
                .is_some_and(|year| (start..=end).contains(&year))
        })
        .collect()
}

/// Retained records per extracted year.
pub fn year_histogram(records: &[ReviewRecord]) -> BTreeMap<i32, usize> {
    let mut histogram = BTreeMap::new();
    for record in records {
        if let Some(year) = extract_year(record.get(WRITTEN_DATE_COLUMN)) {
            *histogram.entry(year).or_insert(0) += 1;
        }
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::{REVIEW_TEXT_COLUMN, USERNAME_COLUMN};
    use proptest::prelude::*;

    fn columns() -> Vec<String> {
        [USERNAME_COLUMN, REVIEW_TEXT_COLUMN, WRITTEN_DATE_COLUMN]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn record(username: &str, text: &str, date: &str) -> ReviewRecord {
        let mut r = ReviewRecord::new(&columns());
        r.set(USERNAME_COLUMN, username);
        r.set(REVIEW_TEXT_COLUMN, text);
        r.set(WRITTEN_DATE_COLUMN, date);
        r
    }

    #[test]
    fn first_occurrence_wins() {
        let text = "t".repeat(120);
        let records = vec![
            record("Alice", &text, "Apr 23, 2025"),
            record("Alice", &text, "May 1, 2024"),
            record("Bob", &text, "Apr 23, 2025"),
        ];
        let unique = dedupe(records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].get(WRITTEN_DATE_COLUMN), "Apr 23, 2025");
        assert_eq!(unique[1].username(), "Bob");
    }

    #[test]
    fn texts_differing_past_the_prefix_are_the_same_review() {
        let base = "s".repeat(100);
        let records = vec![
            record("Alice", &format!("{base} first tail"), ""),
            record("Alice", &format!("{base} second tail"), ""),
        ];
        assert_eq!(dedupe(records).len(), 1);
    }

    #[test]
    fn empty_usernames_are_dropped() {
        let records = vec![record("", &"x".repeat(60), "2024")];
        assert!(dedupe(records).is_empty());
    }

    #[test]
    fn year_filter_keeps_inclusive_range() {
        let records = vec![
            record("A", "text", "Jan 1, 2018"),
            record("B", "text", "Jan 1, 2019"),
            record("C", "text", "Jan 1, 2025"),
            record("D", "text", "Jan 1, 2026"),
            record("E", "text", "no date here"),
        ];
        let kept = filter_by_year(records, 2019, 2025);
        let names: Vec<_> = kept.iter().map(|r| r.username().to_string()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn filtered_output_is_a_subset() {
        let input = vec![
            record("A", "text", "2019"),
            record("B", "text", "2030"),
        ];
        let kept = filter_by_year(input.clone(), 2019, 2025);
        assert!(kept.iter().all(|r| input.contains(r)));
    }

    #[test]
    fn histogram_counts_per_year() {
        let records = vec![
            record("A", "t", "Mar 2, 2021"),
            record("B", "t", "Jul 9, 2021"),
            record("C", "t", "Jul 9, 2023"),
        ];
        let histogram = year_histogram(&records);
        assert_eq!(histogram.get(&2021), Some(&2));
        assert_eq!(histogram.get(&2023), Some(&1));
        assert_eq!(histogram.get(&2022), None);
    }

    proptest! {
        #[test]
        fn dedupe_is_idempotent(
            entries in proptest::collection::vec(("[a-zA-Z]{0,8}", "[a-z ]{0,150}"), 0..24)
        ) {
            let records: Vec<ReviewRecord> = entries
                .iter()
                .map(|(name, text)| record(name, text, ""))
                .collect();
            let once = dedupe(records);
            let twice = dedupe(once.clone());
            prop_assert_eq!(once, twice);
        }
    }
}
