//! Data quality report over the final record set.

use std::collections::BTreeMap;

use crate::domain::review::{ReviewRecord, RATING_COLUMN};

/// How often a column ended up empty.
#[derive(Debug)]
pub struct ColumnFill {
    pub column: String,
    pub empty: usize,
}

/// Summary of field coverage and rating sanity, computed over the records
/// handed to the sink. Rendering is left to the caller.
#[derive(Debug)]
pub struct ValidationReport {
    pub total: usize,
    pub column_fill: Vec<ColumnFill>,
    /// Non-empty ratings that parse into 1..=5, by value.
    pub rating_distribution: BTreeMap<u8, usize>,
    /// Non-empty ratings outside 1..=5 or not numeric.
    pub invalid_ratings: usize,
}

impl ValidationReport {
    pub fn build(records: &[ReviewRecord], columns: &[String]) -> Self {
        let column_fill = columns
            .iter()
            .map(|column| ColumnFill {
                column: column.clone(),
                empty: records
                    .iter()
                    .filter(|r| r.get(column).trim().is_empty())
                    .count(),
            })
            .collect();

        let mut rating_distribution = BTreeMap::new();
        let mut invalid_ratings = 0usize;
        for record in records {
            let rating = record.get(RATING_COLUMN).trim();
            if rating.is_empty() {
                continue;
            }
            match rating.parse::<u8>() {
                Ok(value @ 1..=5) => *rating_distribution.entry(value).or_insert(0) += 1,
                _ => invalid_ratings += 1,
            }
        }

        Self {
            total: records.len(),
            column_fill,
            rating_distribution,
            invalid_ratings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::{REVIEW_TEXT_COLUMN, USERNAME_COLUMN};

    fn columns() -> Vec<String> {
        [USERNAME_COLUMN, REVIEW_TEXT_COLUMN, RATING_COLUMN]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn record(username: &str, rating: &str) -> ReviewRecord {
        let mut r = ReviewRecord::new(&columns());
        r.set(USERNAME_COLUMN, username);
        r.set(RATING_COLUMN, rating);
        r
    }

    #[test]
    fn counts_empty_columns_and_rating_buckets() {
        let records = vec![
            record("Alice", "5"),
            record("Bob", "5"),
            record("Carol", ""),
            record("Dan", "11"),
        ];
        let report = ValidationReport::build(&records, &columns());
        assert_eq!(report.total, 4);

        let rating_fill = report
            .column_fill
            .iter()
            .find(|c| c.column == RATING_COLUMN)
            .unwrap();
        assert_eq!(rating_fill.empty, 1);

        let text_fill = report
            .column_fill
            .iter()
            .find(|c| c.column == REVIEW_TEXT_COLUMN)
            .unwrap();
        assert_eq!(text_fill.empty, 4);

        assert_eq!(report.rating_distribution.get(&5), Some(&2));
        assert_eq!(report.invalid_ratings, 1);
    }
}
