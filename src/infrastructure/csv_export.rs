//! CSV sink for the final record set.
//!
//! One header row of column names, one row per record, UTF-8. Fields are
//! quoted only when they contain a separator, quote or line break; embedded
//! quotes are doubled.

use std::io::{self, Write};
use std::path::Path;

use crate::domain::review::ReviewRecord;

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row.
pub fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{escaped}\"")?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}

/// Render header plus records with the configured column order.
pub fn render(columns: &[String], records: &[ReviewRecord]) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let _ = write_row(&mut buf, columns);
    for record in records {
        let _ = write_row(&mut buf, &record.to_row(columns));
    }
    String::from_utf8(buf).unwrap_or_default()
}

/// Write the record set to a file.
pub fn write_file(path: &Path, columns: &[String], records: &[ReviewRecord]) -> io::Result<()> {
    std::fs::write(path, render(columns, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::{REVIEW_TEXT_COLUMN, USERNAME_COLUMN};

    fn columns() -> Vec<String> {
        vec![USERNAME_COLUMN.to_string(), REVIEW_TEXT_COLUMN.to_string()]
    }

    #[test]
    fn plain_fields_are_unquoted() {
        let mut record = ReviewRecord::new(&columns());
        record.set(USERNAME_COLUMN, "Alice");
        record.set(REVIEW_TEXT_COLUMN, "simple text");
        assert_eq!(
            render(&columns(), &[record]),
            "username,review_text\nAlice,simple text\n"
        );
    }

    #[test]
    fn separators_quotes_and_newlines_are_escaped() {
        let mut record = ReviewRecord::new(&columns());
        record.set(USERNAME_COLUMN, "Alice \"A\" W.");
        record.set(REVIEW_TEXT_COLUMN, "line one\nwith, comma");
        assert_eq!(
            render(&columns(), &[record]),
            "username,review_text\n\"Alice \"\"A\"\" W.\",\"line one\nwith, comma\"\n"
        );
    }
}
