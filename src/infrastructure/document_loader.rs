//! Loads saved HTML snapshots from disk.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use scraper::Html;
use thiserror::Error;
use tracing::debug;

/// A document that could not be read. Fatal for that document only; the
/// batch continues with the remaining files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read a snapshot and parse it into a DOM tree. Bytes are decoded as
/// strict UTF-8 first; on failure the single-byte Windows-1252 fallback is
/// used (saved pages from older browsers ship in it). There is no retry
/// beyond that one fallback.
pub fn load_document(path: &Path) -> Result<Html, LoadError> {
    let text = read_text(path)?;
    Ok(Html::parse_document(&text))
}

/// The decoded text content of a snapshot file.
pub fn read_text(path: &Path) -> Result<String, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode(&bytes, path).into_owned())
}

fn decode<'a>(bytes: &'a [u8], path: &Path) -> Cow<'a, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!(path = %path.display(), "not valid UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_utf8_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        fs::write(&path, "<html><body>caf\u{e9} review</body></html>").unwrap();
        let text = read_text(&path).unwrap();
        assert!(text.contains("café review"));
    }

    #[test]
    fn falls_back_to_windows_1252() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.html");
        let mut file = fs::File::create(&path).unwrap();
        // 0xE9 is é in Windows-1252 but invalid as a UTF-8 start byte here.
        file.write_all(b"<html><body>caf\xe9 review</body></html>").unwrap();
        drop(file);
        let text = read_text(&path).unwrap();
        assert!(text.contains("café review"));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.html");
        assert!(matches!(read_text(&path), Err(LoadError::Read { .. })));
    }

    #[test]
    fn parses_into_a_document_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        fs::write(&path, "<html><body><p id=\"x\">hi</p></body></html>").unwrap();
        let doc = load_document(&path).unwrap();
        let selector = scraper::Selector::parse("p").unwrap();
        assert_eq!(doc.select(&selector).count(), 1);
    }
}
