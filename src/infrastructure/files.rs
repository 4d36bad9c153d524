//! Input file discovery and ordering.

use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing page number, e.g. `yelp page 12.html` -> 12.
static FILE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\.html$").unwrap());

/// List the files in `dir` whose name matches the wildcard pattern, ordered
/// by the page number before the `.html` suffix (files without one sort
/// first). Ties break on the file name, so the order is deterministic.
pub fn find_input_files(dir: &Path, pattern: &str) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if wildcard_match(name, pattern) {
            files.push(entry.path());
        }
    }
    files.sort_by_key(|path| {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        (numeric_key(&name), name)
    });
    Ok(files)
}

fn numeric_key(name: &str) -> u64 {
    FILE_NUMBER
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Glob-lite matching: `*` matches any run of characters, everything else is
/// literal. Case-sensitive.
pub fn wildcard_match(name: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return name == pattern;
    }
    let segments: Vec<&str> = pattern.split('*').collect();
    let first = segments[0];
    let last = segments[segments.len() - 1];
    if !name.starts_with(first) {
        return false;
    }
    let mut pos = first.len();
    for segment in &segments[1..segments.len() - 1] {
        if segment.is_empty() {
            continue;
        }
        match name[pos..].find(segment) {
            Some(idx) => pos = pos + idx + segment.len(),
            None => return false,
        }
    }
    if last.is_empty() {
        return true;
    }
    name.len() >= pos + last.len() && name.ends_with(last)
}
