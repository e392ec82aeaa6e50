use std::path::{Path, PathBuf};

use sha2::{Digest as _, Sha256};
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::Error;

/// Directories never descended into during discovery.
const SKIPPED_DIRS: [&str; 3] = ["node_modules", "target", "__pycache__"];

/// A document read from disk, ready for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Hex SHA-256 of the text, used to reuse reports of unchanged files.
    pub digest: String,
    /// Path as discovered.
    pub path: PathBuf,
    /// UTF-8 contents.
    pub text: String,
}

/// Whether a file name marks an llm.txt document.
pub fn is_document_name(name: &str) -> bool {
    return name == "llm.txt" || name == "llms.txt" || name.ends_with(".llm.txt");
}

/// Find every document under the given paths.
///
/// Directories are walked recursively, skipping hidden and build directories,
/// and filtered by the config's include/exclude prefixes. Files named
/// explicitly are taken as-is. With no paths the current directory is walked.
/// The result is sorted and free of duplicates.
///
/// # Errors
///
/// Returns `Error::FileNotFound` for a path that does not exist, or
/// `Error::NoDocumentsFound` when nothing matches.
pub fn discover(paths: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>, Error> {
    let roots = if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths.to_vec()
    };

    let mut found = Vec::new();
    for root in &roots {
        if root.is_file() {
            found.push(root.clone());
            continue;
        }
        if !root.is_dir() {
            return Err(Error::FileNotFound { path: root.clone() });
        }
        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| return e.depth() == 0 || !is_skipped_dir(e))
            .filter_map(Result::ok)
            .filter(|e| return e.file_type().is_file())
            .filter(|e| return e.file_name().to_str().is_some_and(is_document_name))
        {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if !config.should_scan(&relative.to_string_lossy()) {
                tracing::debug!(path = %entry.path().display(), "excluded by config");
                continue;
            }
            found.push(entry.into_path());
        }
    }

    found.sort();
    found.dedup();
    if found.is_empty() {
        return Err(Error::NoDocumentsFound { roots });
    }
    tracing::info!(documents = found.len(), "discovered documents");
    return Ok(found);
}

/// Hidden, dependency, and build directories.
fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    return name.starts_with('.') || SKIPPED_DIRS.iter().any(|skipped| return name == *skipped);
}

/// Read discovered documents.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if a file vanished since discovery, or
/// `Error::Io` if it cannot be read as UTF-8.
pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>, Error> {
    return paths.iter().map(PathBuf::as_path).map(read_source).collect();
}

/// Read one document and fingerprint it.
///
/// # Errors
///
/// Returns `Error::FileNotFound` or `Error::Io`.
pub fn read_source(path: &Path) -> Result<SourceFile, Error> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::FileNotFound { path: path.to_path_buf() });
        },
        Err(e) => return Err(Error::Io(e)),
    };
    return Ok(SourceFile {
        digest: digest(&text),
        path: path.to_path_buf(),
        text,
    });
}

/// Hex-encoded SHA-256 of a document.
pub fn digest(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    return hash.iter().map(|b| return format!("{b:02x}")).collect();
}
