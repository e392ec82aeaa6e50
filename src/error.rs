/// Crate-level error types for llmtxt runtime failures.
///
/// Conformance problems in a document are never errors: they are
/// `Diagnostic`s inside a `Report`. This enum covers what stops the tool
/// itself from running.
use std::path::PathBuf;

/// Every runtime failure names the file or setting involved so it can be
/// rendered as a useful diagnostic.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The config file parsed but holds a value that cannot be used.
    #[error("invalid config {}: {reason}", path.display())]
    ConfigInvalid {
        /// Config file containing the bad value.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// A path given on the command line does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// An allowlist entry is not a plain identifier.
    #[error("invalid allowlist name `{name}`: expected an identifier such as `requests`")]
    InvalidAllowlistName {
        /// The rejected name.
        name: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON rendering failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped serialization error.
        #[from]
        serde_json::Error,
    ),

    /// Discovery found nothing to check.
    #[error("no llm.txt documents found under {}", roots.iter().map(|p| return p.display().to_string()).collect::<Vec<_>>().join(", "))]
    NoDocumentsFound {
        /// Paths that were searched.
        roots: Vec<PathBuf>,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The config file could not be parsed for editing.
    #[error("toml edit: {0}")]
    TomlEdit(
        /// The wrapped parse error.
        #[from]
        toml_edit::TomlError,
    ),

    /// The file watcher could not be set up.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description from the watcher backend.
        reason: String,
    },
}

impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        return Self::WatchFailed {
            reason: err.to_string(),
        };
    }
}
