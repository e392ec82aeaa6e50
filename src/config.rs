use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::path::Path;

use crate::error::Error;

/// Name of the config file looked up in the working root.
pub const CONFIG_FILE: &str = ".llmtxt.toml";

/// Leading identifiers that are never checked against the document: the
/// Python standard library, ubiquitous third-party packages, and receivers.
pub const BUILTIN_ALLOWLIST: &[&str] = &[
    "abc", "argparse", "asyncio", "base64", "cls", "collections", "contextlib", "copy", "csv",
    "dataclasses", "datetime", "decimal", "enum", "functools", "glob", "hashlib", "inspect", "io",
    "itertools", "json", "logging", "math", "np", "numpy", "operator", "os", "pathlib", "pd",
    "pandas", "pickle", "pprint", "random", "re", "requests", "self", "shutil", "socket",
    "string", "subprocess", "sys", "tempfile", "threading", "time", "typing", "unittest",
    "urllib", "uuid", "warnings",
];

/// Validation and discovery settings, loaded from `.llmtxt.toml`.
/// Include/exclude patterns are path prefixes applied to discovered documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Declared `language` values that raise no warning, lowercased.
    pub accepted_languages: BTreeSet<String>,
    exclude: Vec<String>,
    include: Vec<String>,
    /// Allowlist entries from the config file or the command line.
    /// The built-in list is consulted separately.
    pub reference_allowlist: BTreeSet<String>,
    /// Whether an out-of-order section is a warning (true) or info (false).
    pub strict_order: bool,
    /// Batch worker threads; 0 picks the available parallelism.
    pub workers: usize,
}

/// Raw TOML structure for `.llmtxt.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct LlmtxtTomlConfig {
    #[serde(default)]
    accepted_languages: Option<Vec<String>>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    reference_allowlist: Vec<String>,
    #[serde(default)]
    strict_order: Option<bool>,
    #[serde(default)]
    workers: Option<usize>,
}

/// Command-line settings that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Extra allowlist entries (`--allow`).
    pub allow: Vec<String>,
    /// Replacement accepted languages (`--language`).
    pub languages: Vec<String>,
    /// `--no-strict-order`.
    pub relaxed_order: bool,
    /// `--workers`.
    pub workers: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            accepted_languages: BTreeSet::from(["python".to_string()]),
            exclude: Vec::new(),
            include: Vec::new(),
            reference_allowlist: BTreeSet::new(),
            strict_order: true,
            workers: 0,
        };
    }
}

impl Config {
    /// Load config from `.llmtxt.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist. A file that exists but
    /// is malformed is an error, never a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed, or `Error::ConfigInvalid`
    /// if a value is unusable.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            },
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: LlmtxtTomlConfig = toml::from_str(&content)?;
        let config = Self::from_raw(raw, &path)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        return Ok(config);
    }

    /// Validate raw TOML values into a config.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigInvalid` for an empty language list or a
    /// non-identifier allowlist entry.
    fn from_raw(raw: LlmtxtTomlConfig, path: &Path) -> Result<Self, Error> {
        let defaults = Self::default();
        let accepted_languages = match raw.accepted_languages {
            Some(languages) if languages.is_empty() => {
                return Err(Error::ConfigInvalid {
                    path: path.to_path_buf(),
                    reason: "`accepted_languages` must name at least one language".to_string(),
                });
            },
            Some(languages) => languages.iter().map(|l| return l.trim().to_ascii_lowercase()).collect(),
            None => defaults.accepted_languages,
        };

        if let Some(bad) = raw.reference_allowlist.iter().find(|n| return !is_identifier(n)) {
            return Err(Error::ConfigInvalid {
                path: path.to_path_buf(),
                reason: format!("`reference_allowlist` entry `{bad}` is not an identifier"),
            });
        }

        return Ok(Self {
            accepted_languages,
            exclude: raw.exclude,
            include: raw.include,
            reference_allowlist: raw.reference_allowlist.into_iter().collect(),
            strict_order: raw.strict_order.unwrap_or(defaults.strict_order),
            workers: raw.workers.unwrap_or(defaults.workers),
        });
    }

    /// Apply command-line overrides on top of the loaded file.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if !overrides.languages.is_empty() {
            self.accepted_languages = overrides
                .languages
                .iter()
                .map(|l| return l.trim().to_ascii_lowercase())
                .collect();
        }
        self.reference_allowlist.extend(overrides.allow.iter().cloned());
        if overrides.relaxed_order {
            self.strict_order = false;
        }
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        return self;
    }

    /// Whether a declared language is accepted.
    pub fn accepts_language(&self, language: &str) -> bool {
        return self.accepted_languages.contains(&language.trim().to_ascii_lowercase());
    }

    /// Whether a leading identifier is exempt from reference checking.
    pub fn is_allowlisted(&self, name: &str) -> bool {
        return BUILTIN_ALLOWLIST.iter().any(|builtin| return *builtin == name)
            || self.reference_allowlist.contains(name);
    }

    /// Number of batch workers to start for `jobs` documents.
    pub fn worker_count(&self, jobs: usize) -> usize {
        let wanted = if self.workers == 0 {
            std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
        } else {
            self.workers
        };
        return wanted.min(jobs).max(1);
    }

    /// Check whether a discovered document path should be validated.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

/// Whether `name` is a plain identifier usable as an allowlist entry.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    return (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| return c.is_ascii_alphanumeric() || c == '_');
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;

    fn write_config(body: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), body).unwrap();
        return dir;
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.accepts_language("Python"));
        assert!(config.strict_order);
    }

    #[test]
    fn reads_all_settings() {
        let dir = write_config(
            "include = [\"docs/\"]\nexclude = [\"docs/old/\"]\naccepted_languages = [\"Rust\", \"python\"]\nreference_allowlist = [\"httpx\"]\nstrict_order = false\nworkers = 3\n",
        );
        let config = Config::load(dir.path()).unwrap();
        assert!(config.accepts_language("rust"));
        assert!(config.is_allowlisted("httpx"));
        assert!(config.is_allowlisted("os"));
        assert!(!config.is_allowlisted("geopy"));
        assert!(!config.strict_order);
        assert_eq!(config.worker_count(10), 3);
        assert_eq!(config.worker_count(2), 2);
        assert!(config.should_scan("docs/llm.txt"));
        assert!(!config.should_scan("docs/old/llm.txt"));
        assert!(!config.should_scan("llm.txt"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = write_config("include = [\n");
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn unknown_key_is_an_error() {
        let dir = write_config("strict = true\n");
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn empty_language_list_is_invalid() {
        let dir = write_config("accepted_languages = []\n");
        assert!(matches!(Config::load(dir.path()), Err(Error::ConfigInvalid { .. })));
    }

    #[test]
    fn allowlist_entries_must_be_identifiers() {
        let dir = write_config("reference_allowlist = [\"not valid\"]\n");
        assert!(matches!(Config::load(dir.path()), Err(Error::ConfigInvalid { .. })));
    }

    #[test]
    fn overrides_take_precedence() {
        let overrides = Overrides {
            allow: vec!["httpx".to_string()],
            languages: vec!["Go".to_string()],
            relaxed_order: true,
            workers: Some(1),
        };
        let config = Config::default().with_overrides(&overrides);
        assert!(config.accepts_language("go"));
        assert!(!config.accepts_language("python"));
        assert!(config.is_allowlisted("httpx"));
        assert!(!config.strict_order);
        assert_eq!(config.worker_count(8), 1);
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("_private"));
        assert!(is_identifier("np"));
        assert!(!is_identifier("9lives"));
        assert!(!is_identifier("a.b"));
        assert!(!is_identifier(""));
    }
}
