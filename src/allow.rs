use std::path::{Path, PathBuf};

use toml_edit::{Array, DocumentMut, value};

use crate::config::{self, BUILTIN_ALLOWLIST, CONFIG_FILE};
use crate::error::Error;

/// Config key edited by these commands.
const KEY: &str = "reference_allowlist";

// ── CLI commands ──────────────────────────────────────────────────────

/// Print the configured allowlist, then the built-in entries.
///
/// # Errors
///
/// Returns errors from config loading.
pub fn cmd_list() -> Result<(), Error> {
    let root = PathBuf::from(".");
    let config = config::Config::load(&root)?;

    if config.reference_allowlist.is_empty() {
        println!("Configured: (none)");
    } else {
        let names: Vec<&str> = config.reference_allowlist.iter().map(String::as_str).collect();
        println!("Configured: {}", names.join(", "));
    }
    println!("Built-in:   {}", BUILTIN_ALLOWLIST.join(", "));
    return Ok(());
}

/// Add a name to the allowlist in `.llmtxt.toml`.
///
/// # Errors
///
/// Returns `Error::InvalidAllowlistName` for a non-identifier, or errors
/// from reading and writing the config.
pub fn cmd_add(name: &str) -> Result<(), Error> {
    if add_to_config(Path::new("."), name)? {
        println!("Allowed: {name}");
    } else {
        println!("Already allowed: {name}");
    }
    return Ok(());
}

/// Remove a name from the allowlist in `.llmtxt.toml`.
///
/// # Errors
///
/// Returns errors from reading and writing the config.
pub fn cmd_remove(name: &str) -> Result<(), Error> {
    if remove_from_config(Path::new("."), name)? {
        println!("Removed: {name}");
    } else {
        println!("Not in allowlist: {name}");
    }
    return Ok(());
}

// ── Config file editing ───────────────────────────────────────────────

/// Parse `.llmtxt.toml` into a format-preserving document.
/// Returns an empty document if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::TomlEdit` on parse failure.
fn read_config_doc(root: &Path) -> Result<(PathBuf, DocumentMut), Error> {
    let config_path = root.join(CONFIG_FILE);
    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::Io(e)),
    };
    let doc: DocumentMut = content.parse()?;
    return Ok((config_path, doc));
}

/// The allowlist array, for editing.
///
/// # Errors
///
/// Returns `Error::ConfigInvalid` if the key holds something other than an array.
fn allowlist_mut<'a>(doc: &'a mut DocumentMut, config_path: &Path) -> Result<&'a mut Array, Error> {
    return doc
        .entry(KEY)
        .or_insert(value(Array::new()))
        .as_array_mut()
        .ok_or_else(|| {
            return Error::ConfigInvalid {
                path: config_path.to_path_buf(),
                reason: format!("`{KEY}` must be an array of strings"),
            };
        });
}

/// Append `name` unless present. Returns whether the file changed.
/// Creates the config file and the key as needed.
///
/// # Errors
///
/// Returns `Error::InvalidAllowlistName`, `Error::ConfigInvalid`,
/// `Error::TomlEdit`, or `Error::Io`.
fn add_to_config(root: &Path, name: &str) -> Result<bool, Error> {
    if !config::is_identifier(name) {
        return Err(Error::InvalidAllowlistName { name: name.to_string() });
    }
    let (config_path, mut doc) = read_config_doc(root)?;
    let list = allowlist_mut(&mut doc, &config_path)?;
    if list.iter().any(|v| return v.as_str() == Some(name)) {
        return Ok(false);
    }
    list.push(name);

    std::fs::write(&config_path, doc.to_string())?;
    tracing::debug!(name, path = %config_path.display(), "added allowlist entry");
    return Ok(true);
}

/// Remove every occurrence of `name`. Returns whether the file changed.
///
/// # Errors
///
/// Returns `Error::ConfigInvalid`, `Error::TomlEdit`, or `Error::Io`.
fn remove_from_config(root: &Path, name: &str) -> Result<bool, Error> {
    let (config_path, mut doc) = read_config_doc(root)?;
    let Some(item) = doc.get_mut(KEY) else {
        return Ok(false);
    };
    let list = item.as_array_mut().ok_or_else(|| {
        return Error::ConfigInvalid {
            path: config_path.clone(),
            reason: format!("`{KEY}` must be an array of strings"),
        };
    })?;

    let before = list.len();
    list.retain(|v| return v.as_str() != Some(name));
    if list.len() == before {
        return Ok(false);
    }

    std::fs::write(&config_path, doc.to_string())?;
    tracing::debug!(name, path = %config_path.display(), "removed allowlist entry");
    return Ok(true);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "tests")]
mod tests {
    use super::*;

    fn config_text(root: &Path) -> String {
        return std::fs::read_to_string(root.join(CONFIG_FILE)).unwrap();
    }

    #[test]
    fn add_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(add_to_config(dir.path(), "httpx").unwrap());
        let loaded = config::Config::load(dir.path()).unwrap();
        assert!(loaded.reference_allowlist.contains("httpx"));
    }

    #[test]
    fn add_preserves_comments_and_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "# project settings\nstrict_order = false # relaxed\nreference_allowlist = [\"httpx\"]\n",
        )
        .unwrap();

        assert!(add_to_config(dir.path(), "attr").unwrap());
        let text = config_text(dir.path());
        assert!(text.starts_with("# project settings\n"));
        assert!(text.contains("strict_order = false # relaxed"));

        let doc: DocumentMut = text.parse().unwrap();
        assert!(doc[KEY].is_array());
        let names: Vec<&str> = doc[KEY].as_array().unwrap().iter().filter_map(|v| return v.as_str()).collect();
        assert_eq!(names, vec!["httpx", "attr"]);
    }

    #[test]
    fn add_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(add_to_config(dir.path(), "httpx").unwrap());
        assert!(!add_to_config(dir.path(), "httpx").unwrap());
        assert_eq!(config_text(dir.path()).matches("httpx").count(), 1);
    }

    #[test]
    fn add_rejects_dotted_names() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            add_to_config(dir.path(), "os.path"),
            Err(Error::InvalidAllowlistName { .. })
        ));
        assert!(!dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!remove_from_config(dir.path(), "httpx").unwrap());
        add_to_config(dir.path(), "httpx").unwrap();
        add_to_config(dir.path(), "attr").unwrap();

        assert!(remove_from_config(dir.path(), "httpx").unwrap());
        assert!(!remove_from_config(dir.path(), "httpx").unwrap());
        let loaded = config::Config::load(dir.path()).unwrap();
        assert_eq!(loaded.reference_allowlist.len(), 1);
        assert!(loaded.reference_allowlist.contains("attr"));
    }

    #[test]
    fn non_array_value_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "reference_allowlist = \"httpx\"\n").unwrap();
        assert!(matches!(add_to_config(dir.path(), "attr"), Err(Error::ConfigInvalid { .. })));
        assert!(matches!(remove_from_config(dir.path(), "httpx"), Err(Error::ConfigInvalid { .. })));
    }
}
