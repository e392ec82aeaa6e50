//! File watcher: runs `check` on startup, then re-runs on document changes.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::batch::ReportCache;
use crate::commands;
use crate::config::{CONFIG_FILE, Overrides};
use crate::diagnostics::{self, OutputFormat};
use crate::error::Error;

/// Debounce delay between filesystem events and re-check.
const DEBOUNCE_MS: u64 = 100;

/// Exit code reported for a runtime error during a re-check.
const EXIT_RUNTIME: u8 = 3;

/// Options shared by every check in the session.
pub struct WatchOptions<'a> {
    /// Whether warnings fail the check.
    pub deny_warnings: bool,
    /// Output format for each re-check.
    pub format: OutputFormat,
    /// Command-line config overrides.
    pub overrides: &'a Overrides,
    /// Roots to check; empty means the working directory.
    pub paths: &'a [PathBuf],
}

/// Paths to register with the watcher: each root plus the config file.
/// Directories are watched recursively.
fn collect_watch_targets(paths: &[PathBuf]) -> Vec<(PathBuf, RecursiveMode)> {
    let mut roots: BTreeSet<PathBuf> = paths.iter().cloned().collect();
    if roots.is_empty() {
        roots.insert(PathBuf::from("."));
    }
    let config = Path::new(".").join(CONFIG_FILE);
    if config.exists() {
        roots.insert(config);
    }
    return roots
        .into_iter()
        .map(|root| {
            let mode = if root.is_dir() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            return (root, mode);
        })
        .collect();
}

/// Create a filesystem watcher that sends events on the given channel.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(tx: crossbeam_channel::Sender<()>) -> Result<notify::RecommendedWatcher, Error> {
    let watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
            )
        {
            let _ = tx.send(());
        }
    })?;
    return Ok(watcher);
}

/// Entry point for the watch command.
///
/// Runs an initial check, then watches the roots and config file and
/// re-checks on changes. Reports of unchanged documents are reused until
/// the config changes.
///
/// # Errors
///
/// Returns errors from watcher setup.
pub fn run(options: &WatchOptions<'_>) -> Result<ExitCode, Error> {
    let mut cache = ReportCache::new();

    eprintln!("watch: initial check");
    let mut last_code = run_check(options, &mut cache);

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;

    let targets = collect_watch_targets(options.paths);
    for (path, mode) in &targets {
        if let Err(e) = watcher.watch(path, *mode) {
            tracing::warn!(path = %path.display(), error = %e, "cannot watch path");
        }
    }

    let count = targets.len();
    eprintln!("watch: monitoring {count} paths, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-checking...");
        last_code = run_check(options, &mut cache);
    }

    return Ok(last_code);
}

/// Run check once and print the result. `run_batch` refreshes the cache.
/// Returns the exit code the check would have produced.
fn run_check(options: &WatchOptions<'_>, cache: &mut ReportCache) -> ExitCode {
    let reports = match commands::run_batch(options.paths, options.overrides, cache) {
        Ok(reports) => reports,
        Err(e) => {
            diagnostics::print_error(&e);
            return ExitCode::from(EXIT_RUNTIME);
        },
    };

    match diagnostics::render_reports(&reports, options.format) {
        Ok(out) => print!("{out}"),
        Err(e) => {
            diagnostics::print_error(&e);
            return ExitCode::from(EXIT_RUNTIME);
        },
    }

    return commands::exit_code(&reports, options.deny_warnings);
}
