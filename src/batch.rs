//! Validate many documents on a pool of worker threads.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::Config;
use crate::report::{Report, validate};
use crate::scanner::SourceFile;

/// Reports from a previous run, keyed by path, with the config they were
/// computed under. An entry is reused only when its digest still matches the
/// file and the config is unchanged.
#[derive(Debug, Clone, Default)]
pub struct ReportCache {
    /// Config of the run that produced `reports`.
    config: Option<Config>,
    /// Reports keyed by document path.
    reports: HashMap<PathBuf, FileReport>,
}

impl ReportCache {
    /// An empty cache; the first run validates everything.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Replace the cached reports with those of a finished run.
    pub fn refresh(&mut self, reports: &[FileReport], config: &Config) {
        self.config = Some(config.clone());
        self.reports = reports.iter().map(|r| return (r.path.clone(), r.clone())).collect();
    }

    /// The cached report for `source`, if it was computed from the same text
    /// under the same config.
    fn reusable(&self, source: &SourceFile, config: &Config) -> Option<&FileReport> {
        if self.config.as_ref() != Some(config) {
            return None;
        }
        return self.reports.get(&source.path).filter(|cached| return cached.digest == source.digest);
    }
}

/// Validation result for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// SHA-256 of the text the report was computed from.
    pub digest: String,
    /// Document path.
    pub path: PathBuf,
    /// Diagnostics for the document.
    #[serde(flatten)]
    pub report: Report,
}

/// Validate every source, reusing cached reports for unchanged files.
///
/// Results come back in the order of `sources` regardless of which worker
/// finished first.
pub fn validate_all(sources: &[SourceFile], config: &Config, cache: &ReportCache) -> Vec<FileReport> {
    let mut results: Vec<(usize, FileReport)> = Vec::with_capacity(sources.len());
    let mut jobs: Vec<(usize, &SourceFile)> = Vec::new();

    for (position, source) in sources.iter().enumerate() {
        match cache.reusable(source, config) {
            Some(cached) => results.push((position, cached.clone())),
            None => jobs.push((position, source)),
        }
    }

    let reused = results.len();
    results.extend(run_pool(jobs, config));
    results.sort_by_key(|(position, _)| return *position);
    tracing::info!(documents = sources.len(), reused, "validated documents");

    return results.into_iter().map(|(_, report)| return report).collect();
}

/// Fan jobs out to scoped workers over a channel and gather the results.
fn run_pool(jobs: Vec<(usize, &SourceFile)>, config: &Config) -> Vec<(usize, FileReport)> {
    if jobs.is_empty() {
        return Vec::new();
    }
    let workers = config.worker_count(jobs.len());
    tracing::debug!(jobs = jobs.len(), workers, "starting validation workers");

    let (job_tx, job_rx) = crossbeam_channel::unbounded();
    for job in jobs {
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    let (result_tx, result_rx) = crossbeam_channel::unbounded();
    std::thread::scope(|scope| {
        for _ in 0..workers {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            scope.spawn(move || {
                for (position, source) in jobs.iter() {
                    let _ = results.send((position, validate_one(source, config)));
                }
            });
        }
    });
    drop(result_tx);

    return result_rx.iter().collect();
}

/// Validate a single file.
fn validate_one(source: &SourceFile, config: &Config) -> FileReport {
    let report = validate(&source.text, config);
    tracing::debug!(
        path = %source.path.display(),
        diagnostics = report.diagnostics.len(),
        ok = report.ok,
        "validated document"
    );
    return FileReport {
        digest: source.digest.clone(),
        path: source.path.clone(),
        report,
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "tests")]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use crate::scanner::digest;

    const GEOPY: &str = include_str!("../tests/fixtures/geopy/llm.txt");

    fn source(name: &str, text: &str) -> SourceFile {
        return SourceFile {
            digest: digest(text),
            path: PathBuf::from(name),
            text: text.to_string(),
        };
    }

    fn with_workers(workers: usize) -> Config {
        return Config::default().with_overrides(&Overrides {
            workers: Some(workers),
            ..Overrides::default()
        });
    }

    fn many() -> Vec<SourceFile> {
        return (0..12)
            .map(|i| {
                let text = if i % 3 == 0 { "no frontmatter\n".to_string() } else { GEOPY.to_string() };
                return source(&format!("doc{i:02}/llm.txt"), &text);
            })
            .collect();
    }

    #[test]
    fn output_order_matches_input_order() {
        let sources = many();
        let config = with_workers(4);
        let reports = validate_all(&sources, &config, &ReportCache::new());
        let paths: Vec<&PathBuf> = reports.iter().map(|r| return &r.path).collect();
        let expected: Vec<&PathBuf> = sources.iter().map(|s| return &s.path).collect();
        assert_eq!(paths, expected);
        assert!(!reports[0].report.ok);
        assert!(reports[1].report.ok);
    }

    #[test]
    fn worker_count_does_not_change_results() {
        let sources = many();
        let one = with_workers(1);
        let eight = with_workers(8);
        let empty = ReportCache::new();
        assert_eq!(validate_all(&sources, &one, &empty), validate_all(&sources, &eight, &empty));
    }

    #[test]
    fn unchanged_files_reuse_cached_reports() {
        let sources = vec![source("a/llm.txt", GEOPY)];
        let mut stale = validate_all(&sources, &Config::default(), &ReportCache::new()).remove(0);
        stale.report.diagnostics.clear();
        stale.report.ok = false;
        let mut cache = ReportCache::new();
        cache.refresh(std::slice::from_ref(&stale), &Config::default());

        let reused = validate_all(&sources, &Config::default(), &cache);
        assert_eq!(reused[0], stale);

        let changed = vec![source("a/llm.txt", "changed\n")];
        let fresh = validate_all(&changed, &Config::default(), &cache);
        assert_ne!(fresh[0].digest, stale.digest);
        assert!(!fresh[0].report.diagnostics.is_empty());
    }

    #[test]
    fn config_change_invalidates_cached_reports() {
        // Core Concepts moved after Common Pitfalls.
        let start = GEOPY.find("## Core Concepts").unwrap();
        let end = GEOPY.find("## Common Pitfalls").unwrap();
        let index = GEOPY.find("## Index").unwrap();
        let reordered = format!(
            "{}{}{}{}",
            &GEOPY[..start],
            &GEOPY[end..index],
            &GEOPY[start..end],
            &GEOPY[index..]
        );
        let sources = vec![source("a/llm.txt", &reordered)];
        let strict = Config::default();
        let relaxed = Config::default().with_overrides(&Overrides {
            relaxed_order: true,
            ..Overrides::default()
        });

        let mut cache = ReportCache::new();
        let first = validate_all(&sources, &strict, &cache);
        cache.refresh(&first, &strict);

        let second = validate_all(&sources, &relaxed, &cache);
        let fresh = validate_all(&sources, &relaxed, &ReportCache::new());
        assert_eq!(second, fresh);
        assert_ne!(first, second);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(validate_all(&[], &Config::default(), &ReportCache::new()).is_empty());
    }
}
