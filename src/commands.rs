//! Core CLI commands for llmtxt: check and symbols.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::batch::{FileReport, ReportCache, validate_all};
use crate::config::{Config, Overrides};
use crate::diagnostics::{self, OutputFormat};
use crate::error::Error;
use crate::parser::parse;
use crate::scanner;
use crate::symbols::build_tables;
use crate::types::{SymbolTable, SymbolKind};

/// Exit code when any document has an error diagnostic.
const EXIT_ERRORS: u8 = 2;
/// Exit code when warnings are present and denied.
const EXIT_WARNINGS: u8 = 1;

/// Load config, discover documents, and validate them.
/// Unchanged files reuse their report from `cache` when the config is also
/// unchanged; `cache` then holds this run's reports.
///
/// # Errors
///
/// Returns errors from config loading, discovery, or reading documents.
pub fn run_batch(
    paths: &[PathBuf],
    overrides: &Overrides,
    cache: &mut ReportCache,
) -> Result<Vec<FileReport>, Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?.with_overrides(overrides);
    let found = scanner::discover(paths, &config)?;
    let sources = scanner::read_sources(&found)?;
    let reports = validate_all(&sources, &config, cache);
    cache.refresh(&reports, &config);
    return Ok(reports);
}

/// Validate documents and print the results.
///
/// # Errors
///
/// Returns errors from config loading, discovery, reading, or rendering.
pub fn check(
    paths: &[PathBuf],
    overrides: &Overrides,
    format: OutputFormat,
    deny_warnings: bool,
) -> Result<ExitCode, Error> {
    let reports = run_batch(paths, overrides, &mut ReportCache::new())?;
    print!("{}", diagnostics::render_reports(&reports, format)?);
    return Ok(exit_code(&reports, deny_warnings));
}

/// Exit code priority: errors (2) > denied warnings (1) > clean (0).
pub fn exit_code(reports: &[FileReport], deny_warnings: bool) -> ExitCode {
    if reports.iter().any(|r| return r.report.has_errors()) {
        return ExitCode::from(EXIT_ERRORS);
    }
    if deny_warnings && reports.iter().any(|r| return r.report.has_warnings()) {
        return ExitCode::from(EXIT_WARNINGS);
    }
    return ExitCode::SUCCESS;
}

/// Both tables of one document, for `symbols --json`.
#[derive(Serialize)]
struct SymbolsJson<'a> {
    index: &'a SymbolTable,
    module: &'a SymbolTable,
}

/// Print the Index and Module Section symbol tables of one document.
/// A document that cannot be parsed prints its fatal diagnostic and exits 2.
///
/// # Errors
///
/// Returns `Error::FileNotFound`, `Error::Io`, or `Error::Json`.
pub fn symbols(file: &Path, json: bool) -> Result<ExitCode, Error> {
    let source = scanner::read_source(file)?;
    let document = match parse(&source.text) {
        Ok(document) => document,
        Err(failure) => {
            let d = failure.diagnostic;
            eprintln!("{}:{}: {}[{}] {}", file.display(), d.span.start, d.severity.as_str(), d.code, d.message);
            return Ok(ExitCode::from(EXIT_ERRORS));
        },
    };

    let tables = build_tables(&document);
    tracing::debug!(
        index = tables.index.symbol_count(),
        module = tables.module.symbol_count(),
        "built symbol tables"
    );

    if json {
        let out = SymbolsJson { index: &tables.index, module: &tables.module };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render_table("Index", &tables.index));
        println!();
        print!("{}", render_table("Module Sections", &tables.module));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Plain-text listing of one table, grouped by module.
fn render_table(title: &str, table: &SymbolTable) -> String {
    let mut out = format!("{title}: {} symbols\n", table.symbol_count());
    if table.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    for (module, symbols) in table.iter() {
        let _ = writeln!(out, "  {module} (line {})", symbols.span);
        for entry in &symbols.entries {
            let indent = if entry.kind == SymbolKind::Method { "      " } else { "    " };
            let _ = writeln!(
                out,
                "{indent}{:<9} {}{}",
                entry.kind.label(),
                entry.qualified_name(),
                entry.signature.as_deref().unwrap_or("")
            );
        }
    }
    return out;
}
