use std::fmt::Write as _;

use serde::Serialize;

use crate::batch::FileReport;
use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::types::{Diagnostic, Severity};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// How `check` renders its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// `path:line: severity[Code] message`, one per line.
    #[default]
    Text,
    /// A markdown document with one heading per file.
    Markdown,
    /// Machine-readable JSON.
    Json,
}

/// JSON envelope for a batch run.
#[derive(Serialize)]
struct BatchOutput<'a> {
    files: &'a [FileReport],
    ok: bool,
}

/// Totals across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Number of error diagnostics.
    pub errors: usize,
    /// Number of files checked.
    pub files: usize,
    /// Number of info diagnostics.
    pub infos: usize,
    /// Number of warning diagnostics.
    pub warnings: usize,
}

impl Totals {
    /// Count diagnostics by severity across every report.
    pub fn of(reports: &[FileReport]) -> Self {
        let mut totals = Self {
            files: reports.len(),
            ..Self::default()
        };
        for diagnostic in reports.iter().flat_map(|r| return &r.report.diagnostics) {
            let slot = match diagnostic.severity {
                Severity::Error => &mut totals.errors,
                Severity::Warning => &mut totals.warnings,
                Severity::Info => &mut totals.infos,
            };
            *slot = slot.saturating_add(1);
        }
        return totals;
    }
}

/// Render a batch of reports in the requested format.
///
/// # Errors
///
/// Returns `Error::Json` if JSON serialization fails.
pub fn render_reports(reports: &[FileReport], format: OutputFormat) -> Result<String, Error> {
    return match format {
        OutputFormat::Text => Ok(render_text(reports)),
        OutputFormat::Markdown => Ok(render_markdown(reports)),
        OutputFormat::Json => {
            let ok = reports.iter().all(|r| return r.report.ok);
            let mut out = serde_json::to_string_pretty(&BatchOutput { files: reports, ok })?;
            out.push('\n');
            Ok(out)
        },
    };
}

/// One line per diagnostic, then a summary line.
fn render_text(reports: &[FileReport]) -> String {
    let mut out = String::new();
    for file in reports {
        for d in &file.report.diagnostics {
            let _ = writeln!(
                out,
                "{}:{}: {}[{}] {}",
                file.path.display(),
                d.span.start,
                d.severity.as_str(),
                d.code,
                d.message
            );
        }
    }
    let _ = writeln!(out, "{}", summary(&Totals::of(reports)));
    return out;
}

/// A markdown document: one section per file with problems.
fn render_markdown(reports: &[FileReport]) -> String {
    let totals = Totals::of(reports);
    let mut out = String::from("# llm.txt check\n\n");
    let _ = writeln!(out, "{}\n", summary(&totals));

    for file in reports.iter().filter(|r| return !r.report.diagnostics.is_empty()) {
        let verdict = if file.report.ok { "passes" } else { "fails" };
        let _ = writeln!(out, "## `{}` ({verdict})\n", file.path.display());
        for d in &file.report.diagnostics {
            let _ = writeln!(out, "{}", markdown_item(d));
        }
        out.push('\n');
    }
    return out;
}

/// `- **error** `Code` (line N): message`.
fn markdown_item(d: &Diagnostic) -> String {
    return format!(
        "- **{}** `{}` (line {}): {}",
        d.severity.as_str(),
        d.code,
        d.span,
        d.message
    );
}

/// `Checked 3 files: 1 error, 2 warnings, 0 info`.
fn summary(totals: &Totals) -> String {
    return format!(
        "Checked {} {}: {} {}, {} {}, {} info",
        totals.files,
        if totals.files == 1 { "file" } else { "files" },
        totals.errors,
        if totals.errors == 1 { "error" } else { "errors" },
        totals.warnings,
        if totals.warnings == 1 { "warning" } else { "warnings" },
        totals.infos,
    );
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render a runtime error as a structured markdown block: what happened,
/// and how to fix it when there is a known fix.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::ConfigInvalid { path, reason } => format!(
            "\
# Error: Invalid Config

`{}`: {reason}

## Fix

Correct the value, or delete the file to use the defaults.
",
            path.display()
        ),
        Error::FileNotFound { path } => format!(
            "\
# Error: File Not Found

`{}` does not exist.
",
            path.display()
        ),
        Error::InvalidAllowlistName { name } => format!(
            "\
# Error: Invalid Allowlist Name

`{name}` is not an identifier. The allowlist matches the first segment of a
dotted reference, such as `requests` in `requests.get`.
"
        ),
        Error::NoDocumentsFound { .. } => format!(
            "\
# Error: No Documents Found

{e}

## Fix

Name documents `llm.txt`, `llms.txt` or `<name>.llm.txt`, or pass the file
paths explicitly:

    llmtxt check path/to/llm.txt

Check the `include` and `exclude` prefixes in `{CONFIG_FILE}`.
"
        ),
        Error::TomlDe(err) => format!(
            "\
# Error: Invalid TOML

{err}

## Fix

Valid keys in `{CONFIG_FILE}` are `include`, `exclude`, `accepted_languages`,
`reference_allowlist`, `strict_order` and `workers`.
"
        ),
        Error::TomlEdit(err) => format!(
            "\
# Error: Invalid TOML

`{CONFIG_FILE}` could not be parsed for editing: {err}
"
        ),
        Error::WatchFailed { reason } => format!(
            "\
# Error: Watch Failed

{reason}
"
        ),
        Error::Io(err) => format!(
            "\
# Error: I/O

{err}
"
        ),
        Error::Json(err) => format!(
            "\
# Error: JSON Output

{err}
"
        ),
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::report::Report;
    use crate::types::{Code, LineSpan};

    fn sample() -> Vec<FileReport> {
        return vec![
            FileReport {
                digest: "d1".to_string(),
                path: PathBuf::from("docs/llm.txt"),
                report: Report::from_diagnostics(vec![
                    Diagnostic::error(Code::UndocumentedSymbol, LineSpan::line(12), "`m.f` has no header"),
                    Diagnostic::warning(Code::UnlistedSymbol, LineSpan::line(40), "`m.g` is unlisted"),
                ]),
            },
            FileReport {
                digest: "d2".to_string(),
                path: PathBuf::from("clean/llm.txt"),
                report: Report::from_diagnostics(Vec::new()),
            },
        ];
    }

    #[test]
    fn text_lists_locations_and_summary() {
        let out = render_reports(&sample(), OutputFormat::Text).unwrap();
        assert!(out.contains("docs/llm.txt:12: error[UndocumentedSymbol] `m.f` has no header"));
        assert!(out.contains("docs/llm.txt:40: warning[UnlistedSymbol]"));
        assert!(out.ends_with("Checked 2 files: 1 error, 1 warning, 0 info\n"));
    }

    #[test]
    fn markdown_groups_by_file() {
        let out = render_reports(&sample(), OutputFormat::Markdown).unwrap();
        assert!(out.starts_with("# llm.txt check\n"));
        assert!(out.contains("## `docs/llm.txt` (fails)"));
        assert!(out.contains("- **error** `UndocumentedSymbol` (line 12):"));
        assert!(!out.contains("clean/llm.txt"));
    }

    #[test]
    fn json_is_parseable() {
        let out = render_reports(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["files"][0]["diagnostics"][0]["code"], "UndocumentedSymbol");
        assert_eq!(value["files"][0]["diagnostics"][0]["severity"], "error");
        assert_eq!(value["files"][0]["diagnostics"][0]["span"]["start"], 12);
        assert_eq!(value["files"][1]["ok"], true);
    }

    #[test]
    fn totals_count_by_severity() {
        let totals = Totals::of(&sample());
        assert_eq!(totals, Totals { errors: 1, files: 2, infos: 0, warnings: 1 });
    }

    #[test]
    fn errors_render_as_markdown() {
        let md = render_error(&Error::InvalidAllowlistName { name: "a.b".to_string() });
        assert!(md.starts_with("# Error: Invalid Allowlist Name"));
        assert!(md.contains("`a.b`"));
    }
}
