use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{self, CONFIG_FILE};
use crate::types::Code;

/// Output the llmtxt reference document.
pub fn run(json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state);
    } else {
        print!("{}", render_markdown(&state));
    }
}

// ── Catalogue ─────────────────────────────────────────────────────────

/// Severity a code is reported with. Some depend on the section or config.
const fn usual_severity(code: Code) -> &'static str {
    return match code {
        Code::MalformedFrontmatter
        | Code::UnterminatedCodeBlock
        | Code::MissingFrontmatter
        | Code::MissingFrontmatterField
        | Code::InvalidFieldType
        | Code::MalformedIndex
        | Code::MissingObjectHeaders
        | Code::UndocumentedSymbol
        | Code::DuplicateSymbol
        | Code::ModuleMismatch => "error",
        Code::UnexpectedLanguage
        | Code::InvalidVersion
        | Code::EmptySummary
        | Code::DuplicateSection
        | Code::UnrecognizedObjectHeader
        | Code::UnlistedSymbol
        | Code::KindMismatch
        | Code::MissingExampleCode
        | Code::UnknownSymbolReference => "warning",
        Code::SectionOutOfOrder => "warning (info with relaxed order)",
        Code::UnknownSection => "info",
        Code::MissingSection | Code::EmptySection => "by section",
    };
}

/// One-line explanation of a code.
const fn describe(code: Code) -> &'static str {
    return match code {
        Code::MalformedFrontmatter => "Frontmatter is unterminated or not a YAML mapping; nothing else is checked",
        Code::UnterminatedCodeBlock => "A fenced code block is still open at end of file; nothing else is checked",
        Code::MissingFrontmatter => "The document does not start with a `---` frontmatter block",
        Code::MissingFrontmatterField => "`package`, `version`, `language` or `summary` is absent",
        Code::InvalidFieldType => "A recognized frontmatter key holds a list or mapping instead of text",
        Code::UnexpectedLanguage => "`language` is not in `accepted_languages`",
        Code::InvalidVersion => "`version` is not a dotted numeric version such as `2.4.1`",
        Code::EmptySummary => "`summary` is blank",
        Code::MissingSection => "A required or recommended section is absent",
        Code::DuplicateSection => "A section or module section appears more than once",
        Code::SectionOutOfOrder => "A section appears before one that should precede it",
        Code::UnknownSection => "A header or preamble text does not belong to a known section",
        Code::MalformedIndex => "The Index is not a nested list of module bullets with category lines",
        Code::MissingObjectHeaders => "A Module Section has no level-4 object headers",
        Code::MissingExampleCode => "Global Examples has no fenced code block",
        Code::EmptySection => "Core Concepts or Common Pitfalls has no content",
        Code::UnrecognizedObjectHeader => "A level-4 header is not `class`, `Function:` or `exception`, or a method header sits under the wrong class",
        Code::UndocumentedSymbol => "A symbol listed in the Index has no header in its Module Section",
        Code::UnlistedSymbol => "A documented symbol is not listed in the Index",
        Code::DuplicateSymbol => "A symbol is declared twice in the Index or in the Module Sections",
        Code::ModuleMismatch => "A module appears in only one of the Index and the Module Sections",
        Code::KindMismatch => "A symbol is listed and documented as different kinds",
        Code::UnknownSymbolReference => "A dotted name in example code resolves to nothing documented",
    };
}

/// Exit codes shared by `check`, `watch` and `symbols`.
const EXIT_CODES: [(u8, &str); 4] = [
    (0, "Success: no errors (and no warnings with `--deny-warnings`)"),
    (1, "Warnings found with `--deny-warnings`"),
    (2, "Errors found"),
    (3, "Runtime error"),
];

// ── State gathering ───────────────────────────────────────────────────

/// Config as seen from the working directory.
struct CurrentState {
    /// Accepted languages, sorted.
    accepted_languages: Vec<String>,
    /// Load failure, when the file exists but is unusable.
    config_error: Option<String>,
    /// Whether `.llmtxt.toml` exists.
    config_found: bool,
    /// Configured allowlist, sorted.
    reference_allowlist: Vec<String>,
    /// Whether out-of-order sections are warnings.
    strict_order: bool,
    /// Configured worker count.
    workers: usize,
}

/// Load what the current config says, falling back to defaults on failure.
fn gather_state(root: &Path) -> CurrentState {
    let config_found = root.join(CONFIG_FILE).exists();
    let (config, config_error) = match config::Config::load(root) {
        Ok(c) => (c, None),
        Err(e) => (config::Config::default(), Some(e.to_string())),
    };

    return CurrentState {
        accepted_languages: config.accepted_languages.iter().cloned().collect(),
        config_error,
        config_found,
        reference_allowlist: config.reference_allowlist.iter().cloned().collect(),
        strict_order: config.strict_order,
        workers: config.workers,
    };
}

// ── Markdown output ───────────────────────────────────────────────────

/// The full reference document.
fn render_markdown(state: &CurrentState) -> String {
    let version = env!("CARGO_PKG_VERSION");
    let mut out = format!(
        "\
# llmtxt {version}

Conformance checker for llm.txt documents: frontmatter, section schema,
Index versus Module Section cross-references, and names used in example code.

## Workflow

    llmtxt check [PATHS..]            Validate documents (exit 0/1/2)
    llmtxt check --format json        Machine-readable results
    llmtxt watch [PATHS..]            Re-check whenever a document changes
    llmtxt symbols <FILE>             Show the Index and Module Section tables
    llmtxt allow add <NAME>           Never check references starting with NAME

Documents are files named `llm.txt`, `llms.txt` or `<name>.llm.txt`.

## Configuration ({CONFIG_FILE})

    include = [\"docs/\"]                 # only scan these paths
    exclude = [\"docs/archive/\"]         # skip these paths
    accepted_languages = [\"python\"]
    reference_allowlist = [\"httpx\"]     # merged with the built-in list
    strict_order = true
    workers = 0                         # 0 = available parallelism

## Diagnostic Codes

| Code | Severity | Meaning |
|------|----------|---------|
"
    );
    for code in Code::ALL {
        let _ = writeln!(out, "| {code} | {} | {} |", usual_severity(code), describe(code));
    }

    out.push_str("\n## Exit Codes\n\n| Code | Meaning |\n|------|---------|\n");
    for (code, meaning) in EXIT_CODES {
        let _ = writeln!(out, "| {code}    | {meaning} |");
    }

    out.push_str("\n## Current State\n\n");
    out.push_str(&render_state(state));
    return out;
}

/// The `Current State` lines.
fn render_state(state: &CurrentState) -> String {
    let mut out = String::new();
    let found = if state.config_found { "found" } else { "not found" };
    let _ = writeln!(out, "Config:     {CONFIG_FILE} ({found})");
    if let Some(error) = &state.config_error {
        let _ = writeln!(out, "Problem:    {error}");
    }
    let _ = writeln!(out, "Languages:  {}", state.accepted_languages.join(", "));
    if state.reference_allowlist.is_empty() {
        out.push_str("Allowlist:  (built-in only)\n");
    } else {
        let _ = writeln!(out, "Allowlist:  {}", state.reference_allowlist.join(", "));
    }
    let order = if state.strict_order { "strict" } else { "relaxed" };
    let _ = writeln!(out, "Order:      {order}");
    if state.workers == 0 {
        out.push_str("Workers:    auto\n");
    } else {
        let _ = writeln!(out, "Workers:    {}", state.workers);
    }
    return out;
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    codes: Vec<CodeInfo>,
    current_state: StateJson,
    exit_codes: Vec<ExitCodeInfo>,
    version: String,
}

#[derive(Serialize)]
struct CodeInfo {
    code: String,
    description: String,
    severity: String,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    accepted_languages: Vec<String>,
    config_error: Option<String>,
    config_found: bool,
    reference_allowlist: Vec<String>,
    strict_order: bool,
    workers: usize,
}

/// Build the JSON form of the reference.
fn info_json(state: &CurrentState) -> InfoJson {
    return InfoJson {
        codes: Code::ALL
            .iter()
            .map(|code| {
                return CodeInfo {
                    code: code.as_str().to_string(),
                    description: describe(*code).to_string(),
                    severity: usual_severity(*code).to_string(),
                };
            })
            .collect(),
        current_state: StateJson {
            accepted_languages: state.accepted_languages.clone(),
            config_error: state.config_error.clone(),
            config_found: state.config_found,
            reference_allowlist: state.reference_allowlist.clone(),
            strict_order: state.strict_order,
            workers: state.workers,
        },
        exit_codes: EXIT_CODES
            .iter()
            .map(|(code, meaning)| return ExitCodeInfo { code: *code, meaning: (*meaning).to_string() })
            .collect(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
}

fn print_json(state: &CurrentState) {
    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info_json(state)).unwrap_or_default();
    println!("{json}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn markdown_lists_every_code() {
        let dir = tempfile::tempdir().unwrap();
        let md = render_markdown(&gather_state(dir.path()));
        for code in Code::ALL {
            assert!(md.contains(&format!("| {code} |")), "missing {code}");
        }
        assert!(md.contains("| 3    | Runtime error |"));
        assert!(md.contains("Config:     .llmtxt.toml (not found)"));
    }

    #[test]
    fn state_reflects_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "reference_allowlist = [\"httpx\"]\nstrict_order = false\nworkers = 2\n",
        )
        .unwrap();
        let out = render_state(&gather_state(dir.path()));
        assert!(out.contains("(found)"));
        assert!(out.contains("Allowlist:  httpx"));
        assert!(out.contains("Order:      relaxed"));
        assert!(out.contains("Workers:    2"));
    }

    #[test]
    fn broken_config_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "strict = 1\n").unwrap();
        let state = gather_state(dir.path());
        assert!(state.config_error.is_some());
        assert_eq!(state.accepted_languages, vec!["python"]);
    }

    #[test]
    fn json_has_codes_and_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let value = serde_json::to_value(info_json(&gather_state(dir.path()))).unwrap();
        assert_eq!(value["codes"].as_array().unwrap().len(), Code::ALL.len());
        assert_eq!(value["exit_codes"][2]["code"], 2);
        assert_eq!(value["current_state"]["strict_order"], true);
    }
}
