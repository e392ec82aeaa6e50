//! Section-level schema: presence, order, and per-kind shape.

use crate::config::Config;
use crate::parser::parse_atx_heading;
use crate::symbols::parse_index_outline;
use crate::types::{Code, Diagnostic, LineSpan, Section, SectionKind, SectionStatus, Severity};

/// Shape validator for one section kind.
type ShapeCheck = fn(&Section, Severity) -> Vec<Diagnostic>;

/// A section the convention expects, with how loudly its absence is reported.
struct Expectation {
    /// Suggested header for the fix.
    example: &'static str,
    /// Whether a section satisfies the expectation.
    matches: fn(&SectionKind) -> bool,
    /// Decides the severity when absent.
    status: SectionStatus,
    /// Description used in the message.
    what: &'static str,
}

/// Sections checked for presence, in canonical order.
const EXPECTED: [Expectation; 5] = [
    Expectation {
        example: "## Core Concepts",
        matches: |k| return *k == SectionKind::CoreConcepts,
        status: SectionStatus::HighlyRecommended,
        what: "Core Concepts section",
    },
    Expectation {
        example: "## Common Pitfalls",
        matches: |k| return *k == SectionKind::Pitfalls,
        status: SectionStatus::Recommended,
        what: "Pitfalls section",
    },
    Expectation {
        example: "## Index",
        matches: |k| return *k == SectionKind::Index,
        status: SectionStatus::Required,
        what: "Index section",
    },
    Expectation {
        example: "### Module: <name>",
        matches: |k| return matches!(k, SectionKind::ModuleSection(_)),
        status: SectionStatus::Required,
        what: "Module Section (at least one is required)",
    },
    Expectation {
        example: "## Global Examples",
        matches: |k| return *k == SectionKind::GlobalExamples,
        status: SectionStatus::Recommended,
        what: "Global Examples section",
    },
];

/// Validate presence, canonical order, and shape of every section.
///
/// Sections are expected in document order. Unknown sections are skipped
/// here; the parser already records them.
pub fn validate_sections(sections: &[Section], config: &Config) -> Vec<Diagnostic> {
    let mut diagnostics = check_presence(sections);
    diagnostics.extend(check_duplicates(sections));
    diagnostics.extend(check_order(sections, config));
    for section in sections {
        if let Some(check) = shape_check(&section.kind) {
            diagnostics.extend(check(section, section.kind.status().shape_severity()));
        }
    }
    return diagnostics;
}

/// Per-kind shape validator lookup.
fn shape_check(kind: &SectionKind) -> Option<ShapeCheck> {
    return match kind {
        SectionKind::Index => Some(check_index),
        SectionKind::ModuleSection(_) => Some(check_module_section),
        SectionKind::GlobalExamples => Some(check_global_examples),
        SectionKind::CoreConcepts | SectionKind::Pitfalls => Some(check_not_empty),
        SectionKind::Frontmatter
        | SectionKind::Title
        | SectionKind::ModuleSections
        | SectionKind::Unknown(_) => None,
    };
}

/// Severity of a missing section, by its status.
const fn missing_severity(status: SectionStatus) -> Option<Severity> {
    return match status {
        SectionStatus::Required => Some(Severity::Error),
        SectionStatus::HighlyRecommended => Some(Severity::Warning),
        SectionStatus::Recommended => Some(Severity::Info),
        SectionStatus::Optional => None,
    };
}

/// Report expected sections that never appear.
fn check_presence(sections: &[Section]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for expected in &EXPECTED {
        if sections.iter().any(|s| return (expected.matches)(&s.kind)) {
            continue;
        }
        let Some(severity) = missing_severity(expected.status) else {
            continue;
        };
        diagnostics.push(Diagnostic::new(
            severity,
            Code::MissingSection,
            LineSpan::line(1),
            format!("document has no {}; add `{}`", expected.what, expected.example),
        ));
    }
    return diagnostics;
}

/// Report a second occurrence of a section that may appear only once.
fn check_duplicates(sections: &[Section]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut seen: Vec<(&SectionKind, LineSpan)> = Vec::new();
    let mut modules: Vec<(&str, LineSpan)> = Vec::new();

    for section in sections {
        match &section.kind {
            SectionKind::Unknown(_) => {},
            SectionKind::ModuleSection(name) => {
                if let Some((_, first)) = modules.iter().find(|(n, _)| return *n == name.as_str()) {
                    diagnostics.push(Diagnostic::warning(
                        Code::DuplicateSection,
                        LineSpan::line(section.span.start),
                        format!("module `{name}` already has a section at line {}", first.start),
                    ));
                } else {
                    modules.push((name.as_str(), section.span));
                }
            },
            kind => {
                if let Some((_, first)) = seen.iter().find(|(k, _)| return *k == kind) {
                    diagnostics.push(Diagnostic::warning(
                        Code::DuplicateSection,
                        LineSpan::line(section.span.start),
                        format!(
                            "{} section appears more than once; the first is at line {}",
                            kind.label(),
                            first.start
                        ),
                    ));
                } else {
                    seen.push((kind, section.span));
                }
            },
        }
    }
    return diagnostics;
}

/// Report sections that come before one they should follow.
fn check_order(sections: &[Section], config: &Config) -> Vec<Diagnostic> {
    let severity = if config.strict_order {
        Severity::Warning
    } else {
        Severity::Info
    };
    let mut diagnostics = Vec::new();
    let mut latest: Option<(u8, &Section)> = None;

    for section in sections {
        let Some(rank) = section.kind.rank() else {
            continue;
        };
        match latest {
            Some((highest, after)) if rank < highest => {
                diagnostics.push(Diagnostic::new(
                    severity,
                    Code::SectionOutOfOrder,
                    LineSpan::line(section.span.start),
                    format!(
                        "{} section should come before {} (line {})",
                        section.kind.label(),
                        after.kind.label(),
                        after.span.start
                    ),
                ));
            },
            Some(_) | None => latest = Some((rank, section)),
        }
    }
    return diagnostics;
}

/// Index must be a nested list of modules and their symbols.
fn check_index(section: &Section, severity: Severity) -> Vec<Diagnostic> {
    return parse_index_outline(section)
        .problems
        .into_iter()
        .map(|problem| {
            return Diagnostic::new(severity, Code::MalformedIndex, LineSpan::line(problem.line), problem.message);
        })
        .collect();
}

/// A Module Section must declare at least one object.
fn check_module_section(section: &Section, severity: Severity) -> Vec<Diagnostic> {
    let has_object = section
        .prose_lines()
        .any(|line| return parse_atx_heading(&line.text).is_some_and(|(level, _)| return level == 4));
    if has_object {
        return Vec::new();
    }
    return vec![Diagnostic::new(
        severity,
        Code::MissingObjectHeaders,
        LineSpan::line(section.span.start),
        format!(
            "{} declares no objects; add `#### class Name(...)` or `#### Function: name(...)` headers",
            section.kind.label()
        ),
    )];
}

/// Global Examples must contain code.
fn check_global_examples(section: &Section, severity: Severity) -> Vec<Diagnostic> {
    if !section.code_blocks.is_empty() {
        return Vec::new();
    }
    return vec![Diagnostic::new(
        severity,
        Code::MissingExampleCode,
        LineSpan::line(section.span.start),
        "Global Examples has no fenced code block",
    )];
}

/// Prose sections must say something.
fn check_not_empty(section: &Section, severity: Severity) -> Vec<Diagnostic> {
    if section.has_content() {
        return Vec::new();
    }
    return vec![Diagnostic::new(
        severity,
        Code::EmptySection,
        LineSpan::line(section.span.start),
        format!("{} section is empty", section.kind.label()),
    )];
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "tests")]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use crate::parser::parse;

    const HEADER: &str = "---\npackage: p\nversion: 1.0\nlanguage: python\nsummary: s\n---\n\n# p\n\n";

    fn check_with(body: &str, config: &Config) -> Vec<Diagnostic> {
        let doc = parse(&format!("{HEADER}{body}")).unwrap();
        return validate_sections(&doc.sections, config);
    }

    fn check(body: &str) -> Vec<Diagnostic> {
        return check_with(body, &Config::default());
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<(Code, Severity)> {
        return diagnostics.iter().map(|d| return (d.code, d.severity)).collect();
    }

    const COMPLETE: &str = "## Core Concepts\n\n- c\n\n## Pitfalls\n\n- p\n\n## Index\n\n- **p**\n  - Functions: `f`\n\n## Module Sections\n\n### Module: p\n\n#### Function: f()\n\n## Global Examples\n\n```python\nf()\n```\n";

    #[test]
    fn complete_document_is_clean() {
        let d = check(COMPLETE);
        assert!(d.is_empty(), "{d:?}");
    }

    #[test]
    fn missing_sections_by_status() {
        let d = check("## Core Concepts\n\n- c\n");
        assert_eq!(
            codes(&d),
            vec![
                (Code::MissingSection, Severity::Info),
                (Code::MissingSection, Severity::Error),
                (Code::MissingSection, Severity::Error),
                (Code::MissingSection, Severity::Info),
            ]
        );
        assert_eq!(d[1].message, "document has no Index section; add `## Index`");
        let d = check("## Index\n\n- **p**\n  - Functions: `f`\n\n### Module: p\n\n#### Function: f()\n");
        assert_eq!(codes(&d)[0], (Code::MissingSection, Severity::Warning));
        assert!(d[0].message.starts_with("document has no Core Concepts section;"));
    }

    #[test]
    fn out_of_order_sections() {
        let body = COMPLETE.replace("## Core Concepts\n\n- c\n\n", "") + "\n## Core Concepts\n\n- c\n";
        let d = check(&body);
        assert_eq!(codes(&d), vec![(Code::SectionOutOfOrder, Severity::Warning)]);
        assert!(d[0].message.contains("Global Examples"));

        let relaxed = Config::default().with_overrides(&Overrides {
            relaxed_order: true,
            ..Overrides::default()
        });
        let d = check_with(&body, &relaxed);
        assert_eq!(codes(&d), vec![(Code::SectionOutOfOrder, Severity::Info)]);
    }

    #[test]
    fn unknown_sections_do_not_affect_order() {
        let body = COMPLETE.replace("## Index", "## Changelog\n\nx\n\n## Index");
        assert!(check(&body).is_empty());
    }

    #[test]
    fn duplicates_are_warned() {
        let body = format!("{COMPLETE}\n## Pitfalls\n\n- again\n");
        let d = check(&body);
        assert!(codes(&d).contains(&(Code::DuplicateSection, Severity::Warning)));
    }

    #[test]
    fn shape_checks() {
        let body = "## Core Concepts\n\n## Pitfalls\n\n- p\n\n## Index\n\n- **p**\n  - Functions: `f`\n\n### Module: p\n\nNo headers.\n\n## Global Examples\n\nNothing to run.\n";
        let d = check(body);
        assert_eq!(
            codes(&d),
            vec![
                (Code::EmptySection, Severity::Warning),
                (Code::MissingObjectHeaders, Severity::Error),
                (Code::MissingExampleCode, Severity::Warning),
            ]
        );
    }

    #[test]
    fn malformed_index_is_an_error_per_line() {
        let body = COMPLETE.replace("- **p**\n  - Functions: `f`", "- **p**\n  - Functions: `f`\n  - Things: `x`\n  - Stuff: `y`");
        let d = check(&body);
        assert_eq!(codes(&d), vec![(Code::MalformedIndex, Severity::Error), (Code::MalformedIndex, Severity::Error)]);
    }
}
