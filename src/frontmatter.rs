//! Field-level checks on the YAML header block.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::Config;
use crate::types::{Code, Diagnostic, FRONTMATTER_KEYS, FieldValue, Frontmatter, LineSpan};

/// Dotted numeric version with an optional pre-release or build suffix:
/// `1.2.3`, `2.0b1`, `1.0.0-rc.1`, `1.2.3.dev4`, `1.0+local`.
static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^\d+(\.\d+)*([-+.]?[0-9A-Za-z]+([.\-+][0-9A-Za-z]+)*)?$")
        .expect("valid regex");
});

/// Validate the frontmatter of a document.
///
/// A missing block yields a single `MissingFrontmatter` error and no
/// field-level diagnostics. Unrecognized keys are kept and never reported.
pub fn validate_frontmatter(frontmatter: Option<&Frontmatter>, config: &Config) -> Vec<Diagnostic> {
    let Some(frontmatter) = frontmatter else {
        return vec![Diagnostic::error(
            Code::MissingFrontmatter,
            LineSpan::line(1),
            "document has no YAML frontmatter; start it with a `---` block declaring package, version, language and summary",
        )];
    };

    let mut diagnostics = Vec::new();
    let block = frontmatter.span;

    for key in FRONTMATTER_KEYS {
        let Some(field) = frontmatter.fields.get(key) else {
            diagnostics.push(Diagnostic::error(
                Code::MissingFrontmatterField,
                block,
                format!("frontmatter is missing required field `{key}`"),
            ));
            continue;
        };
        let span = LineSpan::line(field.line);
        let FieldValue::Text(value) = &field.value else {
            diagnostics.push(Diagnostic::error(
                Code::InvalidFieldType,
                span,
                format!("frontmatter field `{key}` must be a single value, not a list or mapping"),
            ));
            continue;
        };
        if let Some(diagnostic) = check_value(key, value.trim(), span, config) {
            diagnostics.push(diagnostic);
        }
    }

    return diagnostics;
}

/// Value-level check for one recognized key.
fn check_value(key: &str, value: &str, span: LineSpan, config: &Config) -> Option<Diagnostic> {
    return match key {
        "language" if !config.accepts_language(value) => {
            let accepted: Vec<&str> = config.accepted_languages.iter().map(String::as_str).collect();
            Some(Diagnostic::warning(
                Code::UnexpectedLanguage,
                span,
                format!("language `{value}` is not one of the accepted languages ({})", accepted.join(", ")),
            ))
        },
        "version" if !VERSION.is_match(value) => Some(Diagnostic::warning(
            Code::InvalidVersion,
            span,
            format!("version `{value}` is not a dotted numeric version such as `1.2.3`"),
        )),
        "summary" if value.is_empty() => Some(Diagnostic::warning(
            Code::EmptySummary,
            span,
            "frontmatter `summary` is empty",
        )),
        _ => None,
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "tests")]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check(frontmatter: &str) -> Vec<Diagnostic> {
        let doc = parse(&format!("---\n{frontmatter}---\n\n# t\n")).unwrap();
        return validate_frontmatter(doc.frontmatter.as_ref(), &Config::default());
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<Code> {
        return diagnostics.iter().map(|d| return d.code).collect();
    }

    #[test]
    fn complete_frontmatter_is_clean() {
        let d = check("package: geopy\nversion: 2.4.1\nlanguage: python\nsummary: Geocoding.\nextra: kept\n");
        assert!(d.is_empty(), "{d:?}");
    }

    #[test]
    fn missing_frontmatter_is_one_error() {
        let doc = parse("# t\n\n## Index\n").unwrap();
        let d = validate_frontmatter(doc.frontmatter.as_ref(), &Config::default());
        assert_eq!(codes(&d), vec![Code::MissingFrontmatter]);
    }

    #[test]
    fn each_missing_key_is_reported() {
        let d = check("package: geopy\nlanguage: python\n");
        assert_eq!(codes(&d), vec![Code::MissingFrontmatterField, Code::MissingFrontmatterField]);
        assert!(d[0].message.contains("`version`"));
        assert!(d[1].message.contains("`summary`"));
    }

    #[test]
    fn structured_value_is_invalid() {
        let d = check("package: [a, b]\nversion: 1.0\nlanguage: python\nsummary: s\n");
        assert_eq!(codes(&d), vec![Code::InvalidFieldType]);
        assert_eq!(d[0].span, LineSpan::line(2));
    }

    #[test]
    fn language_is_case_insensitive() {
        assert!(check("package: p\nversion: 1.0\nlanguage: Python\nsummary: s\n").is_empty());
        let d = check("package: p\nversion: 1.0\nlanguage: cobol\nsummary: s\n");
        assert_eq!(codes(&d), vec![Code::UnexpectedLanguage]);
    }

    #[test]
    fn version_shapes() {
        for ok in ["1", "1.2.3", "2.0b1", "1.0.0-rc.1", "1.2.3.dev4", "1.0+local"] {
            assert!(VERSION.is_match(ok), "{ok}");
        }
        for bad in ["v1.0", "latest", "1..2", ""] {
            assert!(!VERSION.is_match(bad), "{bad}");
        }
    }

    #[test]
    fn invalid_version_warns_at_its_line() {
        let d = check("package: p\nversion: latest\nlanguage: python\nsummary: s\n");
        assert_eq!(codes(&d), vec![Code::InvalidVersion]);
        assert_eq!(d[0].severity, crate::types::Severity::Warning);
        assert_eq!(d[0].span, LineSpan::line(3));
        assert!(d[0].message.contains("`latest`"));
    }

    #[test]
    fn blank_summary_warns() {
        let d = check("package: p\nversion: 1.0\nlanguage: python\nsummary: \"  \"\n");
        assert_eq!(codes(&d), vec![Code::EmptySummary]);
    }
}
