//! The validation pipeline and its result.

use serde::Serialize;

use crate::config::Config;
use crate::frontmatter::validate_frontmatter;
use crate::parser::parse;
use crate::references::check_references;
use crate::resolver::resolve;
use crate::schema::validate_sections;
use crate::symbols::build_tables;
use crate::types::{Diagnostic, Severity};

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Every diagnostic, ordered by line, then severity, then code.
    pub diagnostics: Vec<Diagnostic>,
    /// True when no diagnostic has error severity.
    pub ok: bool,
}

impl Report {
    /// Build a report from diagnostics in any order.
    pub fn from_diagnostics(mut diagnostics: Vec<Diagnostic>) -> Self {
        diagnostics.sort_by(|a, b| {
            return a
                .span
                .start
                .cmp(&b.span.start)
                .then(a.severity.cmp(&b.severity))
                .then_with(|| return a.code.as_str().cmp(b.code.as_str()));
        });
        let ok = !diagnostics.iter().any(|d| return d.severity == Severity::Error);
        return Self { diagnostics, ok };
    }

    /// Number of diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        return self.diagnostics.iter().filter(|d| return d.severity == severity).count();
    }

    /// Whether any diagnostic is an error.
    pub const fn has_errors(&self) -> bool {
        return !self.ok;
    }

    /// Whether any diagnostic is a warning.
    pub fn has_warnings(&self) -> bool {
        return self.count(Severity::Warning) > 0;
    }
}

/// Validate one document.
///
/// A fatal parse failure yields a report holding only that diagnostic.
/// Otherwise every pass runs and their diagnostics are concatenated.
pub fn validate(text: &str, config: &Config) -> Report {
    let document = match parse(text) {
        Ok(document) => document,
        Err(failure) => {
            tracing::debug!(code = %failure.diagnostic.code, "fatal parse failure");
            return Report::from_diagnostics(vec![failure.diagnostic]);
        },
    };

    let tables = build_tables(&document);
    let mut diagnostics = document.diagnostics.clone();
    diagnostics.extend(validate_frontmatter(document.frontmatter.as_ref(), config));
    diagnostics.extend(validate_sections(&document.sections, config));
    diagnostics.extend(tables.diagnostics.iter().cloned());
    diagnostics.extend(resolve(&tables.index, &tables.module));
    diagnostics.extend(check_references(&document, &tables.index, &tables.module, config));

    return Report::from_diagnostics(diagnostics);
}
