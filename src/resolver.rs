//! Cross-reference resolution between the Index table and the Module table.

use std::collections::{BTreeSet, HashMap};

use crate::types::{Code, Diagnostic, ModuleSymbols, SymbolEntry, SymbolKind, SymbolTable};

/// Which table a declaration came from, for messages.
#[derive(Debug, Clone, Copy)]
enum Origin {
    Index,
    Modules,
}

impl Origin {
    /// Where the declaration was written.
    const fn place(self) -> &'static str {
        return match self {
            Origin::Index => "the Index",
            Origin::Modules => "Module Sections",
        };
    }
}

/// Diff the two symbol tables.
///
/// Never mutates either table. Called twice on the same tables it returns
/// the same diagnostics in the same order.
pub fn resolve(index: &SymbolTable, modules: &SymbolTable) -> Vec<Diagnostic> {
    let mut diagnostics = duplicates(index, Origin::Index);
    diagnostics.extend(duplicates(modules, Origin::Modules));

    let names: BTreeSet<&str> = index.module_names().chain(modules.module_names()).collect();
    for name in names {
        match (index.get(name), modules.get(name)) {
            (Some(listed), Some(documented)) => {
                diagnostics.extend(compare_module(name, listed, documented));
            },
            (Some(listed), None) => diagnostics.extend(index_only(name, listed)),
            (None, Some(documented)) => diagnostics.extend(modules_only(name, documented)),
            (None, None) => {},
        }
    }

    tracing::debug!(diagnostics = diagnostics.len(), "resolved symbol tables");
    return diagnostics;
}

/// `DuplicateSymbol` for every repeated qualified name of the same kind.
fn duplicates(table: &SymbolTable, origin: Origin) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (module, symbols) in table.iter() {
        let mut first_seen: HashMap<(String, SymbolKind), u32> = HashMap::new();
        for entry in &symbols.entries {
            let key = (entry.qualified_name(), entry.kind);
            if let Some(line) = first_seen.get(&key) {
                diagnostics.push(Diagnostic::error(
                    Code::DuplicateSymbol,
                    entry.span,
                    format!(
                        "{} `{}` is declared more than once in {} for module `{module}`; first at line {line}",
                        entry.kind.label(),
                        entry.qualified_name(),
                        origin.place(),
                    ),
                ));
            } else {
                first_seen.insert(key, entry.span.start);
            }
        }
    }
    return diagnostics;
}

/// A module listed in the Index with no Module Section.
fn index_only(name: &str, listed: &ModuleSymbols) -> Vec<Diagnostic> {
    let mut diagnostics = vec![Diagnostic::error(
        Code::ModuleMismatch,
        listed.span,
        format!("module `{name}` is listed in the Index but has no `### Module: {name}` section"),
    )];
    if !listed.entries.is_empty() {
        diagnostics.push(Diagnostic::error(
            Code::UndocumentedSymbol,
            listed.span,
            format!(
                "{} listed for module `{name}` are not documented: {}",
                plural(listed.entries.len(), "symbol"),
                symbol_list(&listed.entries)
            ),
        ));
    }
    return diagnostics;
}

/// A Module Section whose module the Index never lists.
fn modules_only(name: &str, documented: &ModuleSymbols) -> Vec<Diagnostic> {
    let mut diagnostics = vec![Diagnostic::error(
        Code::ModuleMismatch,
        documented.span,
        format!("module `{name}` is documented but missing from the Index"),
    )];
    if !documented.entries.is_empty() {
        diagnostics.push(Diagnostic::warning(
            Code::UnlistedSymbol,
            documented.span,
            format!(
                "{} documented in module `{name}` are not listed in the Index: {}",
                plural(documented.entries.len(), "symbol"),
                symbol_list(&documented.entries)
            ),
        ));
    }
    return diagnostics;
}

/// Per-symbol comparison for a module present in both tables.
fn compare_module(name: &str, listed: &ModuleSymbols, documented: &ModuleSymbols) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for entry in first_occurrences(&listed.entries) {
        let qualified = entry.qualified_name();
        let Some(found) = documented.find(&qualified) else {
            diagnostics.push(Diagnostic::error(
                Code::UndocumentedSymbol,
                entry.span,
                format!(
                    "{} `{}` is listed in the Index but has no header in `### Module: {name}`",
                    entry.kind.label(),
                    entry.path()
                ),
            ));
            continue;
        };
        let comparable = entry.kind != SymbolKind::Unknown && found.kind != SymbolKind::Unknown;
        if comparable && entry.kind != found.kind {
            diagnostics.push(Diagnostic::warning(
                Code::KindMismatch,
                found.span,
                format!(
                    "`{}` is listed as a {} in the Index but documented as a {}",
                    entry.path(),
                    entry.kind.label(),
                    found.kind.label()
                ),
            ));
        }
    }

    for entry in first_occurrences(&documented.entries) {
        if entry.kind == SymbolKind::Method
            && let Some(owner) = entry.owner.as_deref()
            && !listed.lists_methods_of(owner)
        {
            diagnostics.extend(misattached_method(entry, owner, listed, documented));
            continue;
        }
        if listed.find(&entry.qualified_name()).is_none() {
            diagnostics.push(Diagnostic::warning(
                Code::UnlistedSymbol,
                entry.span,
                format!(
                    "{} `{}` is documented but not listed under `{name}` in the Index",
                    entry.kind.label(),
                    entry.path()
                ),
            ));
        }
    }

    return diagnostics;
}

/// A documented method that landed under `owner` although the Index lists
/// the same method only under a class that documents no such method.
/// Usually the class header between them is missing.
fn misattached_method(
    entry: &SymbolEntry,
    owner: &str,
    listed: &ModuleSymbols,
    documented: &ModuleSymbols,
) -> Option<Diagnostic> {
    let expected = listed.entries.iter().find(|candidate| {
        return candidate.kind == SymbolKind::Method
            && candidate.name == entry.name
            && candidate.owner.as_deref() != Some(owner)
            && documented.find(&candidate.qualified_name()).is_none();
    })?;
    let class = expected.owner.as_deref().unwrap_or_default();
    return Some(Diagnostic::warning(
        Code::UnrecognizedObjectHeader,
        entry.span,
        format!(
            "method header `{}` falls under class `{owner}`, but the Index lists it as `{}`; \
             is the `#### class {class}` header missing?",
            entry.name,
            expected.qualified_name()
        ),
    ));
}

/// Entries with their repeats removed; repeats are reported separately.
fn first_occurrences(entries: &[SymbolEntry]) -> impl Iterator<Item = &SymbolEntry> {
    let mut seen = BTreeSet::new();
    return entries.iter().filter(move |e| return seen.insert(e.qualified_name()));
}

/// `` `a`, `b`, `C.m` `` for a message.
fn symbol_list(entries: &[SymbolEntry]) -> String {
    return first_occurrences(entries)
        .map(|e| return format!("`{}`", e.qualified_name()))
        .collect::<Vec<_>>()
        .join(", ");
}

/// `1 symbol`, `3 symbols`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        return format!("1 {noun}");
    }
    return format!("{count} {noun}s");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "tests")]
mod tests {
    use super::*;
    use crate::types::LineSpan;

    fn entry(module: &str, kind: SymbolKind, qualified: &str, line: u32) -> SymbolEntry {
        let (owner, name) = match qualified.split_once('.') {
            Some((owner, name)) => (Some(owner.to_string()), name.to_string()),
            None => (None, qualified.to_string()),
        };
        return SymbolEntry {
            kind,
            module: module.to_string(),
            name,
            owner,
            signature: None,
            span: LineSpan::line(line),
        };
    }

    fn table(entries: &[(&str, SymbolKind, &str, u32)]) -> SymbolTable {
        let mut table = SymbolTable::default();
        for (module, kind, name, line) in entries {
            table.insert(entry(module, *kind, name, *line));
        }
        return table;
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<Code> {
        return diagnostics.iter().map(|d| return d.code).collect();
    }

    #[test]
    fn matching_tables_are_clean() {
        let index = table(&[("m", SymbolKind::Class, "A", 3), ("m", SymbolKind::Function, "f", 4)]);
        let modules = table(&[("m", SymbolKind::Class, "A", 10), ("m", SymbolKind::Function, "f", 12)]);
        assert!(resolve(&index, &modules).is_empty());
    }

    #[test]
    fn undocumented_and_unlisted() {
        let index = table(&[("m", SymbolKind::Class, "A", 3), ("m", SymbolKind::Function, "f", 4)]);
        let modules = table(&[("m", SymbolKind::Class, "A", 10), ("m", SymbolKind::Function, "g", 12)]);
        let d = resolve(&index, &modules);
        assert_eq!(codes(&d), vec![Code::UndocumentedSymbol, Code::UnlistedSymbol]);
        assert_eq!(d[0].span, LineSpan::line(4));
        assert!(d[0].message.contains("`m.f`"));
        assert_eq!(d[1].severity, crate::types::Severity::Warning);
    }

    #[test]
    fn missing_module_is_aggregated() {
        let index = table(&[("m", SymbolKind::Class, "A", 3), ("m", SymbolKind::Class, "B", 3)]);
        let d = resolve(&index, &SymbolTable::default());
        assert_eq!(codes(&d), vec![Code::ModuleMismatch, Code::UndocumentedSymbol]);
        assert!(d[1].message.contains("`A`, `B`"));

        let d = resolve(&SymbolTable::default(), &index);
        assert_eq!(codes(&d), vec![Code::ModuleMismatch, Code::UnlistedSymbol]);
    }

    #[test]
    fn empty_module_only_mismatches() {
        let mut index = SymbolTable::default();
        index.declare_module("m", LineSpan::line(2));
        let d = resolve(&index, &SymbolTable::default());
        assert_eq!(codes(&d), vec![Code::ModuleMismatch]);
    }

    #[test]
    fn kind_mismatch_is_a_warning() {
        let index = table(&[("m", SymbolKind::Class, "E", 3)]);
        let modules = table(&[("m", SymbolKind::Exception, "E", 10)]);
        let d = resolve(&index, &modules);
        assert_eq!(codes(&d), vec![Code::KindMismatch]);
        assert_eq!(d[0].span, LineSpan::line(10));
    }

    #[test]
    fn unknown_kind_never_mismatches() {
        let index = table(&[("m", SymbolKind::Function, "helper", 3)]);
        let modules = table(&[("m", SymbolKind::Unknown, "helper", 10)]);
        assert!(resolve(&index, &modules).is_empty());
    }

    #[test]
    fn duplicates_in_either_table() {
        let index = table(&[("m", SymbolKind::Class, "A", 3), ("m", SymbolKind::Class, "A", 3)]);
        let modules = table(&[
            ("m", SymbolKind::Class, "A", 10),
            ("m", SymbolKind::Class, "A", 20),
            ("m", SymbolKind::Class, "A", 30),
        ]);
        let d = resolve(&index, &modules);
        assert_eq!(codes(&d), vec![Code::DuplicateSymbol; 3]);
        assert_eq!(d[2].span, LineSpan::line(30));
    }

    #[test]
    fn methods_compared_only_when_listed() {
        let index = table(&[("m", SymbolKind::Class, "A", 3)]);
        let modules = table(&[("m", SymbolKind::Class, "A", 10), ("m", SymbolKind::Method, "A.run", 12)]);
        assert!(resolve(&index, &modules).is_empty());

        let index = table(&[
            ("m", SymbolKind::Class, "A", 3),
            ("m", SymbolKind::Method, "A.run", 4),
            ("m", SymbolKind::Method, "A.stop", 4),
        ]);
        let d = resolve(&index, &modules);
        assert_eq!(codes(&d), vec![Code::UndocumentedSymbol]);
        assert!(d[0].message.contains("`m.A.stop`"));
    }

    #[test]
    fn method_under_the_wrong_class_is_flagged() {
        let index = table(&[
            ("m", SymbolKind::Class, "A", 3),
            ("m", SymbolKind::Class, "B", 4),
            ("m", SymbolKind::Method, "B.run", 5),
        ]);
        // `#### class B` is missing, so `run` attaches to `A`.
        let modules = table(&[("m", SymbolKind::Class, "A", 10), ("m", SymbolKind::Method, "A.run", 14)]);
        let d = resolve(&index, &modules);
        assert_eq!(
            codes(&d),
            vec![Code::UndocumentedSymbol, Code::UndocumentedSymbol, Code::UnrecognizedObjectHeader]
        );
        assert_eq!(d[2].span, LineSpan::line(14));
        assert!(d[2].message.contains("`B.run`"));
        assert!(d[2].message.contains("#### class B"));
    }

    #[test]
    fn method_of_unlisted_class_methods_stays_quiet() {
        let index = table(&[("m", SymbolKind::Class, "A", 3), ("m", SymbolKind::Method, "A.run", 4)]);
        let modules = table(&[
            ("m", SymbolKind::Class, "A", 10),
            ("m", SymbolKind::Method, "A.run", 11),
            ("m", SymbolKind::Class, "B", 20),
            ("m", SymbolKind::Method, "B.run", 21),
        ]);
        assert!(resolve(&index, &modules).is_empty());
    }

    #[test]
    fn resolution_is_repeatable() {
        let index = table(&[("m", SymbolKind::Class, "A", 3), ("n", SymbolKind::Function, "f", 5)]);
        let modules = table(&[("m", SymbolKind::Function, "A", 10), ("o", SymbolKind::Class, "B", 20)]);
        assert_eq!(resolve(&index, &modules), resolve(&index, &modules));
    }
}
