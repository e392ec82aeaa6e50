//! Dotted-reference extraction from example code and resolution against
//! the documented symbols.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::{Node, Parser};

use crate::config::Config;
use crate::grammar::{canonical_language, language_for_tag};
use crate::types::{Code, CodeBlock, Diagnostic, Document, LineSpan, Reference, SymbolTable};

/// Plain identifier.
static IDENT: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// `from pkg.mod import names`. Relative imports do not match.
static FROM_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^\s*from\s+([A-Za-z_][\w.]*)\s+import\s+(.+)$").expect("valid regex");
});

/// `import pkg.mod [as alias], ...`.
static IMPORT: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^\s*import\s+(.+)$").expect("valid regex"));

/// One lexical token of example code.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    /// Whether the token is an identifier (not a keyword or punctuation).
    ident: bool,
    /// Document line of the token.
    line: u32,
    /// Source text.
    text: String,
}

/// Validate dotted references in example code against both symbol tables.
///
/// Only blocks tagged with the document's declared language are scanned.
/// Every diagnostic is a warning.
pub fn check_references(
    document: &Document,
    index: &SymbolTable,
    modules: &SymbolTable,
    config: &Config,
) -> Vec<Diagnostic> {
    let Some(package) = document.package() else {
        return Vec::new();
    };

    let mut seen = BTreeSet::new();
    let mut diagnostics = Vec::new();
    for reference in extract_references(document) {
        if !seen.insert((reference.span.start, reference.target.clone())) {
            continue;
        }
        let leading = reference.text.split('.').next().unwrap_or("");
        if config.is_allowlisted(leading) {
            continue;
        }
        if !belongs_to_package(&reference.target, package) {
            continue;
        }
        if resolves(&reference.target, index, modules) {
            continue;
        }
        let expansion = if reference.target == reference.text {
            String::new()
        } else {
            format!(" (`{}`)", reference.target)
        };
        diagnostics.push(Diagnostic::warning(
            Code::UnknownSymbolReference,
            reference.span,
            format!(
                "example code in {} refers to `{}`{expansion}, which is not a documented module or symbol",
                reference.section.label(),
                reference.text
            ),
        ));
    }
    tracing::debug!(unresolved = diagnostics.len(), "checked example references");
    return diagnostics;
}

/// Every dotted reference in code blocks tagged with the declared language,
/// with import aliases expanded.
pub fn extract_references(document: &Document) -> Vec<Reference> {
    let Some(language) = document.language().map(canonical_language) else {
        return Vec::new();
    };

    let mut references = Vec::new();
    for section in &document.sections {
        for block in &section.code_blocks {
            if block.info.is_empty() || canonical_language(&block.info) != language {
                continue;
            }
            let tokens = tokenize(block);
            let mut aliases = HashMap::new();
            let mut found = Vec::new();
            if language == "python" {
                found.extend(python_imports(block, &mut aliases));
            }
            found.extend(chains(&tokens));

            for (text, line) in found {
                references.push(Reference {
                    section: section.kind.clone(),
                    span: LineSpan::line(line),
                    target: expand_alias(&text, &aliases),
                    text,
                });
            }
        }
    }
    references.sort_by_key(|r| return r.span.start);
    return references;
}

/// Whether `path` is the package or lives under it.
fn belongs_to_package(path: &str, package: &str) -> bool {
    return path == package
        || path
            .strip_prefix(package)
            .is_some_and(|rest| return rest.starts_with('.'));
}

/// Resolve a dotted path: the longest documented module prefix must be the
/// whole path, or be followed by one of that module's top-level symbols.
/// Deeper attribute segments are not checked.
fn resolves(path: &str, index: &SymbolTable, modules: &SymbolTable) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    for split in (1..=segments.len()).rev() {
        let Some(prefix) = segments.get(..split) else {
            continue;
        };
        let module = prefix.join(".");
        if !index.contains_module(&module) && !modules.contains_module(&module) {
            continue;
        }
        let Some(next) = segments.get(split) else {
            return true;
        };
        return [index, modules].iter().any(|table| {
            return table.get(&module).is_some_and(|symbols| {
                return symbols
                    .entries
                    .iter()
                    .any(|e| return e.owner.is_none() && e.name == *next);
            });
        });
    }
    return segments.len() == 1;
}

/// Replace a leading alias with the path it was imported from.
fn expand_alias(text: &str, aliases: &HashMap<String, String>) -> String {
    let (head, rest) = match text.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (text, None),
    };
    let Some(target) = aliases.get(head) else {
        return text.to_string();
    };
    return match rest {
        Some(rest) => format!("{target}.{rest}"),
        None => target.clone(),
    };
}

// ── Python imports ────────────────────────────────────────────────────

/// References made by import statements, recording aliases as a side effect.
fn python_imports(block: &CodeBlock, aliases: &mut HashMap<String, String>) -> Vec<(String, u32)> {
    let mut found = Vec::new();
    let mut lines = block.text.lines().zip(block.first_line..);

    while let Some((raw, line)) = lines.next() {
        let text = raw.split('#').next().unwrap_or("");
        if let Some(caps) = FROM_IMPORT.captures(text) {
            let module = caps.get(1).map_or("", |m| return m.as_str()).trim_end_matches('.');
            let mut names = caps.get(2).map_or("", |m| return m.as_str()).to_string();
            if names.trim_start().starts_with('(') && !names.contains(')') {
                for (more, _) in lines.by_ref() {
                    names.push(' ');
                    names.push_str(more.split('#').next().unwrap_or(""));
                    if more.contains(')') {
                        break;
                    }
                }
            }
            let names = names.replace(['(', ')'], " ");
            for item in names.split(',') {
                let Some((name, alias)) = import_item(item) else {
                    continue;
                };
                let path = format!("{module}.{name}");
                aliases.insert(alias.unwrap_or(name).to_string(), path.clone());
                found.push((path, line));
            }
        } else if let Some(caps) = IMPORT.captures(text) {
            for item in caps.get(1).map_or("", |m| return m.as_str()).split(',') {
                let Some((path, alias)) = import_item(item) else {
                    continue;
                };
                if let Some(alias) = alias {
                    aliases.insert(alias.to_string(), path.to_string());
                }
                found.push((path.to_string(), line));
            }
        }
    }
    return found;
}

/// `name` or `name as alias`. Star imports yield nothing.
fn import_item(item: &str) -> Option<(&str, Option<&str>)> {
    let mut words = item.split_whitespace();
    let name = words.next()?;
    if name == "*" || !name.split('.').all(|s| return IDENT.is_match(s)) {
        return None;
    }
    let alias = match (words.next(), words.next()) {
        (Some("as"), Some(alias)) if IDENT.is_match(alias) => Some(alias),
        _ => None,
    };
    return Some((name, alias));
}

// ── Tokenizing ────────────────────────────────────────────────────────

/// Tokens of a code block, from tree-sitter when a grammar is bundled for
/// its tag, otherwise from the lexical scanner.
fn tokenize(block: &CodeBlock) -> Vec<Token> {
    if let Some(language) = language_for_tag(&block.info) {
        let mut parser = Parser::new();
        if parser.set_language(&language).is_ok()
            && let Some(tree) = parser.parse(&block.text, None)
        {
            let mut tokens = Vec::new();
            collect_leaf_tokens(tree.root_node(), &block.text, block.first_line, &mut tokens);
            return tokens;
        }
        tracing::debug!(tag = %block.info, "tree-sitter parse failed, using lexical scanner");
    }
    return lexical_tokens(block);
}

/// Recursively collect leaf tokens, skipping comment and string subtrees.
fn collect_leaf_tokens(node: Node<'_>, source: &str, first_line: u32, tokens: &mut Vec<Token>) {
    let kind = node.kind();
    if kind.contains("comment") || kind.contains("string") {
        return;
    }

    if node.child_count() == 0 {
        let Some(text) = source.get(node.start_byte()..node.end_byte()) else {
            return;
        };
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let row = u32::try_from(node.start_position().row).unwrap_or(u32::MAX);
        tokens.push(Token {
            // Keywords are anonymous nodes whose kind is their own text.
            ident: kind != text && IDENT.is_match(text),
            line: first_line.saturating_add(row),
            text: text.to_string(),
        });
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_leaf_tokens(child, source, first_line, tokens);
    }
}

/// Identifiers and dots, outside quotes and `#` or `//` comments.
fn lexical_tokens(block: &CodeBlock) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (text, line) in block.text.lines().zip(block.first_line..) {
        let mut chars = text.char_indices().peekable();
        let mut quote: Option<char> = None;
        let mut word = String::new();

        while let Some((_, c)) = chars.next() {
            if let Some(q) = quote {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                continue;
            }
            flush_word(&mut word, line, &mut tokens);
            match c {
                '"' | '\'' | '`' => quote = Some(c),
                '#' => break,
                '/' if chars.peek().is_some_and(|(_, n)| return *n == '/') => break,
                '.' => tokens.push(Token {
                    ident: false,
                    line,
                    text: ".".to_string(),
                }),
                _ if c.is_whitespace() => {},
                _ => tokens.push(Token {
                    ident: false,
                    line,
                    text: c.to_string(),
                }),
            }
        }
        flush_word(&mut word, line, &mut tokens);
    }
    return tokens;
}

/// Emit a pending word as a token.
fn flush_word(word: &mut String, line: u32, tokens: &mut Vec<Token>) {
    if word.is_empty() {
        return;
    }
    let text = std::mem::take(word);
    tokens.push(Token {
        ident: IDENT.is_match(&text),
        line,
        text,
    });
}

/// `ident(.ident)+` runs that do not hang off a preceding expression.
fn chains(tokens: &[Token]) -> Vec<(String, u32)> {
    let mut found = Vec::new();
    let mut i = 0_usize;
    while let Some(token) = tokens.get(i) {
        let after_dot = i
            .checked_sub(1)
            .and_then(|p| return tokens.get(p))
            .is_some_and(|p| return p.text == ".");
        if !token.ident || after_dot {
            i = i.saturating_add(1);
            continue;
        }

        let mut parts = vec![token.text.as_str()];
        let mut end = i;
        while let (Some(dot), Some(next)) = (tokens.get(end.saturating_add(1)), tokens.get(end.saturating_add(2))) {
            if dot.text != "." || !next.ident {
                break;
            }
            parts.push(next.text.as_str());
            end = end.saturating_add(2);
        }
        if parts.len() > 1 {
            found.push((parts.join("."), token.line));
        }
        i = end.saturating_add(1);
    }
    return found;
}
