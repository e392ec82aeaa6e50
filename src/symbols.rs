//! Symbol table extraction from the Index and from the Module Sections.
//!
//! The two tables are built independently and never merged: their
//! disagreement is what the resolver reports.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::parse_atx_heading;
use crate::types::{
    Code, Diagnostic, Document, LineSpan, Section, SectionKind, SymbolEntry, SymbolKind,
    SymbolTable,
};

/// List item: indentation, marker, text.
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^([ \t]*)[-*+][ \t]+(.*)$").expect("valid regex"));

/// Bold or code-formatted module name at the start of a top-level bullet.
static MODULE_BULLET: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^(?:\*\*|__)`?([^`*_\s][^`*\s]*?)`?(?:\*\*|__)|^`([^`\s]+)`")
        .expect("valid regex");
});

/// Category label on a second-level bullet.
static CATEGORY: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(
        r"(?i)^\*{0,2}(classes|class|functions|function|exceptions|exception|methods|method)\*{0,2}\s*:\s*\*{0,2}\s*(.*)$",
    )
    .expect("valid regex");
});

/// `` `Owner`: `m1`, `m2` `` method list under a class.
static MEMBERS: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^`?([A-Za-z_]\w*)`?\s*:\s*(.*)$").expect("valid regex");
});

/// Dotted module path.
static DOTTED: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^[A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*$").expect("valid regex");
});

/// Plain identifier.
static IDENT: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^[A-Za-z_]\w*$").expect("valid regex"));

/// Any identifier, for naming unrecognized headers.
static IDENT_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"[A-Za-z_]\w*").expect("valid regex"));

/// `class Name(sig)` or `Class: Name(sig)`.
static CLASS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"(?i)^class(?:\s*:\s*|\s+)(?P<name>[A-Za-z_]\w*)\s*(?P<sig>\(.*\))?\s*:?$")
        .expect("valid regex");
});

/// `exception Name(Base)` or `Exception: Name(Base)`.
static EXCEPTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(
        r"(?i)^exception(?:\s*:\s*|\s+)(?P<name>[A-Za-z_]\w*)\s*(?P<sig>\(.*\))?\s*:?$",
    )
    .expect("valid regex");
});

/// `Function: name(sig) -> ret` or `def name(sig)`.
static FUNCTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"(?i)^(?:function(?:\s*:\s*|\s+)|def\s+)(?P<name>[A-Za-z_]\w*)\s*(?P<sig>\(.*)?$")
        .expect("valid regex");
});

/// `method name(sig)`, `Method: Owner.name(sig)`, `def name(sig)`.
static METHOD_PREFIXED: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(
        r"(?i)^(?:method(?:\s*:\s*|\s+)|def\s+)(?:(?P<owner>[A-Za-z_]\w*)\.)?(?P<name>[A-Za-z_]\w*)\s*(?P<sig>\(.*)?$",
    )
    .expect("valid regex");
});

/// `Owner.name(sig)`.
static METHOD_DOTTED: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^(?P<owner>[A-Za-z_]\w*)\.(?P<name>[A-Za-z_]\w*)(?P<sig>\(.*)?$")
        .expect("valid regex");
});

/// `name(sig)` directly under a class header.
static METHOD_BARE: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^(?P<name>[A-Za-z_]\w*)(?P<sig>\(.*)$").expect("valid regex");
});

// ── Index ─────────────────────────────────────────────────────────────

/// Symbol categories an Index bullet can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Classes,
    Functions,
    Exceptions,
    Methods,
}

impl Category {
    /// Kind of the symbols listed under this category.
    const fn kind(self) -> SymbolKind {
        return match self {
            Category::Classes => SymbolKind::Class,
            Category::Functions => SymbolKind::Function,
            Category::Exceptions => SymbolKind::Exception,
            Category::Methods => SymbolKind::Method,
        };
    }
}

/// A line of the Index that does not fit the nested-list grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineProblem {
    /// Line of the offending text.
    pub line: u32,
    /// What is wrong with it.
    pub message: String,
}

/// Everything read from an Index body: symbols plus grammar problems.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexOutline {
    /// Grammar violations, in line order.
    pub problems: Vec<OutlineProblem>,
    /// Modules and symbols found.
    pub table: SymbolTable,
}

/// Progress through the Index list.
#[derive(Default)]
struct OutlineCursor {
    /// Indentation of each open list level.
    indents: Vec<usize>,
    /// Module of the most recent top-level bullet, with its line and category count.
    module: Option<(String, u32, usize)>,
    /// Category of the most recent second-level bullet.
    category: Option<Category>,
    /// Classes listed for the current module.
    classes: Vec<String>,
}

/// Read an Index section as a nested list.
///
/// Shared by the schema validator (which reports `problems`) and the table
/// builder (which keeps `table`).
pub fn parse_index_outline(section: &Section) -> IndexOutline {
    let mut outline = IndexOutline::default();
    let mut cursor = OutlineCursor::default();
    let mut list_started = false;
    let mut module_count = 0_usize;

    for line in section.prose_lines() {
        if line.text.trim().is_empty() {
            continue;
        }
        let Some(caps) = BULLET.captures(&line.text) else {
            if list_started {
                outline.problems.push(OutlineProblem {
                    line: line.number,
                    message: "expected a list item; the Index must be a nested list".to_string(),
                });
            }
            continue;
        };
        list_started = true;

        let indent = caps.get(1).map_or(0, |m| return indent_width(m.as_str()));
        let text = caps.get(2).map_or("", |m| return m.as_str()).trim();
        let depth = list_depth(&mut cursor.indents, indent);

        match depth {
            0 => {
                close_module(&mut cursor, &mut outline);
                if read_module_bullet(text, line.number, &mut cursor, &mut outline) {
                    module_count = module_count.saturating_add(1);
                }
            },
            1 => read_category_bullet(text, line.number, &mut cursor, &mut outline),
            2 => read_member_bullet(text, line.number, &cursor, &mut outline),
            _ => outline.problems.push(OutlineProblem {
                line: line.number,
                message: "Index lists nest at most three levels deep".to_string(),
            }),
        }
    }
    close_module(&mut cursor, &mut outline);

    if module_count == 0 {
        outline.problems.push(OutlineProblem {
            line: section.span.start,
            message: "Index lists no modules; expected top-level bullets naming modules".to_string(),
        });
    }
    outline.problems.sort_by_key(|p| return p.line);
    return outline;
}

/// Number of columns of leading whitespace, tabs counted as four.
fn indent_width(leading: &str) -> usize {
    return leading
        .chars()
        .map(|c| return if c == '\t' { 4 } else { 1 })
        .sum();
}

/// Depth of a bullet given the stack of open indentation levels.
fn list_depth(indents: &mut Vec<usize>, indent: usize) -> usize {
    while indents.last().is_some_and(|top| return *top >= indent) {
        indents.pop();
    }
    let depth = indents.len();
    indents.push(indent);
    return depth;
}

/// Report a module bullet that declared no categories.
fn close_module(cursor: &mut OutlineCursor, outline: &mut IndexOutline) {
    if let Some((name, line, categories)) = cursor.module.take()
        && categories == 0
    {
        outline.problems.push(OutlineProblem {
            line,
            message: format!("module `{name}` lists no `Classes:`, `Functions:` or `Exceptions:`"),
        });
    }
    cursor.category = None;
    cursor.classes.clear();
}

/// Top-level bullet: a bold or code-formatted module name.
fn read_module_bullet(
    text: &str,
    line: u32,
    cursor: &mut OutlineCursor,
    outline: &mut IndexOutline,
) -> bool {
    let name = MODULE_BULLET
        .captures(text)
        .and_then(|caps| return caps.get(1).or_else(|| return caps.get(2)))
        .map(|m| return m.as_str().trim_matches('`').to_string());

    let Some(name) = name.filter(|n| return DOTTED.is_match(n)) else {
        outline.problems.push(OutlineProblem {
            line,
            message: format!(
                "top-level Index bullet `{text}` must start with a bold or code-formatted module name"
            ),
        });
        return false;
    };

    outline.table.declare_module(&name, LineSpan::line(line));
    cursor.module = Some((name, line, 0));
    return true;
}

/// Second-level bullet: `Classes:`, `Functions:`, `Exceptions:` or `Methods:`.
fn read_category_bullet(
    text: &str,
    line: u32,
    cursor: &mut OutlineCursor,
    outline: &mut IndexOutline,
) {
    let Some((module, _, categories)) = cursor.module.as_mut() else {
        cursor.category = None;
        outline.problems.push(OutlineProblem {
            line,
            message: "category bullet is not nested under a module bullet".to_string(),
        });
        return;
    };

    let Some((category, rest)) = parse_category(text) else {
        cursor.category = None;
        outline.problems.push(OutlineProblem {
            line,
            message: format!(
                "expected `Classes:`, `Functions:` or `Exceptions:` under module `{module}`, found `{text}`"
            ),
        });
        return;
    };
    *categories = categories.saturating_add(1);
    cursor.category = Some(category);
    let module = module.clone();

    for item in split_items(rest) {
        let entry = match category {
            Category::Methods => method_item(&item).map(|(owner, name)| {
                return index_entry(&module, SymbolKind::Method, name, Some(owner), line);
            }),
            Category::Classes | Category::Functions | Category::Exceptions => {
                plain_item(&item).map(|name| return index_entry(&module, category.kind(), name, None, line))
            },
        };
        match entry {
            Some(entry) => {
                if category == Category::Classes {
                    cursor.classes.push(entry.name.clone());
                }
                outline.table.insert(entry);
            },
            None => outline.problems.push(OutlineProblem {
                line,
                message: format!("`{item}` is not a valid symbol name"),
            }),
        }
    }
}

/// Third-level bullet under `Classes:`: `` `Owner`: `m1`, `m2` ``.
fn read_member_bullet(text: &str, line: u32, cursor: &OutlineCursor, outline: &mut IndexOutline) {
    let Some((module, _, _)) = cursor.module.as_ref() else {
        outline.problems.push(OutlineProblem {
            line,
            message: "nested bullet is not under a module bullet".to_string(),
        });
        return;
    };
    if cursor.category != Some(Category::Classes) {
        outline.problems.push(OutlineProblem {
            line,
            message: "only `Classes:` may carry nested bullets, one per class listing its methods"
                .to_string(),
        });
        return;
    }
    let Some(caps) = MEMBERS.captures(text) else {
        outline.problems.push(OutlineProblem {
            line,
            message: format!("expected `` `Class`: `method`, ... `` but found `{text}`"),
        });
        return;
    };
    let owner = caps.get(1).map_or("", |m| return m.as_str()).to_string();
    if !cursor.classes.contains(&owner) {
        outline.problems.push(OutlineProblem {
            line,
            message: format!("methods listed for `{owner}`, which is not among the classes of `{module}`"),
        });
        return;
    }

    let rest = caps.get(2).map_or("", |m| return m.as_str());
    for item in split_items(rest) {
        match plain_item(&item) {
            Some(name) => outline.table.insert(index_entry(
                module,
                SymbolKind::Method,
                name,
                Some(owner.clone()),
                line,
            )),
            None => outline.problems.push(OutlineProblem {
                line,
                message: format!("`{item}` is not a valid method name"),
            }),
        }
    }
}

/// Split `Label: rest` into its category and the item list.
fn parse_category(text: &str) -> Option<(Category, &str)> {
    let caps = CATEGORY.captures(text)?;
    let label = caps.get(1)?.as_str().to_ascii_lowercase();
    let category = match label.as_str() {
        "classes" | "class" => Category::Classes,
        "functions" | "function" => Category::Functions,
        "exceptions" | "exception" => Category::Exceptions,
        _ => Category::Methods,
    };
    return Some((category, caps.get(2).map_or("", |m| return m.as_str())));
}

/// Split a comma-separated item list, ignoring commas inside parentheses.
/// A lone `None` or dash means an empty list.
fn split_items(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0_u32;
    for ch in text.chars() {
        match ch {
            '(' | '[' => {
                depth = depth.saturating_add(1);
                current.push(ch);
            },
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            },
            ',' if depth == 0 => items.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    items.push(current);

    let items: Vec<String> = items
        .into_iter()
        .map(|i| return i.trim().to_string())
        .filter(|i| return !i.is_empty())
        .collect();

    let is_empty_marker = |item: &str| {
        let bare = item.trim_matches(|c| return c == '`' || c == '*' || c == '_');
        return bare.eq_ignore_ascii_case("none") || bare == "-" || bare == "—";
    };
    if items.len() == 1 && items.first().is_some_and(|i| return is_empty_marker(i.as_str())) {
        return Vec::new();
    }
    return items;
}

/// Strip formatting and any signature from a list item.
fn clean_item(item: &str) -> String {
    let unformatted: String = item.chars().filter(|c| return !matches!(c, '`' | '*')).collect();
    let name = unformatted.split('(').next().unwrap_or("");
    return name.trim().to_string();
}

/// A bare identifier item.
fn plain_item(item: &str) -> Option<String> {
    let name = clean_item(item);
    return IDENT.is_match(&name).then_some(name);
}

/// An `Owner.method` item.
fn method_item(item: &str) -> Option<(String, String)> {
    let name = clean_item(item);
    let (owner, method) = name.split_once('.')?;
    if IDENT.is_match(owner) && IDENT.is_match(method) {
        return Some((owner.to_string(), method.to_string()));
    }
    return None;
}

/// Build an Index entry. Index entries never carry signatures.
fn index_entry(
    module: &str,
    kind: SymbolKind,
    name: String,
    owner: Option<String>,
    line: u32,
) -> SymbolEntry {
    return SymbolEntry {
        kind,
        module: module.to_string(),
        name,
        owner,
        signature: None,
        span: LineSpan::line(line),
    };
}

/// Build the Index symbol table.
pub fn build_index_table(index: &Section) -> SymbolTable {
    return parse_index_outline(index).table;
}

// ── Module Sections ───────────────────────────────────────────────────

/// Module table plus the warnings raised while reading object headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableBuild {
    /// `UnrecognizedObjectHeader` warnings.
    pub diagnostics: Vec<Diagnostic>,
    /// Documented modules and symbols.
    pub table: SymbolTable,
}

/// A parsed level-4 or level-5 object header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ObjectHeader {
    kind: SymbolKind,
    name: String,
    owner: Option<String>,
    signature: Option<String>,
}

/// Build the Module Section symbol table.
pub fn build_module_table<'a>(sections: impl IntoIterator<Item = &'a Section>) -> TableBuild {
    let mut build = TableBuild::default();
    for section in sections {
        let SectionKind::ModuleSection(module) = &section.kind else {
            continue;
        };
        read_module_section(module, section, &mut build);
    }
    return build;
}

/// Read the object headers of one Module Section.
fn read_module_section(module: &str, section: &Section, build: &mut TableBuild) {
    build.table.declare_module(module, LineSpan::line(section.span.start));
    let mut current_class: Option<String> = None;

    for line in section.prose_lines() {
        let Some((level, heading)) = parse_atx_heading(&line.text) else {
            continue;
        };
        let text = strip_formatting(&heading);
        let span = LineSpan::line(line.number);

        match level {
            4 => {
                let Some(header) = parse_object_header(&text, current_class.as_deref()) else {
                    current_class = None;
                    build.diagnostics.push(Diagnostic::warning(
                        Code::UnrecognizedObjectHeader,
                        span,
                        format!(
                            "header `{heading}` in module `{module}` is not a `class`, `Function:` or `exception` declaration"
                        ),
                    ));
                    build.table.insert(SymbolEntry {
                        kind: SymbolKind::Unknown,
                        module: module.to_string(),
                        name: unknown_header_name(&text),
                        owner: None,
                        signature: None,
                        span,
                    });
                    continue;
                };
                current_class = match header.kind {
                    SymbolKind::Class | SymbolKind::Exception => Some(header.name.clone()),
                    SymbolKind::Method => current_class,
                    SymbolKind::Function | SymbolKind::Unknown => None,
                };
                build.table.insert(header.into_entry(module, span));
            },
            5 => {
                if let Some(header) = parse_member_header(&text, current_class.as_deref()) {
                    build.table.insert(header.into_entry(module, span));
                }
            },
            _ => {},
        }
    }
}

impl ObjectHeader {
    /// Attach module and location.
    fn into_entry(self, module: &str, span: LineSpan) -> SymbolEntry {
        return SymbolEntry {
            kind: self.kind,
            module: module.to_string(),
            name: self.name,
            owner: self.owner,
            signature: self.signature,
            span,
        };
    }
}

/// Remove inline code and emphasis markers from header text.
fn strip_formatting(heading: &str) -> String {
    let text: String = heading.chars().filter(|c| return *c != '`').collect();
    let text = text.trim();
    let text = text
        .strip_prefix("**")
        .and_then(|t| return t.strip_suffix("**"))
        .unwrap_or(text);
    return text.trim().to_string();
}

/// Parse a level-4 header by the object-header grammar.
fn parse_object_header(text: &str, current_class: Option<&str>) -> Option<ObjectHeader> {
    if let Some(caps) = CLASS_HEADER.captures(text) {
        return Some(header_from(&caps, SymbolKind::Class, None));
    }
    if let Some(caps) = EXCEPTION_HEADER.captures(text) {
        return Some(header_from(&caps, SymbolKind::Exception, None));
    }
    if let Some(caps) = FUNCTION_HEADER.captures(text) {
        return Some(header_from(&caps, SymbolKind::Function, None));
    }
    if let Some(caps) = METHOD_PREFIXED.captures(text) {
        let owner = caps
            .name("owner")
            .map(|m| return m.as_str().to_string())
            .or_else(|| return current_class.map(str::to_string))?;
        return Some(header_from(&caps, SymbolKind::Method, Some(owner)));
    }
    if let Some(caps) = METHOD_DOTTED.captures(text) {
        let owner = caps.name("owner").map(|m| return m.as_str().to_string());
        return Some(header_from(&caps, SymbolKind::Method, owner));
    }
    return None;
}

/// Parse a level-5 header as a method of the enclosing class.
/// Anything else at level 5 is a prose subheading and yields `None`.
fn parse_member_header(text: &str, current_class: Option<&str>) -> Option<ObjectHeader> {
    if let Some(caps) = METHOD_DOTTED.captures(text) {
        let owner = caps.name("owner").map(|m| return m.as_str().to_string());
        return Some(header_from(&caps, SymbolKind::Method, owner));
    }
    let owner = current_class?.to_string();
    let caps = METHOD_PREFIXED
        .captures(text)
        .or_else(|| return METHOD_BARE.captures(text))?;
    let explicit = caps.name("owner").map(|m| return m.as_str().to_string());
    return Some(header_from(&caps, SymbolKind::Method, Some(explicit.unwrap_or(owner))));
}

/// Assemble a header from regex captures.
fn header_from(caps: &regex::Captures<'_>, kind: SymbolKind, owner: Option<String>) -> ObjectHeader {
    return ObjectHeader {
        kind,
        name: caps.name("name").map_or("", |m| return m.as_str()).to_string(),
        owner,
        signature: caps
            .name("sig")
            .map(|m| return m.as_str().trim().to_string())
            .filter(|s| return !s.is_empty()),
    };
}

/// Best-effort name for a header outside the grammar: the identifier before
/// the first `(`, otherwise the first identifier, otherwise the whole text.
fn unknown_header_name(text: &str) -> String {
    let before_paren = text.split('(').next().unwrap_or(text);
    if text.contains('(')
        && let Some(last) = IDENT_ANYWHERE.find_iter(before_paren).last()
    {
        return last.as_str().to_string();
    }
    return IDENT_ANYWHERE
        .find(text)
        .map_or_else(|| return text.to_string(), |m| return m.as_str().to_string());
}

// ── Document-level convenience ────────────────────────────────────────

/// Both tables for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTables {
    /// Header warnings from the module pass.
    pub diagnostics: Vec<Diagnostic>,
    /// Table built from the (first) Index section.
    pub index: SymbolTable,
    /// Table built from the Module Sections.
    pub module: SymbolTable,
}

/// Run both extraction passes over a document.
pub fn build_tables(document: &Document) -> DocumentTables {
    let index = document.index().map(build_index_table).unwrap_or_default();
    let build = build_module_table(document.module_sections());
    tracing::debug!(
        index_modules = index.iter().count(),
        index_symbols = index.symbol_count(),
        documented_modules = build.table.iter().count(),
        documented_symbols = build.table.symbol_count(),
        "built symbol tables"
    );
    return DocumentTables {
        diagnostics: build.diagnostics,
        index,
        module: build.table,
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "tests")]
mod tests {
    use super::*;
    use crate::parser::parse;

    const GEOPY: &str = include_str!("../tests/fixtures/geopy/llm.txt");

    fn section(doc: &str) -> Section {
        return parse(doc).unwrap().sections.remove(0);
    }

    fn names(table: &SymbolTable, module: &str) -> Vec<String> {
        return table
            .get(module)
            .unwrap()
            .entries
            .iter()
            .map(SymbolEntry::qualified_name)
            .collect();
    }

    #[test]
    fn index_modules_categories_and_methods() {
        let doc = parse(GEOPY).unwrap();
        let outline = parse_index_outline(doc.index().unwrap());
        assert!(outline.problems.is_empty(), "{:?}", outline.problems);
        assert_eq!(
            names(&outline.table, "geopy.geocoders"),
            vec!["Nominatim", "GoogleV3", "GoogleV3.geocode", "GoogleV3.reverse", "get_geocoder_for_service"]
        );
        let exc = outline.table.get("geopy.exc").unwrap();
        assert!(exc.entries.iter().all(|e| return e.kind == SymbolKind::Exception));
    }

    #[test]
    fn module_table_reads_object_headers() {
        let doc = parse(GEOPY).unwrap();
        let build = build_module_table(doc.module_sections());
        assert!(build.diagnostics.is_empty(), "{:?}", build.diagnostics);
        let geocoders = build.table.get("geopy.geocoders").unwrap();
        let google = geocoders.find("GoogleV3").unwrap();
        assert_eq!(google.kind, SymbolKind::Class);
        assert!(google.signature.as_deref().unwrap().starts_with("(api_key=None"));
        let reverse = geocoders.find("GoogleV3.reverse").unwrap();
        assert_eq!(reverse.kind, SymbolKind::Method);
        assert_eq!(geocoders.find("get_geocoder_for_service").unwrap().kind, SymbolKind::Function);
        assert_eq!(
            build.table.get("geopy.exc").unwrap().find("GeocoderTimedOut").unwrap().signature.as_deref(),
            Some("(GeocoderServiceError)")
        );
    }

    #[test]
    fn extraction_is_repeatable() {
        let doc = parse(GEOPY).unwrap();
        assert_eq!(build_tables(&doc), build_tables(&doc));
    }

    #[test]
    fn unrecognized_header_is_recorded_as_unknown() {
        let sec = section("### Module: pkg\n\n#### The Widget type\n\n#### class Widget\n");
        let build = build_module_table([&sec]);
        assert_eq!(build.diagnostics.len(), 1);
        assert_eq!(build.diagnostics[0].code, Code::UnrecognizedObjectHeader);
        let entries = &build.table.get("pkg").unwrap().entries;
        assert_eq!(entries[0].kind, SymbolKind::Unknown);
        assert_eq!(entries[0].name, "The");
    }

    #[test]
    fn unknown_name_prefers_identifier_before_paren() {
        assert_eq!(unknown_header_name("Helper builder(x)"), "builder");
        assert_eq!(unknown_header_name("!!!"), "!!!");
    }

    #[test]
    fn prose_subheadings_are_not_methods() {
        let sec = section("### Module: pkg\n\n#### class A\n\n##### Parameters\n\n##### Example (basic)\n\n##### run(x)\n");
        let build = build_module_table([&sec]);
        assert_eq!(names(&build.table, "pkg"), vec!["A", "A.run"]);
    }

    #[test]
    fn header_variants() {
        let sec = section(
            "### Module: pkg\n\n#### `Class: Point(lat, lon)`\n#### def helper(x) -> int\n#### Exception: Boom(Exception)\n#### Point.move(dx)\n",
        );
        let build = build_module_table([&sec]);
        let kinds: Vec<SymbolKind> = build.table.get("pkg").unwrap().entries.iter().map(|e| return e.kind).collect();
        assert_eq!(
            kinds,
            vec![SymbolKind::Class, SymbolKind::Function, SymbolKind::Exception, SymbolKind::Method]
        );
        assert!(build.diagnostics.is_empty());
    }

    #[test]
    fn methods_category_uses_dotted_items() {
        let sec = section("## Index\n\n- `pkg`\n  - Classes: `A`\n  - Methods: `A.run`, `A.stop()`\n");
        let outline = parse_index_outline(&sec);
        assert!(outline.problems.is_empty(), "{:?}", outline.problems);
        assert_eq!(names(&outline.table, "pkg"), vec!["A", "A.run", "A.stop"]);
    }

    #[test]
    fn none_marker_means_empty() {
        let sec = section("## Index\n\n- **pkg**\n  - Classes: None\n");
        let outline = parse_index_outline(&sec);
        assert!(outline.problems.is_empty());
        assert!(outline.table.get("pkg").unwrap().entries.is_empty());
    }

    #[test]
    fn outline_problems_are_located() {
        let sec = section(
            "## Index\n\nIntro prose is fine.\n\n- plain module\n- **pkg**\n  - Types: `A`\n  - Functions: `ok`, `not ok`\n\nTrailing prose.\n",
        );
        let outline = parse_index_outline(&sec);
        let lines: Vec<u32> = outline.problems.iter().map(|p| return p.line).collect();
        assert_eq!(lines, vec![5, 7, 8, 10]);
    }

    #[test]
    fn methods_for_unlisted_class_are_rejected() {
        let sec = section("## Index\n\n- **pkg**\n  - Classes: `A`\n    - `B`: `run`\n");
        let outline = parse_index_outline(&sec);
        assert_eq!(outline.problems.len(), 1);
        assert_eq!(outline.problems[0].line, 5);
    }
}
