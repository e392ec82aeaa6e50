/// Core domain types for llm.txt documents, symbols, and diagnostics.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// One-based, inclusive line range in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LineSpan {
    /// First line covered by the span.
    pub start: u32,
    /// Last line covered by the span (inclusive).
    pub end: u32,
}

impl LineSpan {
    /// Span covering `start..=end`.
    pub const fn new(start: u32, end: u32) -> Self {
        return Self { start, end };
    }

    /// Span covering a single line.
    pub const fn line(number: u32) -> Self {
        return Self { start: number, end: number };
    }
}

impl fmt::Display for LineSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            return write!(f, "{}", self.start);
        }
        return write!(f, "{}-{}", self.start, self.end);
    }
}

/// How serious a diagnostic is. Ordering puts errors first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Breaks conformance; the report fails.
    Error,
    /// Advisory, conventions not followed.
    Warning,
    /// Informational only.
    Info,
}

impl Severity {
    /// Lowercase label used in rendered output.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
    }
}

/// Stable diagnostic codes. The serialized form is the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Code {
    /// A section that may appear once appears again.
    DuplicateSection,
    /// The same symbol is declared twice in one table.
    DuplicateSymbol,
    /// Core Concepts or Pitfalls has no content.
    EmptySection,
    /// `summary` is present but blank.
    EmptySummary,
    /// A recognized frontmatter key holds a list or mapping.
    InvalidFieldType,
    /// `version` is not a dotted numeric sequence.
    InvalidVersion,
    /// Listed and documented kinds disagree.
    KindMismatch,
    /// The Index body is not the expected nested list.
    MalformedIndex,
    /// Frontmatter is unterminated or not a YAML mapping.
    MalformedFrontmatter,
    /// Global Examples has no fenced code block.
    MissingExampleCode,
    /// The document has no frontmatter block.
    MissingFrontmatter,
    /// A required frontmatter key is absent.
    MissingFrontmatterField,
    /// A Module Section declares no level-4 object headers.
    MissingObjectHeaders,
    /// A required or recommended section is absent.
    MissingSection,
    /// A module appears in only one of the two symbol tables.
    ModuleMismatch,
    /// A section appears before one that should precede it.
    SectionOutOfOrder,
    /// A symbol listed in the Index has no Module Section header.
    UndocumentedSymbol,
    /// A header that does not name a known section.
    UnknownSection,
    /// A dotted reference in example code resolves to nothing documented.
    UnknownSymbolReference,
    /// `language` is outside the accepted set.
    UnexpectedLanguage,
    /// A documented symbol is missing from the Index.
    UnlistedSymbol,
    /// A level-4 header does not follow the object-header grammar.
    UnrecognizedObjectHeader,
    /// A fenced code block is still open at end of input.
    UnterminatedCodeBlock,
}

impl Code {
    /// Every code, in catalogue order.
    pub const ALL: [Code; 23] = [
        Code::MalformedFrontmatter,
        Code::UnterminatedCodeBlock,
        Code::MissingFrontmatter,
        Code::MissingFrontmatterField,
        Code::InvalidFieldType,
        Code::UnexpectedLanguage,
        Code::InvalidVersion,
        Code::EmptySummary,
        Code::MissingSection,
        Code::DuplicateSection,
        Code::SectionOutOfOrder,
        Code::UnknownSection,
        Code::MalformedIndex,
        Code::MissingObjectHeaders,
        Code::MissingExampleCode,
        Code::EmptySection,
        Code::UnrecognizedObjectHeader,
        Code::UndocumentedSymbol,
        Code::UnlistedSymbol,
        Code::DuplicateSymbol,
        Code::ModuleMismatch,
        Code::KindMismatch,
        Code::UnknownSymbolReference,
    ];

    /// The stable string form of the code.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Code::DuplicateSection => "DuplicateSection",
            Code::DuplicateSymbol => "DuplicateSymbol",
            Code::EmptySection => "EmptySection",
            Code::EmptySummary => "EmptySummary",
            Code::InvalidFieldType => "InvalidFieldType",
            Code::InvalidVersion => "InvalidVersion",
            Code::KindMismatch => "KindMismatch",
            Code::MalformedIndex => "MalformedIndex",
            Code::MalformedFrontmatter => "MalformedFrontmatter",
            Code::MissingExampleCode => "MissingExampleCode",
            Code::MissingFrontmatter => "MissingFrontmatter",
            Code::MissingFrontmatterField => "MissingFrontmatterField",
            Code::MissingObjectHeaders => "MissingObjectHeaders",
            Code::MissingSection => "MissingSection",
            Code::ModuleMismatch => "ModuleMismatch",
            Code::SectionOutOfOrder => "SectionOutOfOrder",
            Code::UndocumentedSymbol => "UndocumentedSymbol",
            Code::UnknownSection => "UnknownSection",
            Code::UnknownSymbolReference => "UnknownSymbolReference",
            Code::UnexpectedLanguage => "UnexpectedLanguage",
            Code::UnlistedSymbol => "UnlistedSymbol",
            Code::UnrecognizedObjectHeader => "UnrecognizedObjectHeader",
            Code::UnterminatedCodeBlock => "UnterminatedCodeBlock",
        };
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(self.as_str());
    }
}

/// One reported defect. Produced by a validation pass, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Stable identifier of the rule that fired.
    pub code: Code,
    /// Human-readable explanation.
    pub message: String,
    /// How serious the defect is.
    pub severity: Severity,
    /// Where in the document the defect is.
    pub span: LineSpan,
}

impl Diagnostic {
    /// Build a diagnostic with an explicit severity.
    pub fn new(severity: Severity, code: Code, span: LineSpan, message: impl Into<String>) -> Self {
        return Self {
            code,
            message: message.into(),
            severity,
            span,
        };
    }

    /// Error-severity diagnostic.
    pub fn error(code: Code, span: LineSpan, message: impl Into<String>) -> Self {
        return Self::new(Severity::Error, code, span, message);
    }

    /// Warning-severity diagnostic.
    pub fn warning(code: Code, span: LineSpan, message: impl Into<String>) -> Self {
        return Self::new(Severity::Warning, code, span, message);
    }

    /// Info-severity diagnostic.
    pub fn info(code: Code, span: LineSpan, message: impl Into<String>) -> Self {
        return Self::new(Severity::Info, code, span, message);
    }
}

/// Status a section has in the llm.txt convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStatus {
    /// Absence or malformation fails the document.
    Required,
    /// Expected in every document, but optional.
    HighlyRecommended,
    /// Nice to have.
    Recommended,
    /// No expectation at all.
    Optional,
}

impl SectionStatus {
    /// Severity of shape violations in a section with this status.
    pub const fn shape_severity(self) -> Severity {
        return match self {
            SectionStatus::Required => Severity::Error,
            SectionStatus::HighlyRecommended | SectionStatus::Recommended => Severity::Warning,
            SectionStatus::Optional => Severity::Info,
        };
    }
}

/// Tagged variant over the section kinds of an llm.txt document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name")]
pub enum SectionKind {
    /// The `---` delimited YAML header.
    Frontmatter,
    /// Leading level-1 header and its tagline.
    Title,
    /// `## Core Concepts`.
    CoreConcepts,
    /// `## Pitfalls` and its variants.
    Pitfalls,
    /// `## Index`, the table of contents.
    Index,
    /// `## Module Sections`, the container header.
    ModuleSections,
    /// `### Module: <name>`.
    ModuleSection(String),
    /// `## Global Examples`.
    GlobalExamples,
    /// Any other top-level header, carrying its text.
    Unknown(String),
}

impl SectionKind {
    /// Name used in diagnostics.
    pub fn label(&self) -> String {
        return match self {
            SectionKind::Frontmatter => "Frontmatter".to_string(),
            SectionKind::Title => "Title".to_string(),
            SectionKind::CoreConcepts => "Core Concepts".to_string(),
            SectionKind::Pitfalls => "Pitfalls".to_string(),
            SectionKind::Index => "Index".to_string(),
            SectionKind::ModuleSections => "Module Sections".to_string(),
            SectionKind::ModuleSection(name) => format!("Module: {name}"),
            SectionKind::GlobalExamples => "Global Examples".to_string(),
            SectionKind::Unknown(title) => title.clone(),
        };
    }

    /// Position in the canonical order. Unknown sections have none.
    pub const fn rank(&self) -> Option<u8> {
        return match self {
            SectionKind::Frontmatter => Some(0),
            SectionKind::Title => Some(1),
            SectionKind::CoreConcepts => Some(2),
            SectionKind::Pitfalls => Some(3),
            SectionKind::Index => Some(4),
            SectionKind::ModuleSections | SectionKind::ModuleSection(_) => Some(5),
            SectionKind::GlobalExamples => Some(6),
            SectionKind::Unknown(_) => None,
        };
    }

    /// Convention status of the section.
    pub const fn status(&self) -> SectionStatus {
        return match self {
            SectionKind::Frontmatter | SectionKind::Index | SectionKind::ModuleSection(_) => {
                SectionStatus::Required
            },
            SectionKind::CoreConcepts => SectionStatus::HighlyRecommended,
            SectionKind::Pitfalls | SectionKind::GlobalExamples => SectionStatus::Recommended,
            SectionKind::Title | SectionKind::ModuleSections | SectionKind::Unknown(_) => {
                SectionStatus::Optional
            },
        };
    }
}

/// A body line with its position and fence state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyLine {
    /// Whether the line is part of a fenced code block (fence markers included).
    pub fenced: bool,
    /// One-based line number in the document.
    pub number: u32,
    /// Line content without the trailing newline.
    pub text: String,
}

/// A fenced code block inside a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Line number of the first content line (the line after the opening fence).
    pub first_line: u32,
    /// First word of the info string, e.g. `python`. Empty when untagged.
    pub info: String,
    /// Opening fence through closing fence.
    pub span: LineSpan,
    /// Content between the fences, with the fence indentation removed.
    pub text: String,
}

/// One top-level section of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Byte range in the input buffer, header through last non-blank line.
    pub bytes: Range<usize>,
    /// Fenced code blocks found in the body, in order.
    pub code_blocks: Vec<CodeBlock>,
    /// Header text as written, without the `#` markers.
    pub heading: String,
    /// Which section this is.
    pub kind: SectionKind,
    /// ATX level of the header (0 for the frontmatter and the preamble).
    pub level: u8,
    /// Body lines after the header.
    pub lines: Vec<BodyLine>,
    /// Header line through last non-blank line.
    pub span: LineSpan,
}

impl Section {
    /// Raw body text, lines joined with `\n`.
    pub fn body_text(&self) -> String {
        return self
            .lines
            .iter()
            .map(|l| return l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
    }

    /// Whether the body has any non-blank line.
    pub fn has_content(&self) -> bool {
        return self.lines.iter().any(|l| return !l.text.trim().is_empty());
    }

    /// Body lines that sit outside fenced code.
    pub fn prose_lines(&self) -> impl Iterator<Item = &BodyLine> {
        return self.lines.iter().filter(|l| return !l.fenced);
    }
}

/// Value of a recognized frontmatter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A scalar, rendered to text. Null is the empty string.
    Text(String),
    /// A sequence or mapping where a scalar was expected.
    Structured,
}

/// A recognized frontmatter key with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterField {
    /// Line the key appears on.
    pub line: u32,
    /// Parsed value.
    pub value: FieldValue,
}

/// Recognized frontmatter keys. All four are required.
pub const FRONTMATTER_KEYS: [&str; 4] = ["package", "version", "language", "summary"];

/// The YAML header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter {
    /// Recognized keys and their values.
    pub fields: BTreeMap<String, FrontmatterField>,
    /// Opening through closing delimiter.
    pub span: LineSpan,
    /// Keys outside the recognized set, preserved as-is.
    pub unrecognized: BTreeSet<String>,
}

impl Frontmatter {
    /// Text value of a recognized key, if present and scalar.
    pub fn get(&self, key: &str) -> Option<&str> {
        return match self.fields.get(key).map(|f| return &f.value) {
            Some(FieldValue::Text(text)) => Some(text.as_str()),
            Some(FieldValue::Structured) | None => None,
        };
    }
}

/// Parsed llm.txt document. Owns every section and the parser's own diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Non-fatal observations made while parsing. Append-only.
    pub diagnostics: Vec<Diagnostic>,
    /// Parsed header block, if the document has one.
    pub frontmatter: Option<Frontmatter>,
    /// Sections in document order, the frontmatter included.
    pub sections: Vec<Section>,
    /// Text of the leading level-1 header.
    pub title: Option<String>,
}

impl Document {
    /// First `## Index` section.
    pub fn index(&self) -> Option<&Section> {
        return self.sections.iter().find(|s| return s.kind == SectionKind::Index);
    }

    /// Declared `language`, trimmed.
    pub fn language(&self) -> Option<&str> {
        return self
            .frontmatter
            .as_ref()
            .and_then(|f| return f.get("language"))
            .map(str::trim)
            .filter(|l| return !l.is_empty());
    }

    /// Every `### Module: <name>` section.
    pub fn module_sections(&self) -> impl Iterator<Item = &Section> {
        return self
            .sections
            .iter()
            .filter(|s| return matches!(s.kind, SectionKind::ModuleSection(_)));
    }

    /// Declared `package`, trimmed.
    pub fn package(&self) -> Option<&str> {
        return self
            .frontmatter
            .as_ref()
            .and_then(|f| return f.get("package"))
            .map(str::trim)
            .filter(|p| return !p.is_empty());
    }
}

/// What kind of object a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SymbolKind {
    /// `class X`.
    Class,
    /// `Function: f`.
    Function,
    /// `exception E`.
    Exception,
    /// A method owned by a class.
    Method,
    /// A header that did not follow the object grammar.
    Unknown,
}

impl SymbolKind {
    /// Lowercase label used in messages.
    pub const fn label(self) -> &'static str {
        return match self {
            SymbolKind::Class => "class",
            SymbolKind::Function => "function",
            SymbolKind::Exception => "exception",
            SymbolKind::Method => "method",
            SymbolKind::Unknown => "unrecognized object",
        };
    }
}

/// One declared symbol, from either the Index or a Module Section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolEntry {
    /// Object kind.
    pub kind: SymbolKind,
    /// Dotted module path the symbol belongs to.
    pub module: String,
    /// Bare symbol name.
    pub name: String,
    /// Owning class, for methods.
    pub owner: Option<String>,
    /// Parenthesized signature text, when the header carries one.
    pub signature: Option<String>,
    /// Where the symbol was declared.
    pub span: LineSpan,
}

impl SymbolEntry {
    /// `Owner.name` for methods, `name` otherwise.
    pub fn qualified_name(&self) -> String {
        return match &self.owner {
            Some(owner) => format!("{owner}.{}", self.name),
            None => self.name.clone(),
        };
    }

    /// Fully dotted path, module included.
    pub fn path(&self) -> String {
        return format!("{}.{}", self.module, self.qualified_name());
    }
}

/// Symbols declared for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSymbols {
    /// Declarations, in document order.
    pub entries: Vec<SymbolEntry>,
    /// Where the module itself was declared.
    pub span: LineSpan,
}

impl ModuleSymbols {
    /// First entry with the given qualified name.
    pub fn find(&self, qualified: &str) -> Option<&SymbolEntry> {
        return self.entries.iter().find(|e| return e.qualified_name() == qualified);
    }

    /// Whether any method is declared for `owner`.
    pub fn lists_methods_of(&self, owner: &str) -> bool {
        return self
            .entries
            .iter()
            .any(|e| return e.kind == SymbolKind::Method && e.owner.as_deref() == Some(owner));
    }
}

/// Module name to declared symbols. Two of these are built independently and diffed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SymbolTable {
    /// Modules keyed by dotted name.
    modules: BTreeMap<String, ModuleSymbols>,
}

impl SymbolTable {
    /// Whether a module is declared.
    pub fn contains_module(&self, module: &str) -> bool {
        return self.modules.contains_key(module);
    }

    /// Declare a module, keeping the first span if it is already known.
    pub fn declare_module(&mut self, module: &str, span: LineSpan) {
        self.modules
            .entry(module.to_string())
            .or_insert_with(|| return ModuleSymbols { entries: Vec::new(), span });
    }

    /// Symbols of one module.
    pub fn get(&self, module: &str) -> Option<&ModuleSymbols> {
        return self.modules.get(module);
    }

    /// Add a symbol, declaring its module on first sight.
    pub fn insert(&mut self, entry: SymbolEntry) {
        let span = entry.span;
        self.modules
            .entry(entry.module.clone())
            .or_insert_with(|| return ModuleSymbols { entries: Vec::new(), span })
            .entries
            .push(entry);
    }

    /// Whether no module is declared.
    pub fn is_empty(&self) -> bool {
        return self.modules.is_empty();
    }

    /// Modules in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleSymbols)> {
        return self.modules.iter().map(|(name, symbols)| return (name.as_str(), symbols));
    }

    /// Module names in order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        return self.modules.keys().map(String::as_str);
    }

    /// Total number of declared symbols.
    pub fn symbol_count(&self) -> usize {
        return self.modules.values().map(|m| return m.entries.len()).sum();
    }
}

/// A dotted identifier found in fenced example code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Section the code block belongs to.
    pub section: SectionKind,
    /// Line of the occurrence.
    pub span: LineSpan,
    /// Path after import aliases are expanded.
    pub target: String,
    /// The text as it occurs in the code.
    pub text: String,
}
