//! Line-oriented parser: raw llm.txt text to a `Document`.
//!
//! Fenced code is tracked as its own state so that header-like or list-like
//! lines inside example code never become document structure.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{
    BodyLine, Code, CodeBlock, Diagnostic, Document, FRONTMATTER_KEYS, FieldValue, Frontmatter,
    FrontmatterField, LineSpan, Section, SectionKind,
};

/// `---` on a line of its own.
static FRONTMATTER_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^---\s*$").expect("valid regex"));

/// ATX header: up to three spaces, one to six `#`, then a space or end of line.
static ATX_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?[ \t]*$").expect("valid regex");
});

/// Opening fence with an optional info string.
static FENCE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^([ \t]*)(`{3,}|~{3,})[ \t]*([^`\s]*)").expect("valid regex");
});

/// Closing fence: markers and trailing whitespace only.
static FENCE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^[ \t]*(`{3,}|~{3,})[ \t]*$").expect("valid regex"));

/// `Module: <name>` heading text.
static MODULE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"(?i)^module\s*:\s*(.+)$").expect("valid regex"));

/// Heading given to body text that appears before any header.
const PREAMBLE: &str = "(preamble)";

/// A fatal parse failure. The pipeline stops and reports only this diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// The single diagnostic describing the failure.
    pub diagnostic: Diagnostic,
}

impl ParseFailure {
    /// Wrap a diagnostic as fatal.
    const fn new(diagnostic: Diagnostic) -> Self {
        return Self { diagnostic };
    }
}

/// Parser states, in the order a well-formed document walks through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitFrontmatterOpen,
    InFrontmatter,
    BetweenSections,
    InSectionBody,
    InFencedCode,
    Done,
}

/// One input line with its position.
#[derive(Clone, Copy)]
struct LineRef<'a> {
    /// Byte offset just past the line terminator.
    end: usize,
    /// One-based line number.
    number: u32,
    /// Byte offset of the first character.
    start: usize,
    /// Content without the line terminator.
    text: &'a str,
}

/// Frontmatter lines collected between the delimiters.
struct FrontmatterBuffer {
    lines: Vec<BodyLine>,
    start: u32,
    start_byte: usize,
}

/// A fence that has been opened but not yet closed.
struct OpenFence {
    indent: usize,
    info: String,
    lines: Vec<String>,
    marker: char,
    marker_len: usize,
    start: u32,
}

/// A section whose end has not been seen yet.
struct SectionBuilder {
    code_blocks: Vec<CodeBlock>,
    end: u32,
    end_byte: usize,
    heading: String,
    kind: SectionKind,
    level: u8,
    lines: Vec<BodyLine>,
    start: u32,
    start_byte: usize,
}

impl SectionBuilder {
    /// Close the section. The span ends at the last non-blank line.
    fn build(self) -> Section {
        return Section {
            bytes: self.start_byte..self.end_byte,
            code_blocks: self.code_blocks,
            heading: self.heading,
            kind: self.kind,
            level: self.level,
            lines: self.lines,
            span: LineSpan::new(self.start, self.end),
        };
    }
}

/// Mutable parser state for one buffer.
struct Parser {
    current: Option<SectionBuilder>,
    diagnostics: Vec<Diagnostic>,
    fence: Option<OpenFence>,
    frontmatter: Option<Frontmatter>,
    frontmatter_buffer: Option<FrontmatterBuffer>,
    sections: Vec<Section>,
    state: State,
    title: Option<String>,
}

/// Parse one llm.txt buffer.
///
/// # Errors
///
/// Returns `ParseFailure` carrying `MalformedFrontmatter` when the frontmatter
/// is never closed or is not a YAML mapping, and `UnterminatedCodeBlock` when
/// a fence is still open at end of input.
pub fn parse(text: &str) -> Result<Document, ParseFailure> {
    let mut parser = Parser {
        current: None,
        diagnostics: Vec::new(),
        fence: None,
        frontmatter: None,
        frontmatter_buffer: None,
        sections: Vec::new(),
        state: State::AwaitFrontmatterOpen,
        title: None,
    };

    let mut offset = 0_usize;
    let mut number = 0_u32;
    for raw in text.split_inclusive('\n') {
        number = number.saturating_add(1);
        let mut line = raw.trim_end_matches(['\n', '\r']);
        if number == 1 {
            line = line.strip_prefix('\u{feff}').unwrap_or(line);
        }
        let start = offset;
        offset = offset.saturating_add(raw.len());
        parser.feed(LineRef { end: offset, number, start, text: line })?;
    }

    return parser.finish(number);
}

impl Parser {
    /// Route one line according to the current state.
    fn feed(&mut self, line: LineRef<'_>) -> Result<(), ParseFailure> {
        match self.state {
            State::AwaitFrontmatterOpen => {
                if FRONTMATTER_DELIMITER.is_match(line.text) {
                    self.frontmatter_buffer = Some(FrontmatterBuffer {
                        lines: Vec::new(),
                        start: line.number,
                        start_byte: line.start,
                    });
                    self.state = State::InFrontmatter;
                    return Ok(());
                }
                self.state = State::BetweenSections;
                self.feed_structure(line);
            },
            State::InFrontmatter => return self.feed_frontmatter(line),
            State::BetweenSections | State::InSectionBody => self.feed_structure(line),
            State::InFencedCode => self.feed_fenced(line),
            State::Done => {},
        }
        return Ok(());
    }

    /// Collect frontmatter lines until the closing delimiter.
    fn feed_frontmatter(&mut self, line: LineRef<'_>) -> Result<(), ParseFailure> {
        if FRONTMATTER_DELIMITER.is_match(line.text) {
            let Some(buffer) = self.frontmatter_buffer.take() else {
                return Ok(());
            };
            let span = LineSpan::new(buffer.start, line.number);
            self.frontmatter = Some(build_frontmatter(&buffer.lines, span)?);
            self.sections.push(Section {
                bytes: buffer.start_byte..line.end,
                code_blocks: Vec::new(),
                heading: String::new(),
                kind: SectionKind::Frontmatter,
                level: 0,
                lines: buffer.lines,
                span,
            });
            self.state = State::BetweenSections;
            return Ok(());
        }

        // A lone `# ` is a YAML comment; `##` and deeper can only be Markdown.
        if let Some((level, _)) = parse_atx_heading(line.text)
            && level >= 2
        {
            let start = self.frontmatter_buffer.as_ref().map_or(1, |b| return b.start);
            return Err(ParseFailure::new(Diagnostic::error(
                Code::MalformedFrontmatter,
                LineSpan::new(start, line.number),
                format!(
                    "frontmatter opened on line {start} is not closed by `---` before the header on line {}",
                    line.number
                ),
            )));
        }

        if let Some(buffer) = self.frontmatter_buffer.as_mut() {
            buffer.lines.push(BodyLine {
                fenced: false,
                number: line.number,
                text: line.text.to_string(),
            });
        }
        return Ok(());
    }

    /// Handle a line outside fenced code: fence openers, headers, body text.
    fn feed_structure(&mut self, line: LineRef<'_>) {
        if let Some(fence) = parse_fence_opener(line.text, line.number) {
            self.ensure_section(line);
            self.push_body_line(line, true);
            self.fence = Some(fence);
            self.state = State::InFencedCode;
            return;
        }

        if let Some((level, heading)) = parse_atx_heading(line.text)
            && let Some(kind) = self.classify_heading(level, &heading)
        {
            self.open_section(kind, level, heading, line);
            return;
        }

        if self.current.is_none() && line.text.trim().is_empty() {
            return;
        }
        self.ensure_section(line);
        self.push_body_line(line, false);
    }

    /// Handle a line inside fenced code.
    fn feed_fenced(&mut self, line: LineRef<'_>) {
        self.push_body_line(line, true);

        let closes = self.fence.as_ref().is_some_and(|f| return fence_closes(f, line.text));
        if !closes {
            if let Some(fence) = self.fence.as_mut() {
                fence.lines.push(strip_indent(line.text, fence.indent).to_string());
            }
            return;
        }

        if let Some(fence) = self.fence.take() {
            let block = CodeBlock {
                first_line: fence.start.saturating_add(1),
                info: fence.info,
                span: LineSpan::new(fence.start, line.number),
                text: fence.lines.join("\n"),
            };
            if let Some(current) = self.current.as_mut() {
                current.code_blocks.push(block);
            }
        }
        self.state = State::InSectionBody;
    }

    /// Decide whether a header opens a new top-level section.
    /// Returns `None` when the header belongs to the current section's body.
    fn classify_heading(&self, level: u8, heading: &str) -> Option<SectionKind> {
        return match level {
            1 => {
                let nothing_yet = self.current.is_none()
                    && self.title.is_none()
                    && self.sections.iter().all(|s| return s.kind == SectionKind::Frontmatter);
                if nothing_yet {
                    Some(SectionKind::Title)
                } else {
                    Some(SectionKind::Unknown(heading.to_string()))
                }
            },
            2 => Some(
                section_kind_for_title(heading)
                    .unwrap_or_else(|| return SectionKind::Unknown(heading.to_string())),
            ),
            3 => module_name_from_heading(heading).map(SectionKind::ModuleSection),
            _ => None,
        };
    }

    /// Close the current section and start a new one at `line`.
    fn open_section(&mut self, kind: SectionKind, level: u8, heading: String, line: LineRef<'_>) {
        self.close_current();

        if kind == SectionKind::Title {
            self.title = Some(heading.clone());
        }
        if let SectionKind::Unknown(title) = &kind {
            self.diagnostics.push(Diagnostic::info(
                Code::UnknownSection,
                LineSpan::line(line.number),
                format!("header `{title}` is not a known llm.txt section; its content is kept as an unknown section"),
            ));
        }

        self.current = Some(SectionBuilder {
            code_blocks: Vec::new(),
            end: line.number,
            end_byte: line.end,
            heading,
            kind,
            level,
            lines: Vec::new(),
            start: line.number,
            start_byte: line.start,
        });
        self.state = State::InSectionBody;
    }

    /// Make sure body text has a section to land in.
    fn ensure_section(&mut self, line: LineRef<'_>) {
        if self.current.is_some() {
            return;
        }
        self.diagnostics.push(Diagnostic::info(
            Code::UnknownSection,
            LineSpan::line(line.number),
            "text before the first section header is kept as an unknown preamble section",
        ));
        self.current = Some(SectionBuilder {
            code_blocks: Vec::new(),
            end: line.number,
            end_byte: line.start,
            heading: PREAMBLE.to_string(),
            kind: SectionKind::Unknown(PREAMBLE.to_string()),
            level: 0,
            lines: Vec::new(),
            start: line.number,
            start_byte: line.start,
        });
        self.state = State::InSectionBody;
    }

    /// Append a line to the current section, extending its span past non-blank lines.
    fn push_body_line(&mut self, line: LineRef<'_>, fenced: bool) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        if !line.text.trim().is_empty() {
            current.end = line.number;
            current.end_byte = line.end;
        }
        current.lines.push(BodyLine {
            fenced,
            number: line.number,
            text: line.text.to_string(),
        });
    }

    /// Move the open section, if any, into the finished list.
    fn close_current(&mut self) {
        if let Some(builder) = self.current.take() {
            self.sections.push(builder.build());
        }
    }

    /// End of input: report unterminated constructs, otherwise assemble the document.
    fn finish(mut self, last_line: u32) -> Result<Document, ParseFailure> {
        match self.state {
            State::InFrontmatter => {
                let start = self.frontmatter_buffer.as_ref().map_or(1, |b| return b.start);
                return Err(ParseFailure::new(Diagnostic::error(
                    Code::MalformedFrontmatter,
                    LineSpan::new(start, last_line.max(start)),
                    format!("frontmatter opened on line {start} is never closed by `---`"),
                )));
            },
            State::InFencedCode => {
                let start = self.fence.as_ref().map_or(last_line, |f| return f.start);
                return Err(ParseFailure::new(Diagnostic::error(
                    Code::UnterminatedCodeBlock,
                    LineSpan::new(start, last_line),
                    format!("code block opened on line {start} is still open at end of input"),
                )));
            },
            State::AwaitFrontmatterOpen
            | State::BetweenSections
            | State::InSectionBody
            | State::Done => {},
        }

        self.close_current();
        self.state = State::Done;
        tracing::debug!(sections = self.sections.len(), lines = last_line, "parsed document");

        return Ok(Document {
            diagnostics: self.diagnostics,
            frontmatter: self.frontmatter,
            sections: self.sections,
            title: self.title,
        });
    }
}

/// Parse an ATX header into its level and trimmed text (closing `#`s removed).
pub fn parse_atx_heading(line: &str) -> Option<(u8, String)> {
    let caps = ATX_HEADING.captures(line)?;
    let level = u8::try_from(caps.get(1)?.as_str().len()).ok()?;
    let raw = caps.get(2).map_or("", |m| return m.as_str());

    // `## Title ##`: the closing sequence must be preceded by a space.
    let without_closing = raw.trim_end_matches('#');
    let text = if without_closing.len() < raw.len()
        && (without_closing.is_empty() || without_closing.ends_with([' ', '\t']))
    {
        without_closing.trim()
    } else {
        raw.trim()
    };
    return Some((level, text.to_string()));
}

/// Recognize an opening fence.
fn parse_fence_opener(line: &str, number: u32) -> Option<OpenFence> {
    let caps = FENCE_OPEN.captures(line)?;
    let indent = caps.get(1).map_or(0, |m| return m.as_str().len());
    let markers = caps.get(2)?.as_str();
    let marker = markers.chars().next()?;
    let info = caps
        .get(3)
        .map_or("", |m| return m.as_str())
        .trim_start_matches('{')
        .trim_start_matches('.')
        .trim_end_matches('}')
        .to_ascii_lowercase();

    return Some(OpenFence {
        indent,
        info,
        lines: Vec::new(),
        marker,
        marker_len: markers.len(),
        start: number,
    });
}

/// Whether `line` closes `fence`: same marker character, at least as long.
fn fence_closes(fence: &OpenFence, line: &str) -> bool {
    let Some(caps) = FENCE_CLOSE.captures(line) else {
        return false;
    };
    let Some(markers) = caps.get(1).map(|m| return m.as_str()) else {
        return false;
    };
    return markers.starts_with(fence.marker) && markers.len() >= fence.marker_len;
}

/// Remove up to `indent` leading spaces.
fn strip_indent(line: &str, indent: usize) -> &str {
    let leading = line.len().saturating_sub(line.trim_start_matches(' ').len());
    let cut = leading.min(indent);
    return line.get(cut..).unwrap_or(line);
}

/// Normalize heading text for vocabulary lookup.
fn normalize_title(heading: &str) -> String {
    let stripped: String = heading.chars().filter(|c| return !matches!(c, '*' | '`' | '_')).collect();
    let trimmed = stripped.trim().trim_end_matches(':').trim();
    return trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
}

/// Map a level-2 heading to its section kind, if it is in the vocabulary.
pub fn section_kind_for_title(heading: &str) -> Option<SectionKind> {
    return match normalize_title(heading).as_str() {
        "core concepts" | "concepts" | "key concepts" => Some(SectionKind::CoreConcepts),
        "pitfalls" | "common pitfalls" | "common pitfalls and gotchas" | "gotchas" => {
            Some(SectionKind::Pitfalls)
        },
        "index" | "api index" | "module index" => Some(SectionKind::Index),
        "module sections" | "modules" | "api reference" => Some(SectionKind::ModuleSections),
        "global examples" | "examples" | "usage examples" => Some(SectionKind::GlobalExamples),
        _ => None,
    };
}

/// Extract the module name from `Module: <name>` heading text.
fn module_name_from_heading(heading: &str) -> Option<String> {
    let caps = MODULE_HEADING.captures(heading)?;
    let name: String = caps
        .get(1)?
        .as_str()
        .chars()
        .filter(|c| return !matches!(c, '`' | '*'))
        .collect();
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    return Some(name.to_string());
}

/// Turn the collected frontmatter lines into a `Frontmatter`.
///
/// # Errors
///
/// Returns `MalformedFrontmatter` when the block is not valid YAML or not a mapping.
fn build_frontmatter(lines: &[BodyLine], span: LineSpan) -> Result<Frontmatter, ParseFailure> {
    let source = lines
        .iter()
        .map(|l| return l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let malformed = |reason: String| {
        return ParseFailure::new(Diagnostic::error(Code::MalformedFrontmatter, span, reason));
    };

    let value: serde_yaml::Value = serde_yaml::from_str(&source)
        .map_err(|e| return malformed(format!("frontmatter is not valid YAML: {e}")))?;

    let mapping = match value {
        serde_yaml::Value::Null => serde_yaml::Mapping::new(),
        serde_yaml::Value::Mapping(mapping) => mapping,
        serde_yaml::Value::Bool(_)
        | serde_yaml::Value::Number(_)
        | serde_yaml::Value::String(_)
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Tagged(_) => {
            return Err(malformed("frontmatter must be a mapping of `key: value` pairs".to_string()));
        },
    };

    let mut fields = BTreeMap::new();
    let mut unrecognized = BTreeSet::new();
    for (key, value) in &mapping {
        let Some(key) = key.as_str() else {
            return Err(malformed("frontmatter keys must be strings".to_string()));
        };
        if !FRONTMATTER_KEYS.iter().any(|known| return *known == key) {
            unrecognized.insert(key.to_string());
            continue;
        }
        let line = key_line(lines, key).unwrap_or(span.start);
        fields.insert(
            key.to_string(),
            FrontmatterField {
                line,
                value: field_value(value),
            },
        );
    }

    return Ok(Frontmatter { fields, span, unrecognized });
}

/// Render a YAML value as a frontmatter field.
fn field_value(value: &serde_yaml::Value) -> FieldValue {
    return match value {
        serde_yaml::Value::Null => FieldValue::Text(String::new()),
        serde_yaml::Value::Bool(b) => FieldValue::Text(b.to_string()),
        serde_yaml::Value::Number(n) => FieldValue::Text(n.to_string()),
        serde_yaml::Value::String(s) => FieldValue::Text(s.clone()),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => FieldValue::Structured,
        serde_yaml::Value::Tagged(tagged) => field_value(&tagged.value),
    };
}

/// Line on which a top-level key is written.
fn key_line(lines: &[BodyLine], key: &str) -> Option<u32> {
    return lines
        .iter()
        .find(|l| {
            return l
                .text
                .strip_prefix(key)
                .is_some_and(|rest| return rest.trim_start().starts_with(':'));
        })
        .map(|l| return l.number);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "tests")]
mod tests {
    use super::*;

    const MINIMAL: &str = "\
---
package: demo
version: 1.0.0
language: python
summary: Demo package.
---

# demo

Tagline.

## Index

- **`demo`**
  - Functions: `run`

## Module Sections

### Module: demo

#### Function: run()

```python
# ## Index
#### class NotReal
```
";

    fn kinds(doc: &Document) -> Vec<SectionKind> {
        return doc.sections.iter().map(|s| return s.kind.clone()).collect();
    }

    #[test]
    fn splits_known_sections_in_order() {
        let doc = parse(MINIMAL).unwrap();
        assert_eq!(
            kinds(&doc),
            vec![
                SectionKind::Frontmatter,
                SectionKind::Title,
                SectionKind::Index,
                SectionKind::ModuleSections,
                SectionKind::ModuleSection("demo".to_string()),
            ]
        );
        assert_eq!(doc.title.as_deref(), Some("demo"));
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn headers_inside_fences_are_not_structure() {
        let doc = parse(MINIMAL).unwrap();
        let module = doc.sections.last().unwrap();
        assert_eq!(module.code_blocks.len(), 1);
        assert_eq!(module.code_blocks[0].info, "python");
        assert!(module.code_blocks[0].text.contains("#### class NotReal"));
        assert_eq!(doc.sections.iter().filter(|s| return s.kind == SectionKind::Index).count(), 1);
    }

    #[test]
    fn spans_track_lines_and_bytes() {
        let doc = parse(MINIMAL).unwrap();
        let frontmatter = &doc.sections[0];
        assert_eq!(frontmatter.span, LineSpan::new(1, 6));
        let title = &doc.sections[1];
        assert_eq!(title.span, LineSpan::new(8, 10));
        assert_eq!(MINIMAL.get(title.bytes.clone()).unwrap(), "# demo\n\nTagline.\n");
    }

    #[test]
    fn frontmatter_fields_and_unrecognized_keys() {
        let doc = parse("---\npackage: demo\nversion: 2\nhomepage: x\n---\n").unwrap();
        let fm = doc.frontmatter.unwrap();
        assert_eq!(fm.get("package"), Some("demo"));
        assert_eq!(fm.get("version"), Some("2"));
        assert_eq!(fm.fields["version"].line, 3);
        assert!(fm.unrecognized.contains("homepage"));
    }

    #[test]
    fn unclosed_frontmatter_is_fatal() {
        let failure = parse("---\npackage: demo\n\n## Index\n").unwrap_err();
        assert_eq!(failure.diagnostic.code, Code::MalformedFrontmatter);
        assert_eq!(failure.diagnostic.span, LineSpan::new(1, 4));
    }

    #[test]
    fn yaml_comment_in_frontmatter_is_allowed() {
        let doc = parse("---\n# generated\npackage: demo\n---\n").unwrap();
        assert_eq!(doc.package(), Some("demo"));
    }

    #[test]
    fn non_mapping_frontmatter_is_fatal() {
        let failure = parse("---\n- a\n- b\n---\n").unwrap_err();
        assert_eq!(failure.diagnostic.code, Code::MalformedFrontmatter);
    }

    #[test]
    fn unterminated_fence_is_fatal() {
        let failure = parse("# t\n\n```python\nprint(1)\n").unwrap_err();
        assert_eq!(failure.diagnostic.code, Code::UnterminatedCodeBlock);
        assert_eq!(failure.diagnostic.span, LineSpan::new(3, 4));
    }

    #[test]
    fn shorter_fence_does_not_close() {
        let doc = parse("## Examples\n\n````\n```\n````\n").unwrap();
        let block = &doc.sections[0].code_blocks[0];
        assert_eq!(block.text, "```");
    }

    #[test]
    fn unknown_headers_are_kept() {
        let doc = parse("# t\n\n## Changelog\n\nstuff\n").unwrap();
        assert_eq!(doc.sections[1].kind, SectionKind::Unknown("Changelog".to_string()));
        assert_eq!(doc.sections[1].body_text(), "\nstuff");
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(doc.diagnostics[0].code, Code::UnknownSection);
    }

    #[test]
    fn preamble_text_is_kept() {
        let doc = parse("hello\n\n## Index\n").unwrap();
        assert_eq!(doc.sections[0].kind, SectionKind::Unknown(PREAMBLE.to_string()));
        assert_eq!(doc.sections[0].span, LineSpan::line(1));
    }

    #[test]
    fn vocabulary_is_case_insensitive() {
        assert_eq!(section_kind_for_title("CORE CONCEPTS"), Some(SectionKind::CoreConcepts));
        assert_eq!(section_kind_for_title("Common Pitfalls:"), Some(SectionKind::Pitfalls));
        assert_eq!(section_kind_for_title("**Index**"), Some(SectionKind::Index));
        assert_eq!(section_kind_for_title("Changelog"), None);
    }

    #[test]
    fn atx_closing_sequence_is_stripped() {
        assert_eq!(parse_atx_heading("## Index ##"), Some((2, "Index".to_string())));
        assert_eq!(parse_atx_heading("#### C#"), Some((4, "C#".to_string())));
        assert_eq!(parse_atx_heading("#hashtag"), None);
        assert_eq!(parse_atx_heading("    # indented code"), None);
    }

    #[test]
    fn module_heading_strips_formatting() {
        let doc = parse("### Module: `pkg.sub`\n\n#### class A\n").unwrap();
        assert_eq!(doc.sections[0].kind, SectionKind::ModuleSection("pkg.sub".to_string()));
    }
}
