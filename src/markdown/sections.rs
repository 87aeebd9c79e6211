use super::lines::{tokenize, Line, LineKind};

/// Byte range `[start, end)` over a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn slice<'a>(&self, doc: &'a str) -> &'a str {
        &doc[self.start..self.end]
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A `##` section (or `###` subsection) of a document.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub header: &'a str,
    pub level: u8,
    /// Content after the header line, leading blank lines skipped and trailing
    /// whitespace trimmed.
    pub span: Span,
    pub body: &'a str,
    /// Content before the first child header (the whole body when there are
    /// no children).
    pub intro: &'a str,
    pub children: Vec<Section<'a>>,
}

/// Title, description and the `##` → `###` header tree of a template.
#[derive(Debug, Clone)]
pub struct Outline<'a> {
    pub title: Option<&'a str>,
    pub description: Option<String>,
    pub sections: Vec<Section<'a>>,
}

const SECTION_LEVEL: u8 = 2;
const SUBSECTION_LEVEL: u8 = 3;

/// Content of the first `## <header>` section, or `""` when absent.
pub fn extract_section<'a>(doc: &'a str, header: &str, end_header: Option<&str>) -> &'a str {
    find_section(doc, header, end_header).map_or("", |span| span.slice(doc))
}

/// Content of the first `### <header>` subsection, or `""` when absent.
/// Stops at the next `#`, `##` or `###` header.
pub fn extract_subsection<'a>(doc: &'a str, header: &str, end_header: Option<&str>) -> &'a str {
    find_subsection(doc, header, end_header).map_or("", |span| span.slice(doc))
}

pub fn find_section(doc: &str, header: &str, end_header: Option<&str>) -> Option<Span> {
    find_at_level(doc, SECTION_LEVEL, header, end_header)
}

pub fn find_subsection(doc: &str, header: &str, end_header: Option<&str>) -> Option<Span> {
    find_at_level(doc, SUBSECTION_LEVEL, header, end_header)
}

/// Case-insensitive header comparison, ignoring surrounding whitespace.
pub fn header_matches(text: &str, label: &str) -> bool {
    text.trim().to_lowercase() == label.trim().to_lowercase()
}

fn find_at_level(doc: &str, level: u8, header: &str, end_header: Option<&str>) -> Option<Span> {
    let lines = tokenize(doc);
    let is_header_at = |line: &Line, label: &str| {
        matches!(line.kind, LineKind::Heading { level: l, text } if l == level && header_matches(text, label))
    };

    let start = lines.iter().position(|l| is_header_at(l, header))?;
    let rest = &lines[start + 1..];

    let stop = end_header
        .and_then(|end| rest.iter().position(|l| is_header_at(l, end)))
        .or_else(|| {
            rest.iter()
                .position(|l| l.heading_level().is_some_and(|lv| lv <= level))
        })
        .map(|i| start + 1 + i);

    Some(content_span(doc, &lines, start, stop))
}

/// Span of the content between header line `header_idx` and line `stop_idx`
/// (exclusive; `None` means end of document).
fn content_span(doc: &str, lines: &[Line], header_idx: usize, stop_idx: Option<usize>) -> Span {
    let end_idx = stop_idx.unwrap_or(lines.len());
    let end = stop_idx.map_or(doc.len(), |i| lines[i].start);

    let start = lines[header_idx + 1..end_idx]
        .iter()
        .find(|l| !l.is_blank())
        .map_or(end, |l| l.start);

    let end = start + doc[start..end].trim_end().len();
    Span { start, end }
}

/// Group the whole document into an outline. Sections nest one level
/// (`##` → `###`); deeper headers stay inside their subsection's text.
pub fn build_outline(doc: &str) -> Outline<'_> {
    let lines = tokenize(doc);

    let title_idx = lines
        .iter()
        .position(|l| l.heading_level() == Some(1));
    let title = title_idx.and_then(|i| match lines[i].kind {
        LineKind::Heading { text, .. } => Some(text),
        _ => None,
    });

    let description = first_paragraph(&lines[title_idx.map_or(0, |i| i + 1)..]);
    let sections = group(doc, &lines, 0, lines.len(), SECTION_LEVEL);

    Outline {
        title,
        description,
        sections,
    }
}

/// Collect the sections at `level` whose headers fall in `lines[from..to]`.
fn group<'a>(doc: &'a str, lines: &[Line<'a>], from: usize, to: usize, level: u8) -> Vec<Section<'a>> {
    let mut sections = Vec::new();
    let mut i = from;

    while i < to {
        let header = match lines[i].kind {
            LineKind::Heading { level: l, text } if l == level => text,
            _ => {
                i += 1;
                continue;
            }
        };

        let stop = (i + 1..to).find(|&j| lines[j].heading_level().is_some_and(|lv| lv <= level));
        let stop_idx = stop.unwrap_or(to);
        // The document end only applies when grouping runs to the last line.
        let span_stop = if stop_idx == lines.len() { None } else { Some(stop_idx) };
        let span = content_span(doc, lines, i, span_stop);

        let children = if level < SUBSECTION_LEVEL {
            group(doc, lines, i + 1, stop_idx, level + 1)
        } else {
            Vec::new()
        };

        let intro = match children.first() {
            Some(_) => {
                let child_header = (i + 1..stop_idx)
                    .find(|&j| lines[j].heading_level() == Some(level + 1))
                    .map_or(span.end, |j| lines[j].start);
                let end = child_header.max(span.start);
                doc[span.start..end].trim_end()
            }
            None => span.slice(doc),
        };

        sections.push(Section {
            header: header.trim(),
            level,
            span,
            body: span.slice(doc),
            intro,
            children,
        });
        i = stop_idx;
    }

    sections
}

/// First run of consecutive text lines, joined by single spaces. Stops at the
/// first header.
fn first_paragraph(lines: &[Line]) -> Option<String> {
    let mut parts = Vec::new();
    for line in lines {
        match line.kind {
            LineKind::Text(t) => parts.push(t),
            LineKind::Blank if parts.is_empty() => {}
            _ => break,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

impl<'a> Section<'a> {
    /// First child whose header matches `header` case-insensitively.
    pub fn child(&self, header: &str) -> Option<&Section<'a>> {
        self.children.iter().find(|c| header_matches(c.header, header))
    }
}
