use std::sync::LazyLock;

use regex::Regex;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]*([^#\s].*?)[ \t]*$").unwrap());
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").unwrap());
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*```\s*([^`\s]*)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Heading { level: u8, text: &'a str },
    Bullet(&'a str),
    /// Opening fence; `language` is empty when the fence carries no tag.
    Fence { language: &'a str },
    FenceEnd,
    Code,
    Text(&'a str),
    Blank,
}

/// One physical line of a document with its byte coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub kind: LineKind<'a>,
    /// Line text without its terminator.
    pub raw: &'a str,
    /// Offset of the first byte of the line.
    pub start: usize,
    /// Offset just past the line terminator (or document end).
    pub end: usize,
}

impl Line<'_> {
    pub fn heading_level(&self) -> Option<u8> {
        match self.kind {
            LineKind::Heading { level, .. } => Some(level),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.kind, LineKind::Blank)
    }
}

/// Classify every line of `doc`. Lines between code fences are `Code`, so
/// `#` comments inside a shell snippet never become headings.
pub fn tokenize(doc: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    let mut in_fence = false;

    for chunk in doc.split_inclusive('\n') {
        let start = offset;
        offset += chunk.len();
        let raw = chunk.trim_end_matches(['\n', '\r']);

        let kind = if in_fence {
            if raw.trim() == "```" {
                in_fence = false;
                LineKind::FenceEnd
            } else {
                LineKind::Code
            }
        } else {
            classify_line(raw, &mut in_fence)
        };

        lines.push(Line {
            kind,
            raw,
            start,
            end: offset,
        });
    }

    lines
}

fn classify_line<'a>(raw: &'a str, in_fence: &mut bool) -> LineKind<'a> {
    if raw.trim().is_empty() {
        return LineKind::Blank;
    }

    if let Some(caps) = FENCE_RE.captures(raw) {
        *in_fence = true;
        let language = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::Fence { language };
    }

    if let Some(caps) = HEADING_RE.captures(raw) {
        if let (Some(hashes), Some(text)) = (caps.get(1), caps.get(2)) {
            return LineKind::Heading {
                level: hashes.as_str().len() as u8,
                text: text.as_str(),
            };
        }
    }

    if let Some(item) = BULLET_RE.captures(raw).and_then(|c| c.get(1)) {
        return LineKind::Bullet(item.as_str().trim());
    }

    LineKind::Text(raw.trim())
}
