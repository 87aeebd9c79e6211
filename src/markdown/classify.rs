use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::lines::{tokenize, Line, LineKind};

static KEY_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\*([^*]+?)(?::\*\*|\*\*\s*:)\s*(.+?)(?:\s+-\s+(.+?))?\s*$").unwrap()
});
static EXPLANATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\*\*explanation(?::\*\*|\*\*\s*:)\s*(.*)$").unwrap()
});
static TABLE_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|?(\s*:?-+:?\s*\|)+\s*:?-*:?\s*$").unwrap());

/// `**Name**: Value - Description`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValue {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Shape assigned to one span of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StructuredValue {
    List(Vec<String>),
    Table(Vec<KeyValue>),
    Code(Vec<CodeBlock>),
    Text(String),
}

impl StructuredValue {
    pub fn is_empty(&self) -> bool {
        match self {
            StructuredValue::List(items) => items.is_empty(),
            StructuredValue::Table(rows) => rows.is_empty(),
            StructuredValue::Code(blocks) => blocks.is_empty(),
            StructuredValue::Text(text) => text.is_empty(),
        }
    }
}

/// Classify a span: list, then key/value, then code, then metrics table, else
/// trimmed text. A span with any bullet is a list; its other lines are dropped.
pub fn classify(content: &str) -> StructuredValue {
    let content = content.trim();
    if content.is_empty() {
        return StructuredValue::Text(String::new());
    }

    let lines = tokenize(content);

    let items = list_items(&lines);
    if !items.is_empty() {
        let dropped = lines
            .iter()
            .filter(|l| matches!(l.kind, LineKind::Text(_)))
            .count();
        if dropped > 0 {
            debug!("List span dropped {} non-bullet lines", dropped);
        }
        return StructuredValue::List(items);
    }

    let pairs = key_values(&lines);
    if !pairs.is_empty() {
        return StructuredValue::Table(pairs);
    }

    let blocks = code_blocks(content, &lines);
    if !blocks.is_empty() {
        return StructuredValue::Code(blocks);
    }

    let rows = table_rows(&lines);
    if !rows.is_empty() {
        return StructuredValue::Table(rows);
    }

    StructuredValue::Text(content.to_string())
}

/// Bullet items (`-`, `*`, `+`) in source order, markers stripped.
pub fn parse_list(content: &str) -> Vec<String> {
    list_items(&tokenize(content))
}

pub fn parse_key_values(content: &str) -> Vec<KeyValue> {
    key_values(&tokenize(content))
}

pub fn parse_code_blocks(content: &str) -> Vec<CodeBlock> {
    code_blocks(content, &tokenize(content))
}

/// Key/value pairs, bullet-prefixed pairs and markdown table rows, in source
/// order.
pub fn parse_metrics(content: &str) -> Vec<KeyValue> {
    let lines = tokenize(content);
    let mut metrics = Vec::new();
    let mut in_table = false;

    for line in &lines {
        match line.kind {
            LineKind::Text(t) if t.starts_with('|') => {
                if !in_table {
                    // header row
                    in_table = true;
                    continue;
                }
                if let Some(row) = table_row(t) {
                    metrics.push(row);
                }
            }
            LineKind::Text(t) | LineKind::Bullet(t) => {
                in_table = false;
                if let Some(pair) = key_value(t) {
                    metrics.push(pair);
                }
            }
            _ => in_table = false,
        }
    }

    metrics
}

fn list_items(lines: &[Line]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|l| match l.kind {
            LineKind::Bullet(item) if !item.is_empty() => Some(item.to_string()),
            _ => None,
        })
        .collect()
}

fn key_values(lines: &[Line]) -> Vec<KeyValue> {
    lines
        .iter()
        .filter_map(|l| match l.kind {
            // `**Explanation**:` belongs to the preceding code block
            LineKind::Text(t) if !EXPLANATION_RE.is_match(t) => key_value(t),
            _ => None,
        })
        .collect()
}

fn key_value(text: &str) -> Option<KeyValue> {
    let caps = KEY_VALUE_RE.captures(text)?;
    Some(KeyValue {
        name: caps[1].trim().to_string(),
        value: caps[2].trim().to_string(),
        description: caps.get(3).map(|d| d.as_str().trim().to_string()),
    })
}

fn table_rows(lines: &[Line]) -> Vec<KeyValue> {
    let mut rows = Vec::new();
    let mut in_table = false;
    for line in lines {
        match line.kind {
            LineKind::Text(t) if t.starts_with('|') => {
                if in_table {
                    rows.extend(table_row(t));
                }
                in_table = true;
            }
            _ => in_table = false,
        }
    }
    rows
}

fn table_row(text: &str) -> Option<KeyValue> {
    if TABLE_SEPARATOR_RE.is_match(text) {
        return None;
    }
    let cells: Vec<&str> = text
        .trim()
        .trim_matches('|')
        .split('|')
        .map(str::trim)
        .collect();
    let name = cells.first().filter(|c| !c.is_empty())?;
    Some(KeyValue {
        name: strip_emphasis(name),
        value: cells.get(1).map(|c| strip_emphasis(c)).unwrap_or_default(),
        description: cells
            .get(2)
            .filter(|c| !c.is_empty())
            .map(|c| strip_emphasis(c)),
    })
}

fn strip_emphasis(cell: &str) -> String {
    cell.trim_matches('*').trim().to_string()
}

fn code_blocks(content: &str, lines: &[Line]) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let language = match lines[i].kind {
            LineKind::Fence { language } => language,
            _ => {
                i += 1;
                continue;
            }
        };

        let body_start = lines[i].end;
        let close = (i + 1..lines.len()).find(|&j| lines[j].kind == LineKind::FenceEnd);
        let body_end = close.map_or(content.len(), |j| lines[j].start);
        let code = content[body_start..body_end.max(body_start)]
            .strip_suffix('\n')
            .map(|c| c.strip_suffix('\r').unwrap_or(c))
            .unwrap_or(&content[body_start..body_end.max(body_start)]);

        i = close.map_or(lines.len(), |j| j + 1);
        let (explanation, next) = explanation_after(lines, i);
        i = next;

        blocks.push(CodeBlock {
            language: if language.is_empty() {
                "text".to_string()
            } else {
                language.to_string()
            },
            code: code.to_string(),
            explanation,
        });
    }

    blocks
}

/// An `**Explanation**:` paragraph following a closing fence. Runs until a
/// heading, another fence, or two blank lines in a row.
fn explanation_after(lines: &[Line], from: usize) -> (Option<String>, usize) {
    let mut i = from;
    while i < lines.len() && lines[i].is_blank() {
        i += 1;
    }

    let first = match lines.get(i).map(|l| l.kind) {
        Some(LineKind::Text(t)) => match EXPLANATION_RE.captures(t) {
            Some(caps) => caps[1].trim().to_string(),
            None => return (None, from),
        },
        _ => return (None, from),
    };

    let mut parts = vec![first];
    let mut blanks = 0;
    i += 1;
    while i < lines.len() {
        match lines[i].kind {
            LineKind::Heading { .. } | LineKind::Fence { .. } => break,
            LineKind::Blank => {
                blanks += 1;
                if blanks >= 2 {
                    break;
                }
            }
            _ => {
                blanks = 0;
                parts.push(lines[i].raw.trim().to_string());
            }
        }
        i += 1;
    }

    let text = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    ((!text.is_empty()).then_some(text), i)
}
