use serde::Serialize;

use super::UNTITLED;
use crate::markdown::{
    build_outline, parse_code_blocks, parse_list, parse_metrics, KeyValue,
    Outline, Section,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TechStack {
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub databases: Vec<String>,
    pub tools: Vec<String>,
    pub platforms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub statement: String,
    pub challenges: Vec<String>,
    pub goals: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Architecture {
    pub overview: String,
    pub components: Vec<KeyValue>,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Performance {
    pub metrics: Vec<KeyValue>,
    pub benchmarks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSnippet {
    pub title: String,
    pub description: String,
    pub language: String,
    pub code: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Commentary {
    pub motivation: String,
    pub decisions: Vec<String>,
    pub lessons: Vec<String>,
    pub plans: Vec<String>,
}

/// Fixed-schema project page record. Every field other than `id` is absent
/// when its section is missing from the template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<TechStack>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<Problem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Architecture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<Performance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_snippets: Option<Vec<CodeSnippet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<Commentary>,
}

const KEY_FEATURES: &[&str] = &["key features", "features"];
const TECH_STACK: &[&str] = &["technology stack", "tech stack"];
const PROBLEM: &[&str] = &["problem statement", "problem"];
const ARCHITECTURE: &[&str] = &["architecture"];
const PERFORMANCE: &[&str] = &["performance metrics", "performance"];
const CODE_SNIPPETS: &[&str] = &["code snippets", "code"];
const COMMENTARY: &[&str] = &["commentary"];

pub fn parse_project(id: &str, doc: &str) -> ProjectDetails {
    from_outline(id, &build_outline(doc))
}

/// Project the outline's known sections onto `ProjectDetails`.
pub fn from_outline(id: &str, outline: &Outline) -> ProjectDetails {
    let sections = &outline.sections;

    ProjectDetails {
        id: id.to_string(),
        title: Some(outline.title.unwrap_or(UNTITLED).to_string()),
        description: outline.description.clone(),
        key_features: find(sections, KEY_FEATURES)
            .map(|s| items_or_lines(s.body))
            .filter(|items| !items.is_empty()),
        tech_stack: find(sections, TECH_STACK).map(tech_stack),
        problem: find(sections, PROBLEM).map(problem),
        architecture: find(sections, ARCHITECTURE).map(architecture),
        performance: find(sections, PERFORMANCE).map(performance),
        code_snippets: find(sections, CODE_SNIPPETS)
            .map(code_snippets)
            .filter(|snippets| !snippets.is_empty()),
        commentary: find(sections, COMMENTARY).map(commentary),
    }
}

/// Lowercased header with leading emoji/punctuation removed and whitespace
/// collapsed: `"## 🚀  Key Features:"` → `"key features"`.
pub fn label_key(header: &str) -> String {
    header
        .trim()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn find<'o, 'a>(sections: &'o [Section<'a>], labels: &[&str]) -> Option<&'o Section<'a>> {
    labels.iter().find_map(|label| {
        sections
            .iter()
            .find(|s| label_key(s.header) == *label)
    })
}

/// First child whose label contains any of `keywords`.
fn child<'o, 'a>(section: &'o Section<'a>, keywords: &[&str]) -> Option<&'o Section<'a>> {
    section.children.iter().find(|c| {
        let key = label_key(c.header);
        keywords.iter().any(|kw| key.contains(kw))
    })
}

fn items_or_lines(content: &str) -> Vec<String> {
    let items = parse_list(content);
    if !items.is_empty() {
        return items;
    }
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn child_items(section: &Section, keywords: &[&str]) -> Vec<String> {
    child(section, keywords)
        .map(|c| items_or_lines(c.body))
        .unwrap_or_default()
}

fn paragraph(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tech_stack(section: &Section) -> TechStack {
    if !section.children.is_empty() {
        return TechStack {
            languages: child_items(section, &["language"]),
            frameworks: child_items(section, &["framework", "librar"]),
            databases: child_items(section, &["database", "storage"]),
            tools: child_items(section, &["tool"]),
            platforms: child_items(section, &["platform", "infrastructure", "deploy"]),
        };
    }

    // `**Languages**: Rust, TypeScript` lines in a flat section, bulleted or not
    let rows = parse_metrics(section.body);
    if rows.is_empty() {
        // uncategorised items
        return TechStack {
            tools: parse_list(section.body),
            ..TechStack::default()
        };
    }

    let mut stack = TechStack::default();
    for row in rows {
        let key = label_key(&row.name);
        let slot = if key.contains("language") {
            &mut stack.languages
        } else if key.contains("framework") || key.contains("librar") {
            &mut stack.frameworks
        } else if key.contains("database") || key.contains("storage") {
            &mut stack.databases
        } else if key.contains("tool") {
            &mut stack.tools
        } else if key.contains("platform") || key.contains("infrastructure") {
            &mut stack.platforms
        } else {
            continue;
        };
        slot.extend(
            row.value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        );
    }
    stack
}

fn problem(section: &Section) -> Problem {
    Problem {
        statement: paragraph(section.intro),
        challenges: child_items(section, &["challenge"]),
        goals: child_items(section, &["goal", "objective"]),
    }
}

fn architecture(section: &Section) -> Architecture {
    let components = child(section, &["component"])
        .map(|c| {
            let rows = parse_metrics(c.body);
            if rows.is_empty() {
                parse_list(c.body).iter().map(|item| split_component(item)).collect()
            } else {
                rows
            }
        })
        .unwrap_or_default();

    Architecture {
        overview: paragraph(section.intro),
        components,
        patterns: child_items(section, &["pattern"]),
    }
}

/// `"Name: what it does"` list item → key/value.
fn split_component(item: &str) -> KeyValue {
    let item = item.replace("**", "");
    match item.split_once(':') {
        Some((name, value)) => KeyValue {
            name: name.trim().to_string(),
            value: value.trim().to_string(),
            description: None,
        },
        None => KeyValue {
            name: item.trim().to_string(),
            value: String::new(),
            description: None,
        },
    }
}

fn performance(section: &Section) -> Performance {
    if section.children.is_empty() {
        return Performance {
            metrics: parse_metrics(section.body),
            benchmarks: Vec::new(),
        };
    }
    Performance {
        metrics: child(section, &["metric"])
            .map(|c| parse_metrics(c.body))
            .unwrap_or_default(),
        benchmarks: child_items(section, &["benchmark"]),
    }
}

fn code_snippets(section: &Section) -> Vec<CodeSnippet> {
    if section.children.is_empty() {
        return parse_code_blocks(section.body)
            .into_iter()
            .enumerate()
            .map(|(i, block)| CodeSnippet {
                title: format!("Snippet {}", i + 1),
                description: String::new(),
                language: block.language,
                code: block.code,
                explanation: block.explanation.unwrap_or_default(),
            })
            .collect();
    }

    let mut snippets = Vec::new();
    for sub in &section.children {
        let description = sub
            .body
            .find("```")
            .map(|i| paragraph(&sub.body[..i]))
            .unwrap_or_default();
        for block in parse_code_blocks(sub.body) {
            snippets.push(CodeSnippet {
                title: sub.header.to_string(),
                description: description.clone(),
                language: block.language,
                code: block.code,
                explanation: block.explanation.unwrap_or_default(),
            });
        }
    }
    snippets
}

fn commentary(section: &Section) -> Commentary {
    let motivation = child(section, &["motivation", "why"])
        .map(|c| paragraph(c.body))
        .unwrap_or_else(|| paragraph(section.intro));

    Commentary {
        motivation,
        decisions: child_items(section, &["decision"]),
        lessons: child_items(section, &["lesson", "learn"]),
        plans: child_items(section, &["plan", "future", "next"]),
    }
}
