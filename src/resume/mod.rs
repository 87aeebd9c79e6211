//! Experience extraction from plain résumé text.
//!
//! The text (usually produced from a PDF) is cut down to its experience
//! section, split into job blocks at title lines, and each block is turned
//! into an `Experience` by line heuristics. Callers never get an empty list:
//! when nothing usable is found the static fallback entries are returned.

pub mod fallback;
pub mod format;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

pub use fallback::fallback_experience;
pub use format::ResumeFormat;

static SECTION_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[#*\s]*(?:professional\s+experience|work\s+experience|employment\s+history|experience)[\s:*]*$").unwrap()
});
static SECTION_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[#*\s]*(?:education|(?:technical\s+)?skills|(?:personal\s+)?projects|references|certifications)[\s:*]*$").unwrap()
});
static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<name>.+?)\s*\((?P<period>[^()]+)\)\s*$").unwrap());
static DATE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+)?\d{4}\s*(?:–|—|-|to)\s*(?:present|current|now|(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+)?\d{4})").unwrap()
});
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[•▪◦●]\s*|[-*–]\s+)(.+)$").unwrap());
static TECH_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:technologies|tech\s+stack|tech|stack|tools|environment)\s*[:：]\s*(.+)$").unwrap()
});
static TECH_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,;/|•]").unwrap());
static SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]*").unwrap());

static EDUCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:university|college|school|bachelor|master|phd|degree|teaching\s+assistant)\b").unwrap()
});
static PROJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:personal\s+project|side\s+project|open[- ]source|hackathon)\b").unwrap()
});

static AI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:ai|ml|machine\s+learning|neural|cognitive)\b").unwrap()
});
static SIMULATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:physics|simulations?|engines?)\b").unwrap());
static WEB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:web|front[- ]?end|full[- ]?stack)\b").unwrap());
static SYSTEMS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:systems?|back[- ]?end|infrastructure)\b").unwrap()
});

pub const COMPANY_PLACEHOLDER: &str = "Company not listed";

const MIN_DESCRIPTION_CHARS: usize = 40;
const MIN_SENTENCE_CHARS: usize = 15;
const MAX_SYNTHESIZED_ACHIEVEMENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceKind {
    Work,
    Education,
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconCategory {
    Ai,
    Simulation,
    Web,
    Systems,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub period: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub achievements: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ExperienceKind,
    pub icon: IconCategory,
}

/// Parse experience entries with the generic résumé layout.
pub fn parse_experience(raw_text: &str) -> Vec<Experience> {
    ExperienceExtractor::default().parse(raw_text)
}

/// Extract text from a PDF résumé and parse it. Any failure in the PDF layer
/// yields the fallback entries.
pub fn experience_from_pdf(path: &Path) -> Vec<Experience> {
    ExperienceExtractor::default().parse_pdf(path)
}

#[derive(Debug, Clone, Default)]
pub struct ExperienceExtractor {
    format: ResumeFormat,
}

impl ExperienceExtractor {
    pub fn new(format: ResumeFormat) -> Self {
        Self { format }
    }

    /// Entries found in `raw_text`, or the fallback list when there are none.
    pub fn parse(&self, raw_text: &str) -> Vec<Experience> {
        let entries = self.extract(raw_text);
        if entries.is_empty() {
            info!("No experience entries parsed, using fallback dataset");
            return fallback_experience();
        }
        info!("Parsed {} experience entries", entries.len());
        entries
    }

    pub fn parse_pdf(&self, path: &Path) -> Vec<Experience> {
        match crate::source::pdf::extract_text(path) {
            Ok(text) => self.parse(&text),
            Err(e) => {
                warn!("Résumé text extraction failed for {}: {}", path.display(), e);
                fallback_experience()
            }
        }
    }

    /// Entries found in `raw_text`; may be empty.
    pub fn extract(&self, raw_text: &str) -> Vec<Experience> {
        let Some(lines) = experience_section(raw_text) else {
            debug!("No experience header in résumé text");
            return Vec::new();
        };

        self.split_blocks(&lines)
            .iter()
            .filter_map(|block| self.build_entry(block))
            .enumerate()
            .map(|(i, mut entry)| {
                entry.id = format!("exp-{}", i + 1);
                entry
            })
            .collect()
    }

    fn split_blocks<'a>(&self, lines: &[&'a str]) -> Vec<Vec<&'a str>> {
        let mut blocks: Vec<Vec<&str>> = Vec::new();
        for &line in lines {
            if self.format.is_title_line(line) {
                blocks.push(vec![line]);
            } else if let Some(block) = blocks.last_mut() {
                block.push(line);
            }
        }
        blocks
    }

    fn build_entry(&self, block: &[&str]) -> Option<Experience> {
        let (title_line, rest) = block.split_first()?;
        let (title, mut period) = split_period(title_line);
        if title.chars().count() < 3 {
            return None;
        }

        let mut company = None;
        let mut location = String::new();
        let mut description: Vec<&str> = Vec::new();
        let mut technologies: Vec<String> = Vec::new();
        let mut achievements: Vec<String> = Vec::new();
        let mut last_was_bullet = false;

        for (i, &line) in rest.iter().enumerate() {
            if let Some(item) = BULLET_RE.captures(line).and_then(|c| c.get(1)) {
                let item = item.as_str().trim();
                if !item.is_empty() {
                    achievements.push(item.to_string());
                }
                last_was_bullet = true;
                continue;
            }

            if let Some(list) = TECH_LINE_RE.captures(line).and_then(|c| c.get(1)) {
                technologies.extend(split_technologies(list.as_str()));
                last_was_bullet = false;
                continue;
            }

            // Wrapped bullet text continues in lowercase.
            if last_was_bullet && line.starts_with(|c: char| c.is_lowercase()) {
                if let Some(last) = achievements.last_mut() {
                    last.push(' ');
                    last.push_str(line);
                }
                continue;
            }
            last_was_bullet = false;

            if i == 0 && !line.ends_with('.') {
                let (name, line_period) = split_period(line);
                if period.is_empty() {
                    period = line_period;
                }
                let (name, loc) = self.format.split_company(&name);
                company = Some(name);
                location = loc.unwrap_or_default();
                continue;
            }

            if is_description_line(line) {
                description.push(line);
            }
        }

        let description = description.join(" ");
        if achievements.is_empty() && !description.is_empty() {
            achievements = synthesize_achievements(&description);
        }
        if technologies.is_empty() {
            technologies = technologies_for_title(&title);
        }

        let company = company
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| COMPANY_PLACEHOLDER.to_string());
        let kind = kind_for(&title, &company);
        let icon = icon_for_title(&title);

        Some(Experience {
            id: String::new(),
            title,
            company,
            location,
            period,
            description,
            technologies,
            achievements,
            kind,
            icon,
        })
    }
}

/// Trimmed, non-empty lines between the experience header and the next
/// recognized section header.
fn experience_section(raw_text: &str) -> Option<Vec<&str>> {
    let lines: Vec<&str> = raw_text.lines().map(str::trim).collect();
    let start = lines.iter().position(|l| SECTION_START_RE.is_match(l))?;
    let end = lines[start + 1..]
        .iter()
        .position(|l| SECTION_END_RE.is_match(l))
        .map_or(lines.len(), |i| start + 1 + i);

    Some(
        lines[start + 1..end]
            .iter()
            .copied()
            .filter(|l| !l.is_empty())
            .collect(),
    )
}

/// `"Engineer (2021 – 2023)"` → `("Engineer", "2021 – 2023")`. Also accepts a
/// bare date range anywhere in the line.
fn split_period(line: &str) -> (String, String) {
    let line = line.trim();
    if let Some(caps) = PERIOD_RE.captures(line) {
        return (caps["name"].trim().to_string(), caps["period"].trim().to_string());
    }
    if let Some(m) = DATE_RANGE_RE.find(line) {
        let name = format!("{}{}", &line[..m.start()], &line[m.end()..]);
        let name = name
            .trim_matches(|c: char| c.is_whitespace() || "|,–—-".contains(c))
            .to_string();
        return (name, m.as_str().to_string());
    }
    (line.to_string(), String::new())
}

fn is_description_line(line: &str) -> bool {
    line.chars().count() >= MIN_DESCRIPTION_CHARS
        && !line.starts_with(|c: char| c.is_ascii_digit())
        && line.chars().any(|c| c.is_lowercase())
}

fn split_technologies(list: &str) -> Vec<String> {
    TECH_SPLIT_RE
        .split(list)
        .map(|t| t.trim().trim_end_matches('.').trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn synthesize_achievements(description: &str) -> Vec<String> {
    SENTENCE_RE
        .find_iter(description)
        .map(|m| m.as_str().trim())
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .take(MAX_SYNTHESIZED_ACHIEVEMENTS)
        .map(str::to_string)
        .collect()
}

/// Default technologies for a role, keyed on title words.
pub fn technologies_for_title(title: &str) -> Vec<String> {
    let t = title.to_lowercase();
    let set: &[&str] = if t.contains("engineer") || t.contains("compliance") {
        &["Python", "TypeScript", "PostgreSQL", "Docker"]
    } else if t.contains("backend") || t.contains("systems") {
        &["Rust", "Go", "PostgreSQL", "Kubernetes"]
    } else if t.contains("automation") || t.contains("freelance") {
        &["Python", "Selenium", "Node.js", "REST APIs"]
    } else {
        &["JavaScript", "Git", "Linux"]
    };
    set.iter().map(|s| s.to_string()).collect()
}

pub fn icon_for_title(title: &str) -> IconCategory {
    if AI_RE.is_match(title) {
        IconCategory::Ai
    } else if SIMULATION_RE.is_match(title) {
        IconCategory::Simulation
    } else if WEB_RE.is_match(title) {
        IconCategory::Web
    } else if SYSTEMS_RE.is_match(title) {
        IconCategory::Systems
    } else {
        IconCategory::General
    }
}

fn kind_for(title: &str, company: &str) -> ExperienceKind {
    if EDUCATION_RE.is_match(title) || EDUCATION_RE.is_match(company) {
        ExperienceKind::Education
    } else if PROJECT_RE.is_match(title) || PROJECT_RE.is_match(company) {
        ExperienceKind::Project
    } else {
        ExperienceKind::Work
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
    }

    #[test]
    fn empty_text_gives_fallback() {
        let entries = parse_experience("");
        assert_eq!(entries, fallback_experience());
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn no_experience_header_gives_fallback() {
        let text = "Jane Doe\nEDUCATION\nBSc Physics\nSKILLS\nRust, Python";
        assert_eq!(parse_experience(text), fallback_experience());
    }

    #[test]
    fn header_without_entries_gives_fallback() {
        let text = "Experience\nlots of words here that are not titles at all\nEducation\nBSc";
        assert!(ExperienceExtractor::default().extract(text).is_empty());
        assert_eq!(parse_experience(text).len(), 4);
    }

    #[test]
    fn generic_resume() {
        let entries = parse_experience(&fixture("resume.txt"));
        assert_eq!(entries.len(), 3);

        let first = &entries[0];
        assert_eq!(first.id, "exp-1");
        assert_eq!(first.title, "Senior Backend Engineer");
        assert_eq!(first.period, "2021 – Present");
        assert_eq!(first.company, "Lumen Analytics");
        assert_eq!(first.location, "Berlin, Germany");
        assert_eq!(first.achievements.len(), 3);
        assert!(first.achievements[1].ends_with("with zero downtime"));
        assert_eq!(first.technologies, vec!["Rust", "PostgreSQL", "Kafka", "Kubernetes"]);
        assert_eq!(first.icon, IconCategory::Systems);
        assert_eq!(first.kind, ExperienceKind::Work);
    }

    #[test]
    fn achievements_synthesized_from_description() {
        let entries = parse_experience(&fixture("resume.txt"));
        let ml = &entries[1];
        assert_eq!(ml.title, "Machine Learning Engineer");
        assert_eq!(ml.period, "Jun 2019 - Dec 2020");
        assert_eq!(ml.company, "Cortex Labs");
        assert_eq!(ml.icon, IconCategory::Ai);
        assert_eq!(ml.achievements.len(), 3);
        assert!(ml.achievements[0].starts_with("Built recommendation models"));
        assert!(ml.description.contains("feature store"));
        // No technology line: synthesized from the title.
        assert_eq!(ml.technologies, technologies_for_title("Machine Learning Engineer"));
    }

    #[test]
    fn missing_company_uses_placeholder() {
        let entries = parse_experience(&fixture("resume.txt"));
        let freelance = &entries[2];
        assert_eq!(freelance.title, "Freelance Automation Developer");
        assert_eq!(freelance.company, COMPANY_PLACEHOLDER);
        assert_eq!(freelance.period, "2017-2019");
        assert_eq!(freelance.achievements.len(), 2);
        assert_eq!(
            freelance.technologies,
            vec!["Python", "Selenium", "Node.js", "REST APIs"]
        );
    }

    #[test]
    fn section_stops_at_education() {
        let entries = parse_experience(&fixture("resume.txt"));
        assert!(entries.iter().all(|e| !e.title.contains("University")));
    }

    #[test]
    fn wrapped_sentence_stays_in_its_job() {
        let text = "EXPERIENCE\n\
                    Senior Backend Engineer (2021 - 2023)\n\
                    Acme | Berlin\n\
                    Built the ingestion platform that processes forty million events a day.\n\
                    Data retention policies were redesigned to cut storage costs in half\n";
        let entries = parse_experience(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].company, "Acme");
        assert!(entries[0].description.contains("Data retention policies"));
        assert!(!entries[0].achievements.is_empty());
    }

    #[test]
    fn marker_format() {
        let extractor = ExperienceExtractor::new(ResumeFormat::with_markers(&[
            "COMPLIANCE ENGINEER",
            "SYSTEMS DEVELOPER",
        ]));
        let entries = extractor.parse(&fixture("resume_markers.txt"));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "COMPLIANCE ENGINEER");
        assert_eq!(entries[0].period, "2022 – 2024");
        assert_eq!(entries[0].company, "Northwind Bank");
        assert_eq!(entries[1].title, "SYSTEMS DEVELOPER");
        assert_eq!(entries[1].icon, IconCategory::Systems);
        assert_eq!(entries[1].technologies, vec!["C", "Linux", "eBPF"]);
    }

    #[test]
    fn generic_format_ignores_marker_layout_case() {
        // Lowercase words in the generic pattern still match uppercase titles.
        let entries = parse_experience(&fixture("resume_markers.txt"));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn icon_priority() {
        assert_eq!(icon_for_title("AI Platform Engineer"), IconCategory::Ai);
        assert_eq!(icon_for_title("Physics Engine Developer"), IconCategory::Simulation);
        assert_eq!(icon_for_title("Full-Stack Developer"), IconCategory::Web);
        assert_eq!(icon_for_title("Backend Engineer"), IconCategory::Systems);
        assert_eq!(icon_for_title("Software Engineer"), IconCategory::General);
        assert_eq!(icon_for_title("Maintainer"), IconCategory::General);
    }

    #[test]
    fn technology_table() {
        assert_eq!(technologies_for_title("Compliance Analyst")[0], "Python");
        assert_eq!(technologies_for_title("Systems Programmer")[0], "Rust");
        assert_eq!(technologies_for_title("Freelancer")[1], "Selenium");
        assert_eq!(technologies_for_title("Designer"), vec!["JavaScript", "Git", "Linux"]);
    }

    #[test]
    fn period_splitting() {
        assert_eq!(
            split_period("Data Engineer (2020–2022)"),
            ("Data Engineer".to_string(), "2020–2022".to_string())
        );
        assert_eq!(
            split_period("Lead Developer | Mar 2018 to Present"),
            ("Lead Developer".to_string(), "Mar 2018 to Present".to_string())
        );
        assert_eq!(split_period("Intern"), ("Intern".to_string(), String::new()));
    }

    #[test]
    fn kinds() {
        assert_eq!(kind_for("Teaching Assistant", "MIT"), ExperienceKind::Education);
        assert_eq!(kind_for("Maintainer", "Open Source"), ExperienceKind::Project);
        assert_eq!(kind_for("Engineer", "Acme"), ExperienceKind::Work);
    }

    #[test]
    fn missing_pdf_gives_fallback() {
        let entries = experience_from_pdf(Path::new("tests/fixtures/does-not-exist.pdf"));
        assert_eq!(entries, fallback_experience());
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(&fallback_experience()[0]).unwrap();
        assert_eq!(json["type"], "work");
        assert_eq!(json["icon"], "ai");
    }
}
