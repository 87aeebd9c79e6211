use regex::Regex;

const GENERIC_TITLE: &str = r"(?i)^(?:senior|junior|lead|principal|staff|chief|head\s+of|software|full[- ]?stack|front[- ]?end|back[- ]?end|data|machine\s+learning|ml|ai|research|systems?|devops|platform|cloud|co-?founder|founder|freelance|independent|contract|intern|engineer|developer|consultant|manager|director|compliance|automation|technical|product)\b";

const COMPANY_PIPE: &str = r"^(?P<company>[^|•·]+?)\s*[|•·]\s*(?P<location>.+)$";
const COMPANY_DASH: &str = r"^(?P<company>.+?)\s+[-–—]\s+(?P<location>.+)$";

const MAX_TITLE_CHARS: usize = 90;
const MAX_TITLE_WORDS: usize = 8;
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "at", "for", "in", "of", "on", "the", "to", "with", "&",
];

/// Line patterns that tell one résumé layout's job entries apart.
///
/// `title_patterns` mark the first line of a job block. `company_patterns`
/// split the line after it; each needs a `company` group and may have a
/// `location` group.
#[derive(Debug, Clone)]
pub struct ResumeFormat {
    pub title_patterns: Vec<Regex>,
    pub company_patterns: Vec<Regex>,
}

impl Default for ResumeFormat {
    fn default() -> Self {
        Self::generic()
    }
}

impl ResumeFormat {
    /// Titles start with a role-indicating word ("Senior", "Backend",
    /// "Freelance", ...).
    pub fn generic() -> Self {
        Self {
            title_patterns: vec![Regex::new(GENERIC_TITLE).unwrap()],
            company_patterns: default_company_patterns(),
        }
    }

    /// Titles start with one of the literal, case-sensitive `markers`
    /// (e.g. `"SOFTWARE ENGINEER"`), as used by a single known document.
    pub fn with_markers(markers: &[&str]) -> Self {
        let alternation = markers
            .iter()
            .map(|m| regex::escape(m.trim()))
            .collect::<Vec<_>>()
            .join("|");
        let title_patterns = if alternation.is_empty() {
            Vec::new()
        } else {
            vec![Regex::new(&format!(r"^(?:{})", alternation)).unwrap()]
        };
        Self {
            title_patterns,
            company_patterns: default_company_patterns(),
        }
    }

    pub fn is_title_line(&self, line: &str) -> bool {
        let line = line.trim();
        line.chars().count() <= MAX_TITLE_CHARS
            && !line.ends_with('.')
            && has_title_shape(line)
            && self.title_patterns.iter().any(|re| re.is_match(line))
    }

    /// `(company, location)` for a company line.
    pub fn split_company(&self, line: &str) -> (String, Option<String>) {
        let line = line.trim();
        for re in &self.company_patterns {
            if let Some(caps) = re.captures(line) {
                let company = caps.name("company").map_or(line, |m| m.as_str().trim());
                let location = caps
                    .name("location")
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|l| !l.is_empty());
                return (company.to_string(), location);
            }
        }
        (line.to_string(), None)
    }
}

/// Short, mostly capitalized words before any `(period)`. Separates
/// "Data Engineer" from a wrapped sentence opening with "Data ...".
fn has_title_shape(line: &str) -> bool {
    let head = line.split('(').next().unwrap_or(line);
    if head.split_whitespace().count() > MAX_TITLE_WORDS {
        return false;
    }

    let words: Vec<&str> = head
        .split_whitespace()
        .filter(|w| w.starts_with(char::is_alphabetic))
        .filter(|w| !MINOR_WORDS.contains(&w.to_lowercase().as_str()))
        .collect();
    let capitalized = words
        .iter()
        .filter(|w| w.starts_with(char::is_uppercase))
        .count();
    !words.is_empty() && capitalized * 2 > words.len()
}

fn default_company_patterns() -> Vec<Regex> {
    vec![
        Regex::new(COMPANY_PIPE).unwrap(),
        Regex::new(COMPANY_DASH).unwrap(),
    ]
}
