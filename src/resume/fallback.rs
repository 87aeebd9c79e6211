use super::{icon_for_title, kind_for, Experience};

#[allow(clippy::too_many_arguments)]
fn entry(
    n: usize,
    title: &str,
    company: &str,
    location: &str,
    period: &str,
    description: &str,
    technologies: &[&str],
    achievements: &[&str],
) -> Experience {
    Experience {
        id: format!("fallback-{n}"),
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        period: period.to_string(),
        description: description.to_string(),
        technologies: technologies.iter().map(|t| t.to_string()).collect(),
        achievements: achievements.iter().map(|a| a.to_string()).collect(),
        kind: kind_for(title, company),
        icon: icon_for_title(title),
    }
}

/// Static entries shown when nothing usable can be parsed from the résumé.
pub fn fallback_experience() -> Vec<Experience> {
    vec![
        entry(
            1,
            "AI Systems Engineer",
            "Independent Research",
            "Remote",
            "2023 – Present",
            "Building cognitive architectures and tooling for neural network experimentation.",
            &["Python", "PyTorch", "Rust", "CUDA"],
            &[
                "Designed a modular training pipeline for small language models",
                "Cut experiment turnaround time by caching intermediate activations",
                "Published evaluation notebooks used by collaborators",
            ],
        ),
        entry(
            2,
            "Physics Engine Developer",
            "Open Source",
            "Remote",
            "2022 – 2023",
            "Wrote rigid-body and particle simulation engines for interactive demos.",
            &["C++", "Rust", "WebAssembly", "WebGPU"],
            &[
                "Implemented a stable constraint solver for stacked bodies",
                "Ported the core to WebAssembly for in-browser demos",
            ],
        ),
        entry(
            3,
            "Full-Stack Web Developer",
            "Freelance",
            "Remote",
            "2020 – 2022",
            "Delivered web applications for small businesses end to end.",
            &["TypeScript", "React", "Next.js", "PostgreSQL"],
            &[
                "Shipped a dozen client sites with automated deployments",
                "Introduced component libraries that halved page build time",
            ],
        ),
        entry(
            4,
            "Backend Infrastructure Engineer",
            "Startup",
            "Hybrid",
            "2018 – 2020",
            "Ran the services and infrastructure behind a data-heavy product.",
            &["Go", "Docker", "Kubernetes", "AWS"],
            &[
                "Migrated batch jobs to an event-driven pipeline",
                "Brought on-call pages down through better alerting",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::{ExperienceKind, IconCategory};

    #[test]
    fn fallback_entries_follow_extractor_rules() {
        let entries = fallback_experience();
        let kinds: Vec<_> = entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ExperienceKind::Work,
                ExperienceKind::Project,
                ExperienceKind::Work,
                ExperienceKind::Work,
            ]
        );
        let icons: Vec<_> = entries.iter().map(|e| e.icon).collect();
        assert_eq!(
            icons,
            vec![
                IconCategory::Ai,
                IconCategory::Simulation,
                IconCategory::Web,
                IconCategory::Systems,
            ]
        );
    }
}
