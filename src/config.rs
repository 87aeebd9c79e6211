use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_RESUME_PATH: &str = "public/resume.pdf";
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Runtime settings, read from `PORTFOLIO_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bearer token for the GitHub API; raises the rate limit when set.
    pub github_token: Option<String>,
    pub github_api_base: String,
    pub cache_ttl_secs: u64,
    pub resume_path: String,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github_token: None,
            github_api_base: DEFAULT_API_BASE.to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            resume_path: DEFAULT_RESUME_PATH.to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let mut settings: Settings = Config::builder()
            .add_source(Environment::with_prefix("PORTFOLIO"))
            .build()
            .context("Failed to read PORTFOLIO_* settings")?
            .try_deserialize()
            .context("Invalid PORTFOLIO_* settings")?;

        if settings.github_token.is_none() {
            settings.github_token = std::env::var("GITHUB_TOKEN").ok();
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.github_api_base, DEFAULT_API_BASE);
        assert_eq!(s.cache_ttl_secs, 3600);
        assert!(s.user_agent.starts_with("portfolio_parser/"));
    }
}
