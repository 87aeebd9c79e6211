pub mod github;
pub mod pdf;

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{IdentifierError, SourceError};

pub use github::GitHubSource;

/// `owner/repo` identifier of a project repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProjectId {
    pub owner: String,
    pub repo: String,
}

impl FromStr for ProjectId {
    type Err = IdentifierError;

    /// Accepts `owner/repo`, optionally as a `github.com` URL.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = |reason| IdentifierError {
            input: input.to_string(),
            reason,
        };

        let trimmed = input.trim().trim_end_matches('/');
        let path = trimmed
            .strip_prefix("https://github.com/")
            .or_else(|| trimmed.strip_prefix("http://github.com/"))
            .or_else(|| trimmed.strip_prefix("github.com/"))
            .unwrap_or(trimmed);
        let path = path.strip_suffix(".git").unwrap_or(path);

        let (owner, repo) = path.split_once('/').ok_or_else(|| err("expected owner/repo"))?;
        if owner.is_empty() || repo.is_empty() {
            return Err(err("owner and repo must be non-empty"));
        }
        if repo.contains('/') {
            return Err(err("too many path segments"));
        }
        let valid = |s: &str| {
            s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        if !valid(owner) || !valid(repo) {
            return Err(err("invalid characters"));
        }

        Ok(ProjectId {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Where template documents come from.
pub trait DocumentSource {
    fn fetch_template(
        &self,
        id: &ProjectId,
    ) -> impl Future<Output = Result<String, SourceError>> + Send;
}
