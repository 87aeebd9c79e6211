use std::future::Future;

use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use tracing::{debug, info};

use super::{DocumentSource, ProjectId};
use crate::config::Settings;
use crate::error::SourceError;

const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const TEMPLATE_FILE: &str = "TEMPLATE.md";
const README_FILE: &str = "README.md";

/// Reads repository files through the GitHub contents API.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
    user_agent: String,
}

impl GitHubSource {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: settings.github_api_base.trim_end_matches('/').to_string(),
            token: settings.github_token.clone().filter(|t| !t.is_empty()),
            user_agent: settings.user_agent.clone(),
        }
    }

    pub fn contents_url(&self, id: &ProjectId, file: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, id.owner, id.repo, file
        )
    }

    /// Raw body of `file` in the repository's default branch.
    pub async fn fetch_file(&self, id: &ProjectId, file: &str) -> Result<String, SourceError> {
        let url = self.contents_url(id, file);
        debug!("GET {}", url);

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, RAW_MEDIA_TYPE)
            .header(USER_AGENT, &self.user_agent);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        check_status(response.status(), &url, &format!("{}/{}", id, file))?;
        Ok(response.text().await?)
    }
}

impl DocumentSource for GitHubSource {
    async fn fetch_template(&self, id: &ProjectId) -> Result<String, SourceError> {
        template_or_readme(id, |file| self.fetch_file(id, file)).await
    }
}

/// Only 200 carries a body; 404 means the file does not exist.
fn check_status(status: StatusCode, url: &str, file: &str) -> Result<(), SourceError> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::NOT_FOUND => Err(SourceError::NotFound(file.to_string())),
        status => Err(SourceError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        }),
    }
}

/// `TEMPLATE.md`, falling back to `README.md` only when the template does not
/// exist. Other failures are returned as is.
async fn template_or_readme<F, Fut>(id: &ProjectId, fetch: F) -> Result<String, SourceError>
where
    F: Fn(&'static str) -> Fut,
    Fut: Future<Output = Result<String, SourceError>>,
{
    match fetch(TEMPLATE_FILE).await {
        Err(SourceError::NotFound(_)) => {
            info!("{} has no {}, trying {}", id, TEMPLATE_FILE, README_FILE);
            fetch(README_FILE).await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn contents_url_format() {
        let settings = Settings {
            github_api_base: "https://api.github.com/".into(),
            ..Settings::default()
        };
        let source = GitHubSource::new(&settings);
        let id: ProjectId = "octo/demo".parse().unwrap();
        assert_eq!(
            source.contents_url(&id, TEMPLATE_FILE),
            "https://api.github.com/repos/octo/demo/contents/TEMPLATE.md"
        );
    }

    #[test]
    fn status_mapping() {
        let url = "https://api.github.com/repos/o/r/contents/TEMPLATE.md";
        assert!(check_status(StatusCode::OK, url, "o/r/TEMPLATE.md").is_ok());

        let err = check_status(StatusCode::NOT_FOUND, url, "o/r/TEMPLATE.md").unwrap_err();
        assert!(matches!(err, SourceError::NotFound(ref f) if f == "o/r/TEMPLATE.md"));

        let err = check_status(StatusCode::FORBIDDEN, url, "o/r/TEMPLATE.md").unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 403, ref url } if url.ends_with("TEMPLATE.md")));
    }

    /// Runs the fallback over canned per-file results; returns the outcome and
    /// the files requested, in order.
    async fn run(
        responses: Vec<(&'static str, Result<String, SourceError>)>,
    ) -> (Result<String, SourceError>, Vec<&'static str>) {
        let id: ProjectId = "octo/demo".parse().unwrap();
        let files: RefCell<HashMap<_, _>> = RefCell::new(responses.into_iter().collect());
        let requested = RefCell::new(Vec::new());

        let result = template_or_readme(&id, |file| {
            requested.borrow_mut().push(file);
            let response = files
                .borrow_mut()
                .remove(file)
                .unwrap_or_else(|| Err(SourceError::NotFound(file.to_string())));
            async move { response }
        })
        .await;
        (result, requested.into_inner())
    }

    #[tokio::test]
    async fn template_is_used_when_present() {
        let (result, requested) = run(vec![
            (TEMPLATE_FILE, Ok("# Template".to_string())),
            (README_FILE, Ok("# Readme".to_string())),
        ])
        .await;
        assert_eq!(result.unwrap(), "# Template");
        assert_eq!(requested, vec![TEMPLATE_FILE]);
    }

    #[tokio::test]
    async fn missing_template_falls_back_to_readme() {
        let (result, requested) = run(vec![(README_FILE, Ok("# Readme".to_string()))]).await;
        assert_eq!(result.unwrap(), "# Readme");
        assert_eq!(requested, vec![TEMPLATE_FILE, README_FILE]);
    }

    #[tokio::test]
    async fn server_error_does_not_fall_back() {
        let (result, requested) = run(vec![
            (
                TEMPLATE_FILE,
                Err(SourceError::Status {
                    status: 500,
                    url: "u".to_string(),
                }),
            ),
            (README_FILE, Ok("# Readme".to_string())),
        ])
        .await;
        assert!(matches!(result, Err(SourceError::Status { status: 500, .. })));
        assert_eq!(requested, vec![TEMPLATE_FILE]);
    }

    #[tokio::test]
    async fn both_missing_is_not_found() {
        let (result, requested) = run(Vec::new()).await;
        assert!(matches!(result, Err(SourceError::NotFound(_))));
        assert_eq!(requested.len(), 2);
    }

    #[test]
    fn empty_token_is_ignored() {
        let settings = Settings {
            github_token: Some(String::new()),
            ..Settings::default()
        };
        assert!(GitHubSource::new(&settings).token.is_none());
    }
}
