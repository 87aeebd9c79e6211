use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{CacheStats, TtlCache};
use crate::error::IdentifierError;
use crate::markdown::build_outline;
use crate::source::{DocumentSource, ProjectId};
use crate::template::{project, universal, ProjectDetails, UniversalTemplate};

/// Fetches project templates from a `DocumentSource` and memoizes the parsed
/// `ProjectDetails` per `owner/repo`.
pub struct ContentService<S> {
    source: S,
    cache: TtlCache<ProjectDetails>,
}

impl<S: DocumentSource> ContentService<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Parsed project details for `id`. A missing or unreachable template is
    /// `Ok(None)`; only a malformed identifier is an error.
    pub async fn get_project(
        &mut self,
        id: &str,
        force_refresh: bool,
    ) -> Result<Option<ProjectDetails>, IdentifierError> {
        let project_id: ProjectId = id.parse()?;
        let key = project_id.to_string();

        if !force_refresh {
            if let Some(details) = self.cache.get(&key) {
                debug!("Cache hit for {}", key);
                return Ok(Some(details.clone()));
            }
        }

        let Some(doc) = self.fetch(&project_id).await else {
            return Ok(None);
        };

        let details = project::from_outline(&key, &build_outline(&doc));
        info!(
            "Parsed {} ({})",
            key,
            details.title.as_deref().unwrap_or_default()
        );
        self.cache.insert(&key, details.clone());
        Ok(Some(details))
    }

    /// Schema-free view of the template for `id`. Not cached.
    pub async fn get_universal(
        &self,
        id: &str,
    ) -> Result<Option<UniversalTemplate>, IdentifierError> {
        let project_id: ProjectId = id.parse()?;
        let Some(doc) = self.fetch(&project_id).await else {
            return Ok(None);
        };
        Ok(Some(universal::from_outline(
            &project_id.to_string(),
            &build_outline(&doc),
        )))
    }

    pub fn clear_cache(&mut self) {
        info!("Clearing {} cached projects", self.cache.len());
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn fetch(&self, id: &ProjectId) -> Option<String> {
        match self.source.fetch_template(id).await {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("Failed to fetch template for {}: {}", id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::SourceError;

    #[derive(Default)]
    struct MemorySource {
        docs: HashMap<String, String>,
        fetches: AtomicUsize,
    }

    impl MemorySource {
        fn with(id: &str, doc: &str) -> Self {
            let mut docs = HashMap::new();
            docs.insert(id.to_string(), doc.to_string());
            Self {
                docs,
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl DocumentSource for MemorySource {
        async fn fetch_template(&self, id: &ProjectId) -> Result<String, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.docs
                .get(&id.to_string())
                .cloned()
                .ok_or_else(|| SourceError::NotFound(id.to_string()))
        }
    }

    fn fixture() -> String {
        std::fs::read_to_string("tests/fixtures/neural_sim.md").unwrap()
    }

    #[tokio::test]
    async fn caches_parsed_projects() {
        let source = MemorySource::with("ekats/neural-sim", &fixture());
        let mut service = ContentService::new(source, Duration::from_secs(60));

        let first = service.get_project("ekats/neural-sim", false).await.unwrap();
        let second = service.get_project("ekats/neural-sim", false).await.unwrap();

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(service.source().fetches(), 1);
        assert_eq!(service.cache_stats().size, 1);
    }

    #[tokio::test]
    async fn force_refresh_bypasses_cache() {
        let source = MemorySource::with("ekats/neural-sim", &fixture());
        let mut service = ContentService::new(source, Duration::from_secs(60));

        service.get_project("ekats/neural-sim", false).await.unwrap();
        service.get_project("ekats/neural-sim", true).await.unwrap();
        assert_eq!(service.source().fetches(), 2);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let source = MemorySource::with("ekats/neural-sim", &fixture());
        let mut service = ContentService::new(source, Duration::ZERO);

        service.get_project("ekats/neural-sim", false).await.unwrap();
        service.get_project("ekats/neural-sim", false).await.unwrap();
        assert_eq!(service.source().fetches(), 2);
    }

    #[tokio::test]
    async fn url_and_short_id_share_a_cache_entry() {
        let source = MemorySource::with("ekats/neural-sim", &fixture());
        let mut service = ContentService::new(source, Duration::from_secs(60));

        service.get_project("ekats/neural-sim", false).await.unwrap();
        let via_url = service
            .get_project("https://github.com/ekats/neural-sim", false)
            .await
            .unwrap();
        assert!(via_url.is_some());
        assert_eq!(service.source().fetches(), 1);
    }

    #[tokio::test]
    async fn missing_template_is_none() {
        let mut service = ContentService::new(MemorySource::default(), Duration::from_secs(60));
        let result = service.get_project("ghost/repo", false).await.unwrap();
        assert!(result.is_none());
        assert_eq!(service.cache_stats().size, 0);
    }

    #[tokio::test]
    async fn malformed_id_is_an_error() {
        let mut service = ContentService::new(MemorySource::default(), Duration::from_secs(60));
        let err = service.get_project("not-a-repo", false).await.unwrap_err();
        assert_eq!(err.input, "not-a-repo");
        assert_eq!(service.source().fetches(), 0);
    }

    #[tokio::test]
    async fn clear_cache_empties_stats() {
        let source = MemorySource::with("ekats/neural-sim", &fixture());
        let mut service = ContentService::new(source, Duration::from_secs(60));

        service.get_project("ekats/neural-sim", false).await.unwrap();
        assert_eq!(service.cache_stats().entries[0].key, "ekats/neural-sim");

        service.clear_cache();
        assert_eq!(service.cache_stats().size, 0);
        service.get_project("ekats/neural-sim", false).await.unwrap();
        assert_eq!(service.source().fetches(), 2);
    }

    #[tokio::test]
    async fn universal_view_uses_the_same_document() {
        let source = MemorySource::with("ekats/neural-sim", &fixture());
        let service = ContentService::new(source, Duration::from_secs(60));

        let template = service
            .get_universal("ekats/neural-sim")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(template.id, "ekats/neural-sim");
        assert!(!template.sections.is_empty());
    }
}
