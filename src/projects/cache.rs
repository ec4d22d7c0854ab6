use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{Project, ProjectApi};
use crate::error::NetworkError;

type FetchResult = Result<Arc<Vec<Project>>, NetworkError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

#[derive(Debug, Clone)]
pub struct ProjectCacheEntry {
    pub data: Arc<Vec<Project>>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Default)]
struct CacheState {
    // Bumped by invalidate; fetches started under an older value never commit
    generation: u64,
    entry: Option<ProjectCacheEntry>,
    // Last entry before invalidation, kept for display while a refetch is pending or failing
    stale: Option<ProjectCacheEntry>,
    in_flight: Option<(u64, SharedFetch)>,
}

/// Read-through cache for the full project list.
///
/// Once populated the entry is served until [`ProjectCache::invalidate`];
/// there is no TTL. Concurrent misses share a single outstanding fetch.
pub struct ProjectCache {
    api: Arc<dyn ProjectApi>,
    state: Mutex<CacheState>,
}

impl ProjectCache {
    pub fn new(api: Arc<dyn ProjectApi>) -> Self {
        Self {
            api,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub async fn read(&self) -> FetchResult {
        let (generation, fetch) = {
            let mut state = self.state.lock();
            if let Some(entry) = &state.entry {
                debug!("Project cache hit ({} projects)", entry.data.len());
                return Ok(Arc::clone(&entry.data));
            }

            let generation = state.generation;
            let pending = match &state.in_flight {
                Some((started, fetch)) if *started == generation => Some(fetch.clone()),
                _ => None,
            };
            let fetch = match pending {
                Some(fetch) => fetch,
                None => {
                    debug!("Project cache miss, fetching");
                    let api = Arc::clone(&self.api);
                    let fetch: SharedFetch = async move { api.list().await.map(Arc::new) }
                        .boxed()
                        .shared();
                    state.in_flight = Some((generation, fetch.clone()));
                    fetch
                }
            };
            (generation, fetch)
        };

        let result = fetch.await;

        let mut state = self.state.lock();
        if matches!(&state.in_flight, Some((started, _)) if *started == generation) {
            state.in_flight = None;
        }
        match &result {
            Ok(data) if state.generation == generation => {
                if state.entry.is_none() {
                    state.entry = Some(ProjectCacheEntry {
                        data: Arc::clone(data),
                        fetched_at: Utc::now(),
                    });
                    state.stale = None;
                }
            }
            Ok(_) => debug!("Project list fetched before invalidation, not caching"),
            Err(e) => warn!("Project fetch failed, cache left unchanged: {}", e),
        }
        result
    }

    /// Drop the entry so the next read refetches
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.in_flight = None;
        if let Some(entry) = state.entry.take() {
            state.stale = Some(entry);
        }
        debug!("Project cache invalidated");
    }

    /// Latest known data without fetching, fresh or stale
    pub fn peek(&self) -> Option<ProjectCacheEntry> {
        let state = self.state.lock();
        state.entry.clone().or_else(|| state.stale.clone())
    }

    pub fn is_fresh(&self) -> bool {
        self.state.lock().entry.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projects::ProjectForm;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct SlowApi {
        calls: AtomicUsize,
        fail: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl ProjectApi for SlowApi {
        async fn list(&self) -> Result<Vec<Project>, NetworkError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(NetworkError::Transport("offline".to_string()));
            }
            Ok(vec![Project {
                id: Some(format!("p{}", n)),
                title: "t".to_string(),
                description: "d".to_string(),
                image: None,
                github_link: None,
                live_demo: None,
                tech_stack: Vec::new(),
                created_at: None,
                updated_at: None,
            }])
        }
        async fn get(&self, _id: &str) -> Result<Project, NetworkError> {
            unimplemented!()
        }
        async fn create(&self, _form: &ProjectForm) -> Result<Project, NetworkError> {
            unimplemented!()
        }
        async fn update(&self, _id: &str, _form: &ProjectForm) -> Result<Project, NetworkError> {
            unimplemented!()
        }
        async fn delete(&self, _id: &str) -> Result<String, NetworkError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let api = Arc::new(SlowApi::default());
        let cache = ProjectCache::new(api.clone());

        let (a, b, c) = tokio::join!(cache.read(), cache.read(), cache.read());
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap(), b.unwrap());
        assert!(c.is_ok());
        assert!(cache.is_fresh());
    }

    #[tokio::test]
    async fn test_invalidate_during_fetch_prevents_commit() {
        let api = Arc::new(SlowApi::default());
        let cache = ProjectCache::new(api.clone());

        let (first, _) = tokio::join!(cache.read(), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            cache.invalidate();
        });
        assert!(first.is_ok());
        assert!(!cache.is_fresh());

        let second = cache.read().await.unwrap();
        assert_eq!(second[0].id.as_deref(), Some("p1"));
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_stale_data() {
        let api = Arc::new(SlowApi::default());
        let cache = ProjectCache::new(api.clone());
        cache.read().await.unwrap();
        let fetched_at = cache.peek().unwrap().fetched_at;

        cache.invalidate();
        api.fail.store(true, Ordering::SeqCst);
        assert!(matches!(cache.read().await, Err(NetworkError::Transport(_))));

        let stale = cache.peek().unwrap();
        assert_eq!(stale.data[0].id.as_deref(), Some("p0"));
        assert_eq!(stale.fetched_at, fetched_at);
        assert!(!cache.is_fresh());
    }
}
