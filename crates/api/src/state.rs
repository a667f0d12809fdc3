use std::sync::Arc;

use coursedesk_core::course::CourseService;
use coursedesk_core::page::PageService;
use coursedesk_core::stats::StatsService;
use coursedesk_core::store::DocumentStore;

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    store: Arc<dyn DocumentStore>,
    config: AppConfig,
    courses: CourseService,
    pages: PageService,
    stats: StatsService,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: AppConfig) -> Self {
        Self {
            inner: Arc::new(InnerState {
                courses: CourseService::new(store.clone()),
                pages: PageService::new(store.clone()),
                stats: StatsService::new(store.clone()),
                store,
                config,
            }),
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn courses(&self) -> &CourseService {
        &self.inner.courses
    }

    pub fn pages(&self) -> &PageService {
        &self.inner.pages
    }

    pub fn stats(&self) -> &StatsService {
        &self.inner.stats
    }
}
