#![allow(dead_code)]

use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use shortlink_api::api::handlers::health_handler;
use shortlink_api::api::routes::api_routes;
use shortlink_api::application::services::{ResolutionService, ResolutionSettings};
use shortlink_api::domain::repositories::UrlRepository;
use shortlink_api::infrastructure::cache::{CacheService, MemoryCache};
use shortlink_api::infrastructure::persistence::InMemoryUrlRepository;
use shortlink_api::state::AppState;
use shortlink_api::utils::alias_generator::{AliasGenerator, RandomAliasGenerator};

/// Hands out a fixed sequence of aliases, repeating the last one.
pub struct SequenceGenerator {
    aliases: Vec<&'static str>,
    next: AtomicUsize,
}

impl SequenceGenerator {
    pub fn new(aliases: &[&'static str]) -> Self {
        Self {
            aliases: aliases.to_vec(),
            next: AtomicUsize::new(0),
        }
    }
}

impl AliasGenerator for SequenceGenerator {
    fn generate(&self) -> String {
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        self.aliases[i.min(self.aliases.len() - 1)].to_string()
    }
}

/// In-memory backends plus the service wired on top of them.
pub struct TestContext {
    pub repository: Arc<InMemoryUrlRepository>,
    pub cache: Arc<MemoryCache>,
    pub service: Arc<ResolutionService>,
}

impl TestContext {
    pub fn state(&self) -> AppState {
        AppState::new(self.service.clone())
    }
}

pub fn create_test_context_with(generator: Arc<dyn AliasGenerator>) -> TestContext {
    let repository = Arc::new(InMemoryUrlRepository::new());
    let cache = Arc::new(MemoryCache::new(1_000, 3600));

    let settings = ResolutionSettings {
        retry_base: std::time::Duration::from_millis(1),
        ..Default::default()
    };

    let service = Arc::new(ResolutionService::new(
        repository.clone() as Arc<dyn UrlRepository>,
        cache.clone() as Arc<dyn CacheService>,
        generator,
        settings,
    ));

    TestContext {
        repository,
        cache,
        service,
    }
}

pub fn create_test_context() -> TestContext {
    create_test_context_with(Arc::new(RandomAliasGenerator))
}

/// Same routes as the production router, without the path normalization wrapper.
pub fn test_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1", api_routes())
        .with_state(state)
}

/// Lets spawned cache writes land.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
}
