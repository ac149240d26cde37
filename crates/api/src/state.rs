use std::sync::Arc;
use std::time::Duration;

use stockroom_db::{DbPool, DocumentStore};
use stockroom_index::SearchClient;

use crate::cache::UserCache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Document store handle over the same pool.
    pub store: DocumentStore,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Search engine client.
    pub search: SearchClient,
    /// TTL cache for user-detail payloads.
    pub user_cache: UserCache,
}

impl AppState {
    pub fn new(pool: DbPool, config: ServerConfig) -> Self {
        let search = SearchClient::new(&config.search);
        let user_cache = UserCache::new(Duration::from_secs(config.cache_ttl_secs));

        AppState {
            store: DocumentStore::new(pool.clone()),
            pool,
            config: Arc::new(config),
            search,
            user_cache,
        }
    }
}
