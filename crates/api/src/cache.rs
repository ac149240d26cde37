//! TTL cache for user-detail payloads.
//!
//! User detail responses change rarely and are read often by peer
//! services, so they are kept for a few minutes and dropped eagerly on
//! any mutation of the underlying user.

use std::time::Duration;

use moka::future::Cache;
use stockroom_core::types::Pk;
use stockroom_db::models::UserResponse;

#[derive(Clone)]
pub struct UserCache {
    inner: Cache<Pk, UserResponse>,
}

impl UserCache {
    pub fn new(ttl: Duration) -> Self {
        UserCache {
            inner: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, pk: Pk) -> Option<UserResponse> {
        self.inner.get(&pk).await
    }

    pub async fn insert(&self, pk: Pk, payload: UserResponse) {
        self.inner.insert(pk, payload).await;
    }

    pub async fn invalidate(&self, pk: Pk) {
        self.inner.invalidate(&pk).await;
    }
}
