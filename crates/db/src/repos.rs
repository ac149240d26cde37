//! Typed repository fronts over the generic query interface.

use serde_json::json;
use stockroom_core::entity::Entity;
use stockroom_core::normalize;
use stockroom_core::types::DocId;

use crate::model::{delete, from_document};
use crate::models::inventory::InventoryItem;
use crate::models::user::User;
use crate::query::{Filters, QueryInterface};
use crate::store::{DocumentStore, StoreError};

/// Lookups specific to the `users` collection.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by email. The lookup key is normalized the same way the
    /// stored value was.
    pub async fn find_by_email(
        store: &DocumentStore,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        QueryInterface::<User>::new(store)
            .get(Filters::new().eq("email", normalize::normalize_email(email).as_str()))
            .await
    }

    /// Find the user holding a token with the given key digest.
    ///
    /// The token lives nested inside the user document, so this matches on
    /// JSONB containment rather than a flat field filter.
    pub async fn find_by_token_hash(
        store: &DocumentStore,
        key_hash: &str,
    ) -> Result<Option<User>, StoreError> {
        let fragment = json!({ "auth_token": { "key_hash": key_hash } });
        match store.fetch_one_containing(User::COLLECTION, &fragment).await? {
            Some((id, doc)) => Ok(Some(from_document(id, doc)?)),
            None => Ok(None),
        }
    }
}

/// Lookups and cascades specific to the `inventory` collection.
pub struct InventoryRepo;

impl InventoryRepo {
    /// Delete every item owned by `owner`, returning the removed items so
    /// the caller can enqueue index removals for them.
    pub async fn delete_by_owner(
        store: &DocumentStore,
        owner: DocId,
    ) -> Result<Vec<InventoryItem>, StoreError> {
        let interface = QueryInterface::<InventoryItem>::new(store);
        let queryset = interface
            .filter(Filters::new().eq("user_id", owner))
            .await?;

        let items = queryset.into_items();
        for item in &items {
            delete(store, item).await?;
        }
        Ok(items)
    }
}
