//! Generic entity write operations: create, save, delete.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use stockroom_core::entity::Entity;
use stockroom_core::types::{DocId, Pk, Timestamp};

use crate::store::{DocumentStore, StoreError};

/// A storable entity: serializable to a JSONB document and able to accept
/// the identifiers the store assigns.
pub trait Document: Entity + Serialize + DeserializeOwned + Send + Sync {
    /// Record the internal id after insert / fetch.
    fn set_id(&mut self, id: DocId);

    /// Record the allocated sequence number. Called exactly once, at create.
    fn assign_pk(&mut self, pk: Pk);

    /// Stamp the last-updated time. Called by [`save`].
    fn touch_updated(&mut self, at: Timestamp);
}

/// Serialize an entity into its stored document form.
///
/// The internal id is carried in the `documents.id` column, not inside the
/// body, so it is stripped here.
pub fn to_document<T: Document>(entity: &T) -> Result<Value, StoreError> {
    let mut doc = serde_json::to_value(entity).map_err(|source| StoreError::Decode {
        collection: T::COLLECTION,
        source,
    })?;
    if let Some(obj) = doc.as_object_mut() {
        obj.remove("id");
    }
    Ok(doc)
}

/// Rebuild an entity from a fetched row, injecting the internal id.
pub fn from_document<T: Document>(id: DocId, doc: Value) -> Result<T, StoreError> {
    let mut entity: T = serde_json::from_value(doc).map_err(|source| StoreError::Decode {
        collection: T::COLLECTION,
        source,
    })?;
    entity.set_id(id);
    Ok(entity)
}

/// Create a new record.
///
/// Allocates the next sequence number from the shared counter, inserts the
/// document, and re-fetches it by internal id so the returned entity
/// reflects exactly what is stored. On a uniqueness violation the sequence
/// number is handed back with a compensating decrement before the error is
/// re-raised, so the counter does not leak on failed creates.
pub async fn create<T: Document>(store: &DocumentStore, mut entity: T) -> Result<T, StoreError> {
    let pk = store.next_pk(T::COLLECTION).await?;
    entity.assign_pk(pk);

    let doc = to_document(&entity)?;
    let id = match store.insert(T::COLLECTION, &doc).await {
        Ok(id) => id,
        Err(err) => {
            if let StoreError::Duplicate { constraint } = &err {
                tracing::error!(collection = T::COLLECTION, %constraint, "Duplicate key on create");
                store.rollback_pk(T::COLLECTION).await?;
            }
            return Err(err);
        }
    };

    match store.fetch_by_id(T::COLLECTION, id).await? {
        Some((id, doc)) => from_document(id, doc),
        None => Err(StoreError::LostAfterInsert { id }),
    }
}

/// Persist the current state of an entity.
///
/// Stamps `updated_at` and replaces the full document by internal id --
/// this is a whole-document write even when the caller only changed a few
/// fields in memory.
pub async fn save<T: Document>(store: &DocumentStore, entity: &mut T) -> Result<(), StoreError> {
    let id = entity.id().ok_or(StoreError::NotPersisted)?;
    entity.touch_updated(Utc::now());

    let doc = to_document(entity)?;
    store.replace(T::COLLECTION, id, &doc).await?;
    Ok(())
}

/// Remove an entity by internal id. No cascade happens at this layer.
pub async fn delete<T: Document>(store: &DocumentStore, entity: &T) -> Result<(), StoreError> {
    let id = entity.id().ok_or(StoreError::NotPersisted)?;
    tracing::info!(collection = T::COLLECTION, %id, "Deleting document");
    store.remove(T::COLLECTION, id).await?;
    Ok(())
}
