//! Inventory item entity model and DTOs.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use stockroom_core::entity::{Entity, Owned};
use stockroom_core::normalize;
use stockroom_core::types::{DocId, Pk, Timestamp};
use stockroom_core::value::FieldValue;

use crate::model::Document;
use crate::outbox::{IndexOp, OutboxRepo};
use crate::DbPool;

/// Search index holding inventory documents.
pub const INVENTORY_INDEX: &str = "inventory";

/// Full inventory item document. Items belong to the user that created
/// them; every read and write path is scoped to that owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(default)]
    pub pk: Option<Pk>,
    pub name: String,
    pub category: String,
    pub weight: f64,
    pub price: f64,
    #[serde(default)]
    pub user_id: Option<DocId>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Fields accepted when creating an item.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryDraft {
    pub name: String,
    pub category: String,
    pub weight: f64,
    pub price: f64,
}

impl InventoryItem {
    /// Build a new, not-yet-persisted item owned by `owner`.
    ///
    /// Name and category are stored title-cased; weight keeps five decimal
    /// places and price two, rounded half away from zero.
    pub fn new(draft: InventoryDraft, owner: DocId) -> Self {
        InventoryItem {
            id: None,
            pk: None,
            name: normalize::title_case(&draft.name),
            category: normalize::title_case(&draft.category),
            weight: normalize::round_weight(draft.weight),
            price: normalize::round_price(draft.price),
            user_id: Some(owner),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// The document as it is mirrored into the search index: the response
    /// fields plus the owner id for scoped queries.
    pub fn index_payload(&self) -> serde_json::Value {
        json!({
            "id": self.pk,
            "name": self.name,
            "category": self.category,
            "weight": self.weight,
            "price": self.price,
            "user_id": self.user_id.map(|id| id.to_string()),
        })
    }

    /// Queue an asynchronous job adding this item to the search index.
    ///
    /// Fire-and-forget: the job id is logged but not tracked to completion.
    pub async fn enqueue_index_add(&self, pool: &DbPool) -> Result<(), sqlx::Error> {
        let Some(id) = self.id else { return Ok(()) };
        let job_id = OutboxRepo::enqueue(
            pool,
            INVENTORY_INDEX,
            id,
            IndexOp::Index,
            Some(self.index_payload()),
        )
        .await?;
        tracing::info!(job_id, index = INVENTORY_INDEX, "Queued index add");
        Ok(())
    }

    /// Queue an asynchronous job updating this item in the search index.
    pub async fn enqueue_index_update(&self, pool: &DbPool) -> Result<(), sqlx::Error> {
        let Some(id) = self.id else { return Ok(()) };
        let job_id = OutboxRepo::enqueue(
            pool,
            INVENTORY_INDEX,
            id,
            IndexOp::Update,
            Some(self.index_payload()),
        )
        .await?;
        tracing::info!(job_id, index = INVENTORY_INDEX, "Queued index update");
        Ok(())
    }

    /// Queue an asynchronous job removing this item from the search index.
    pub async fn enqueue_index_remove(&self, pool: &DbPool) -> Result<(), sqlx::Error> {
        let Some(id) = self.id else { return Ok(()) };
        let job_id = OutboxRepo::enqueue(pool, INVENTORY_INDEX, id, IndexOp::Delete, None).await?;
        tracing::info!(job_id, index = INVENTORY_INDEX, "Queued index remove");
        Ok(())
    }
}

impl Entity for InventoryItem {
    const COLLECTION: &'static str = "inventory";

    fn id(&self) -> Option<DocId> {
        self.id
    }

    fn pk(&self) -> Option<Pk> {
        self.pk
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "pk" | "id" => Some(self.pk.into()),
            "name" => Some(self.name.as_str().into()),
            "category" => Some(self.category.as_str().into()),
            "weight" => Some(self.weight.into()),
            "price" => Some(self.price.into()),
            "user_id" => Some(self.user_id.into()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

impl Owned for InventoryItem {
    fn owner_id(&self) -> Option<DocId> {
        self.user_id
    }
}

impl Document for InventoryItem {
    fn set_id(&mut self, id: DocId) {
        self.id = Some(id);
    }

    fn assign_pk(&mut self, pk: Pk) {
        self.pk = Some(pk);
    }

    fn touch_updated(&mut self, at: Timestamp) {
        self.updated_at = Some(at);
    }
}

/// External representation of an item. Deserializable as well because
/// search hits come back in exactly this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryResponse {
    /// Application-visible sequence number, surfaced as `id`.
    pub id: Pk,
    pub name: String,
    pub category: String,
    pub weight: f64,
    pub price: f64,
}

impl From<&InventoryItem> for InventoryResponse {
    fn from(item: &InventoryItem) -> Self {
        InventoryResponse {
            id: item.pk.unwrap_or_default(),
            name: item.name.clone(),
            category: item.category.clone(),
            weight: item.weight,
            price: item.price,
        }
    }
}

/// Partial update for an item. Only present fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub weight: Option<f64>,
    pub price: Option<f64>,
}

impl InventoryPatch {
    /// Deterministic merge: each present field overwrites its counterpart
    /// with the same normalization as at creation.
    pub fn apply(&self, item: &mut InventoryItem) {
        if let Some(name) = &self.name {
            item.name = normalize::title_case(name);
        }
        if let Some(category) = &self.category {
            item.category = normalize::title_case(category);
        }
        if let Some(weight) = self.weight {
            item.weight = normalize::round_weight(weight);
        }
        if let Some(price) = self.price {
            item.price = normalize::round_price(price);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> InventoryDraft {
        InventoryDraft {
            name: "widget".into(),
            category: "tools".into(),
            weight: 1.23456,
            price: 9.999,
        }
    }

    #[test]
    fn new_item_is_normalized() {
        let owner = uuid::Uuid::new_v4();
        let item = InventoryItem::new(draft(), owner);

        assert_eq!(item.name, "Widget");
        assert_eq!(item.category, "Tools");
        assert_eq!(item.weight, 1.23456);
        assert_eq!(item.price, 10.00);
        assert_eq!(item.user_id, Some(owner));
    }

    #[test]
    fn price_rounding_boundary() {
        let owner = uuid::Uuid::new_v4();

        let mut d = draft();
        d.price = 9.995;
        assert_eq!(InventoryItem::new(d, owner).price, 10.00);

        let mut d = draft();
        d.price = 9.994;
        assert_eq!(InventoryItem::new(d, owner).price, 9.99);
    }

    #[test]
    fn patch_applies_and_normalizes_present_fields_only() {
        let owner = uuid::Uuid::new_v4();
        let mut item = InventoryItem::new(draft(), owner);

        let patch = InventoryPatch {
            category: Some("hand tools".into()),
            price: Some(12.345),
            ..Default::default()
        };
        patch.apply(&mut item);

        assert_eq!(item.name, "Widget");
        assert_eq!(item.category, "Hand Tools");
        assert_eq!(item.weight, 1.23456);
        assert_eq!(item.price, 12.35);
    }

    #[test]
    fn index_payload_carries_owner_and_response_fields() {
        let owner = uuid::Uuid::new_v4();
        let mut item = InventoryItem::new(draft(), owner);
        item.pk = Some(7);

        let payload = item.index_payload();
        assert_eq!(payload["id"], 7);
        assert_eq!(payload["name"], "Widget");
        assert_eq!(payload["user_id"], owner.to_string());
        assert!(payload.get("created_at").is_none());
    }
}
