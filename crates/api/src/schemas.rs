//! Request schemas: deserialization, validation, and normalization at the
//! HTTP boundary.

use serde::Deserialize;
use stockroom_core::queryset::{clamp_page, clamp_per_page, SortDirection};
use stockroom_core::types::Pk;
use validator::Validate;

use crate::error::ApiError;

/// Body for `POST /signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

impl SignupRequest {
    /// Field-level checks plus the cross-field password confirmation.
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        if self.password != self.confirm_password {
            return Err(ApiError::BadRequest("passwords must match".into()));
        }
        Ok(self)
    }
}

/// Body for `POST /login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    pub password: String,
}

/// Common query parameters for paginated list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub order_by: Option<String>,
    pub direction: Option<String>,
    /// JSON-encoded list of ids, e.g. `id_in=[1,2,3]`.
    pub id_in: Option<String>,
}

impl ListParams {
    pub fn page(&self) -> usize {
        clamp_page(self.page)
    }

    pub fn per_page(&self) -> usize {
        clamp_per_page(self.per_page)
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
            .as_deref()
            .map(SortDirection::parse)
            .unwrap_or_default()
    }

    /// Decode the `id_in` parameter, if present.
    pub fn id_list(&self) -> Result<Option<Vec<Pk>>, ApiError> {
        match &self.id_in {
            None => Ok(None),
            Some(raw) => {
                let ids: Vec<Pk> = serde_json::from_str(raw).map_err(|_| {
                    ApiError::BadRequest("id_in must be a JSON-encoded list of ids".into())
                })?;
                Ok(Some(ids))
            }
        }
    }
}

/// Resolve an `order_by` query value against a whitelist of sortable
/// fields, falling back to `id` (the sequence number).
pub fn resolve_order_field(
    requested: Option<&str>,
    allowed: &[&'static str],
) -> Result<&'static str, ApiError> {
    match requested {
        None | Some("") => Ok("id"),
        Some(value) => allowed
            .iter()
            .find(|field| **field == value)
            .copied()
            .ok_or_else(|| ApiError::BadRequest(format!("cannot order by field {value}"))),
    }
}

/// Sortable fields for the users list.
pub const USER_ORDER_FIELDS: &[&str] = &[
    "id",
    "email",
    "first_name",
    "last_name",
    "created_at",
    "updated_at",
];

/// Sortable fields for the inventory list.
pub const INVENTORY_ORDER_FIELDS: &[&str] = &[
    "id",
    "name",
    "category",
    "weight",
    "price",
    "created_at",
    "updated_at",
];

/// Body for bulk deletes: `{"ids": [...]}`.
#[derive(Debug, Deserialize)]
pub struct BulkIds {
    pub ids: Vec<Pk>,
}

/// Body for `POST /inventory/create/bulk`.
#[derive(Debug, Deserialize)]
pub struct BulkCreateInventory {
    pub items: Vec<stockroom_db::models::InventoryDraft>,
}

/// Query parameters for `GET /inventory/search`.
///
/// Term values are lowercased before they reach the engine, matching how
/// the indexed documents are analyzed.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub name: Option<String>,
    pub category: Option<String>,
}

impl SearchParams {
    pub fn page(&self) -> usize {
        clamp_page(self.page)
    }

    pub fn per_page(&self) -> usize {
        clamp_per_page(self.per_page)
    }

    pub fn name(&self) -> String {
        self.name.as_deref().unwrap_or_default().to_lowercase()
    }

    pub fn category(&self) -> String {
        self.category.as_deref().unwrap_or_default().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_in_parses_a_json_list() {
        let params = ListParams {
            id_in: Some("[1, 2, 3]".into()),
            ..Default::default()
        };
        assert_eq!(params.id_list().unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn id_in_rejects_malformed_input() {
        let params = ListParams {
            id_in: Some("1,2,3".into()),
            ..Default::default()
        };
        assert!(params.id_list().is_err());
    }

    #[test]
    fn absent_id_in_is_none() {
        assert_eq!(ListParams::default().id_list().unwrap(), None);
    }

    #[test]
    fn pagination_params_are_clamped() {
        let params = ListParams {
            page: Some(-1),
            per_page: Some(500),
            ..Default::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 100);

        let defaults = ListParams::default();
        assert_eq!(defaults.page(), 1);
        assert_eq!(defaults.per_page(), 25);
    }

    #[test]
    fn order_field_falls_back_to_id_and_rejects_unknowns() {
        assert_eq!(
            resolve_order_field(None, INVENTORY_ORDER_FIELDS).unwrap(),
            "id"
        );
        assert_eq!(
            resolve_order_field(Some("price"), INVENTORY_ORDER_FIELDS).unwrap(),
            "price"
        );
        assert!(resolve_order_field(Some("user_id"), INVENTORY_ORDER_FIELDS).is_err());
    }

    #[test]
    fn search_terms_are_lowercased() {
        let params = SearchParams {
            name: Some("Widget".into()),
            category: None,
            ..Default::default()
        };
        assert_eq!(params.name(), "widget");
        assert_eq!(params.category(), "");
    }
}
