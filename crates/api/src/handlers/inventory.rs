//! Handlers for the `/inventory` resource.
//!
//! Every operation is scoped to the authenticated owner; a record that
//! exists but belongs to someone else is indistinguishable from one that
//! does not exist.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use stockroom_core::types::{DocId, Pk};
use stockroom_core::value::FieldValue;
use stockroom_db::models::inventory::INVENTORY_INDEX;
use stockroom_db::models::{InventoryDraft, InventoryItem, InventoryPatch, InventoryResponse};
use stockroom_db::{create, delete, save, Filters, QueryInterface, StoreError};
use stockroom_index::{build_search_query, SearchTerms};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::{AuthUser, Principal};
use crate::response::{DataResponse, ListResponse, MessageResponse, Pagination};
use crate::schemas::{
    resolve_order_field, BulkCreateInventory, BulkIds, ListParams, SearchParams,
    INVENTORY_ORDER_FIELDS,
};
use crate::state::AppState;

/// POST /api/v1/inventory/create
///
/// Create one item owned by the caller and queue its index add.
pub async fn create_item(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Json(draft): Json<InventoryDraft>,
) -> ApiResult<(StatusCode, Json<DataResponse<InventoryResponse>>)> {
    let owner = owner_id(&principal)?;

    let item = create(&state.store, InventoryItem::new(draft, owner)).await?;
    item.enqueue_index_add(&state.pool)
        .await
        .map_err(StoreError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(
            201,
            "new inventory item created successfully",
            InventoryResponse::from(&item),
        )),
    ))
}

/// POST /api/v1/inventory/create/bulk
///
/// Create many items. The first failure aborts the batch; items created
/// before it are not rolled back.
pub async fn bulk_create_items(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<BulkCreateInventory>,
) -> ApiResult<(StatusCode, Json<DataResponse<Vec<InventoryResponse>>>)> {
    let owner = owner_id(&principal)?;
    let mut created = Vec::with_capacity(body.items.len());

    for draft in body.items {
        let item = create(&state.store, InventoryItem::new(draft, owner)).await?;
        item.enqueue_index_add(&state.pool)
            .await
            .map_err(StoreError::from)?;
        created.push(InventoryResponse::from(&item));
    }

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(
            201,
            "new inventory items created successfully",
            created,
        )),
    ))
}

/// GET /api/v1/inventory/items
///
/// Paginated listing of the caller's items.
pub async fn list_items(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ListResponse<InventoryResponse>>> {
    let owner = owner_id(&principal)?;
    let order_field = resolve_order_field(params.order_by.as_deref(), INVENTORY_ORDER_FIELDS)?;

    let mut filters = Filters::new().eq("user_id", owner);
    if let Some(ids) = params.id_list()? {
        filters = filters.is_in("id", ids.into_iter().map(FieldValue::Int).collect());
    }

    let interface = QueryInterface::<InventoryItem>::new(&state.store);
    let mut queryset = interface.filter(filters).await?;

    queryset.order_by(order_field, params.direction());
    let page = queryset.paginate(params.page(), params.per_page());

    let pagination = Pagination::from(&page);
    let data = page.items.iter().map(InventoryResponse::from).collect();
    Ok(Json(ListResponse::new(data, pagination)))
}

/// GET /api/v1/inventory/items/{id}
pub async fn item_detail(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Pk>,
) -> ApiResult<Json<DataResponse<InventoryResponse>>> {
    let item = fetch_owned_item(&state, &principal, id).await?;
    Ok(Json(DataResponse::new(
        200,
        "",
        InventoryResponse::from(&item),
    )))
}

/// PATCH /api/v1/inventory/items/{id}
///
/// Partial update; only fields present in the body are applied. Queues an
/// index update for the changed document.
pub async fn patch_item(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Pk>,
    Json(patch): Json<InventoryPatch>,
) -> ApiResult<Json<DataResponse<InventoryResponse>>> {
    let mut item = fetch_owned_item(&state, &principal, id).await?;

    patch.apply(&mut item);
    save(&state.store, &mut item).await?;
    item.enqueue_index_update(&state.pool)
        .await
        .map_err(StoreError::from)?;

    Ok(Json(DataResponse::new(
        200,
        "",
        InventoryResponse::from(&item),
    )))
}

/// DELETE /api/v1/inventory/items/{id}
pub async fn delete_item(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Pk>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let owner = owner_id(&principal)?;
    let item = QueryInterface::<InventoryItem>::new(&state.store)
        .get(Filters::new().eq("id", id).eq("user_id", owner))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No Inventory item with id {id} found")))?;

    delete(&state.store, &item).await?;
    item.enqueue_index_remove(&state.pool)
        .await
        .map_err(StoreError::from)?;

    Ok((StatusCode::RESET_CONTENT, Json(MessageResponse::new(205, ""))))
}

/// DELETE /api/v1/inventory/items/delete/bulk
///
/// Delete the caller's items among the given ids. Ids that do not exist
/// or belong to someone else are silently ignored; 404 is returned only
/// when nothing matches.
pub async fn bulk_delete_items(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<BulkIds>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let owner = owner_id(&principal)?;

    let interface = QueryInterface::<InventoryItem>::new(&state.store);
    let values = body.ids.into_iter().map(FieldValue::Int).collect();
    let queryset = interface.filter(Filters::new().is_in("id", values)).await?;

    // Owner scoping happens in memory, on the already-fetched set.
    let scoped = queryset.owned_by(owner);
    if scoped.count() == 0 {
        return Err(ApiError::NotFound("No Inventory items found".into()));
    }

    let items = scoped.items().to_vec();
    interface.delete_queryset(scoped).await?;
    for item in &items {
        item.enqueue_index_remove(&state.pool)
            .await
            .map_err(StoreError::from)?;
    }

    Ok((StatusCode::RESET_CONTENT, Json(MessageResponse::new(205, ""))))
}

/// GET /api/v1/inventory/search
///
/// Fuzzy search over the caller's indexed items. At least one term is
/// required; an all-empty query is a caller error, not an empty result.
pub async fn search_items(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<ListResponse<InventoryResponse>>> {
    let owner = owner_id(&principal)?;

    let terms = SearchTerms::new()
        .scoped("user_id", owner.to_string())
        .term("name", &params.name())
        .term("category", &params.category());
    let query = build_search_query(&terms)?;

    let hits = state.search.search(INVENTORY_INDEX, &query).await?;
    let page = hits.paginate(params.page(), params.per_page());

    let pagination = Pagination::from(&page);
    let data = page
        .items
        .iter()
        .filter_map(|hit| serde_json::from_value::<InventoryResponse>(hit.source.clone()).ok())
        .collect();

    Ok(Json(ListResponse::new(data, pagination)))
}

/// The caller's internal id; authenticated users always have one.
fn owner_id(principal: &Principal) -> Result<DocId, ApiError> {
    principal
        .user
        .id
        .ok_or_else(|| ApiError::Internal("authenticated user has no internal id".into()))
}

/// Fetch one of the caller's items by sequence number or 404.
async fn fetch_owned_item(
    state: &AppState,
    principal: &Principal,
    id: Pk,
) -> ApiResult<InventoryItem> {
    let owner = owner_id(principal)?;
    QueryInterface::<InventoryItem>::new(&state.store)
        .get(Filters::new().eq("id", id).eq("user_id", owner))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Inventory item with id {id} not found")))
}
