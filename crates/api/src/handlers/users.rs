//! Handlers for the `/users` resource.
//!
//! Users are not owner-scoped: any authenticated caller may list and view
//! them. Destructive operations are superuser-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use stockroom_core::types::Pk;
use stockroom_core::value::FieldValue;
use stockroom_db::models::{User, UserPatch, UserResponse};
use stockroom_db::repos::InventoryRepo;
use stockroom_db::{delete, save, Filters, QueryInterface, StoreError};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::{AuthUser, SuperUser};
use crate::response::{DataResponse, ListResponse, MessageResponse, Pagination};
use crate::schemas::{resolve_order_field, BulkIds, ListParams, USER_ORDER_FIELDS};
use crate::state::AppState;

/// GET /api/v1/users
///
/// Paginated user listing. `id_in` narrows the result to the given
/// sequence numbers via a set-membership query.
pub async fn list_users(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ListResponse<UserResponse>>> {
    let order_field = resolve_order_field(params.order_by.as_deref(), USER_ORDER_FIELDS)?;
    let interface = QueryInterface::<User>::new(&state.store);

    let mut queryset = match params.id_list()? {
        Some(ids) => {
            let values = ids.into_iter().map(FieldValue::Int).collect();
            interface.filter(Filters::new().is_in("id", values)).await?
        }
        None => interface.all().await?,
    };

    queryset.order_by(order_field, params.direction());
    let page = queryset.paginate(params.page(), params.per_page());

    let pagination = Pagination::from(&page);
    let data = page.items.iter().map(UserResponse::from).collect();
    Ok(Json(ListResponse::new(data, pagination)))
}

/// GET /api/v1/users/{id}
///
/// Single user by sequence number. Responses are served from the TTL
/// cache when possible.
pub async fn user_detail(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Pk>,
) -> ApiResult<Json<DataResponse<UserResponse>>> {
    if let Some(cached) = state.user_cache.get(id).await {
        return Ok(Json(DataResponse::new(200, "", cached)));
    }

    let user = fetch_user(&state, id).await?;
    let payload = UserResponse::from(&user);
    state.user_cache.insert(id, payload.clone()).await;

    Ok(Json(DataResponse::new(200, "", payload)))
}

/// PATCH /api/v1/users/{id}
///
/// Partial update; only fields present in the body are applied.
pub async fn patch_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Pk>,
    Json(patch): Json<UserPatch>,
) -> ApiResult<Json<DataResponse<UserResponse>>> {
    let mut user = fetch_user(&state, id).await?;

    patch.apply(&mut user);
    save(&state.store, &mut user).await?;

    let payload = UserResponse::from(&user);
    state.user_cache.insert(id, payload.clone()).await;
    Ok(Json(DataResponse::new(200, "", payload)))
}

/// DELETE /api/v1/users/{id}
///
/// Superuser only. Deleting a user cascades to their inventory documents
/// and queues the matching index removals.
pub async fn delete_user(
    _auth: SuperUser,
    State(state): State<AppState>,
    Path(id): Path<Pk>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let user = QueryInterface::<User>::new(&state.store)
        .get(Filters::new().eq("id", id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No User with id {id} found")))?;

    cascade_delete_inventory(&state, &user).await?;
    delete(&state.store, &user).await?;
    state.user_cache.invalidate(id).await;

    Ok((StatusCode::RESET_CONTENT, Json(MessageResponse::new(205, ""))))
}

/// DELETE /api/v1/users/delete/bulk
///
/// Superuser only. Ids that match nothing are silently ignored; 404 is
/// returned only when no id matches at all.
pub async fn bulk_delete_users(
    _auth: SuperUser,
    State(state): State<AppState>,
    Json(body): Json<BulkIds>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let interface = QueryInterface::<User>::new(&state.store);
    let values = body.ids.into_iter().map(FieldValue::Int).collect();
    let queryset = interface.filter(Filters::new().is_in("id", values)).await?;

    if queryset.count() == 0 {
        return Err(ApiError::NotFound("No User objects found".into()));
    }

    for user in queryset.items() {
        cascade_delete_inventory(&state, user).await?;
        if let Some(pk) = user.pk {
            state.user_cache.invalidate(pk).await;
        }
    }
    interface.delete_queryset(queryset).await?;

    Ok((StatusCode::RESET_CONTENT, Json(MessageResponse::new(205, ""))))
}

/// Fetch a user by sequence number or 404.
async fn fetch_user(state: &AppState, id: Pk) -> ApiResult<User> {
    QueryInterface::<User>::new(&state.store)
        .get(Filters::new().eq("id", id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with id {id} not found")))
}

/// Remove a user's inventory and queue index removals for each item.
async fn cascade_delete_inventory(state: &AppState, user: &User) -> ApiResult<()> {
    let Some(owner) = user.id else {
        return Ok(());
    };

    let removed = InventoryRepo::delete_by_owner(&state.store, owner).await?;
    for item in &removed {
        item.enqueue_index_remove(&state.pool)
            .await
            .map_err(StoreError::from)?;
    }
    Ok(())
}
