//! Token-based authentication extractors for Axum handlers.
//!
//! Validation is a pure async function over the request headers and the
//! store -- no request-scoped globals, no shared mutable state. Each
//! successful validation refreshes the token's sliding expiry window as an
//! observable side effect.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use stockroom_db::models::{AuthToken, User};
use stockroom_db::repos::UserRepo;
use stockroom_db::{save, DocumentStore};

use crate::auth::token::hash_key;
use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller: the resolved user plus their live token.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub token: AuthToken,
}

/// Pull the key out of an `Authorization: Token <key>` header.
///
/// The scheme match is case-insensitive; anything else is treated as a
/// missing credential.
fn extract_request_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, key) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("token") && !key.is_empty() {
        Some(key)
    } else {
        None
    }
}

/// Validate a request's bearer token.
///
/// Outcomes: missing/malformed header, a key that resolves to no user, and
/// a stale token are all rejected with distinct 401 messages. On success
/// the token's `updated_at` is bumped and persisted before the principal
/// is returned.
pub async fn validate_request(
    headers: &HeaderMap,
    store: &DocumentStore,
    max_age: chrono::Duration,
) -> Result<Principal, ApiError> {
    let key = extract_request_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("missing authorization header".into()))?;

    let mut user = UserRepo::find_by_token_hash(store, &hash_key(key))
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid token".into()))?;

    let Some(token) = user.auth_token.as_mut() else {
        return Err(ApiError::Unauthorized("invalid token".into()));
    };

    if token.expired(max_age) {
        tracing::warn!(email = %user.email, "User auth token has expired");
        return Err(ApiError::Unauthorized("expired token".into()));
    }

    token.refresh();
    let token = token.clone();
    save(store, &mut user).await?;

    Ok(Principal { user, token })
}

/// Authenticated user extracted from the `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(AuthUser(principal): AuthUser) -> ApiResult<Json<()>> {
///     tracing::info!(email = %principal.user.email, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal =
            validate_request(&parts.headers, &state.store, state.config.token_max_age()).await?;
        Ok(AuthUser(principal))
    }
}

/// Authenticated superuser. Adds one gate on top of [`AuthUser`]:
/// an authenticated caller without the superuser flag is rejected with a
/// distinct message, still as 401.
#[derive(Debug, Clone)]
pub struct SuperUser(pub Principal);

impl FromRequestParts<AppState> for SuperUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal =
            validate_request(&parts.headers, &state.store, state.config.token_max_age()).await?;

        if !principal.user.is_superuser {
            return Err(ApiError::Unauthorized(
                "This endpoint is for superusers only".into(),
            ));
        }
        Ok(SuperUser(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_token_scheme_case_insensitively() {
        assert_eq!(
            extract_request_token(&headers_with("Token abc123")),
            Some("abc123")
        );
        assert_eq!(
            extract_request_token(&headers_with("token abc123")),
            Some("abc123")
        );
        assert_eq!(
            extract_request_token(&headers_with("TOKEN abc123")),
            Some("abc123")
        );
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        assert_eq!(extract_request_token(&HeaderMap::new()), None);
        assert_eq!(extract_request_token(&headers_with("Bearer abc123")), None);
        assert_eq!(extract_request_token(&headers_with("Token")), None);
        assert_eq!(extract_request_token(&headers_with("Token ")), None);
    }
}
