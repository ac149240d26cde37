//! Handlers for account creation and token issuance.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use stockroom_core::normalize;
use stockroom_db::models::{User, UserResponse};
use stockroom_db::repos::UserRepo;
use stockroom_db::{create, save};
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::generate_key;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::validate_request;
use crate::response::MessageResponse;
use crate::schemas::{LoginRequest, SignupRequest};
use crate::state::AppState;

/// Successful login response. The token key is a transport-only secret:
/// this is the one place it ever appears in plaintext.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub status: u16,
    pub email: String,
    pub token: String,
}

/// Response for the service-to-service authentication endpoint.
#[derive(Debug, Serialize)]
pub struct AuthenticateResponse {
    pub success: bool,
    pub status: u16,
    pub user: Value,
    pub token: Value,
}

/// POST /api/v1/signup
///
/// Create a new user account. The email doubles as the username.
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let body = body.validated()?;
    let email = normalize::normalize_email(&body.email);

    if UserRepo::find_by_email(&state.store, &email).await?.is_some() {
        return Err(ApiError::BadRequest(format!(
            "A user with the email {email} already exists"
        )));
    }

    let password_hash = hash_password(&body.password)
        .map_err(|e| ApiError::Internal(format!("Password hashing error: {e}")))?;
    let user = User::new(&body.email, password_hash, &body.first_name, &body.last_name);

    if let Err(err) = create(&state.store, user).await {
        tracing::error!(error = %err, %email, "Error creating new user");
        return Err(ApiError::BadRequest("error creating new user".into()));
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(201, "new user created successfully")),
    ))
}

/// POST /api/v1/login
///
/// Verify credentials and issue a fresh auth token. Any previously issued
/// token for the user is discarded.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    body.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let mut user = UserRepo::find_by_email(&state.store, &body.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    let password_valid = verify_password(&body.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(ApiError::BadRequest("invalid password".into()));
    }

    tracing::info!(email = %user.email, "Generating new user auth token");
    let (plaintext, digest) = generate_key();
    user.issue_token(digest);
    save(&state.store, &mut user).await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "auth token generated".into(),
        status: 200,
        email: user.email,
        token: plaintext,
    }))
}

/// POST /api/v1/iam/authenticate
///
/// Validate a bearer token on behalf of another service, returning the
/// resolved user and token. Validation refreshes the token's sliding
/// expiry, exactly as it does for first-party requests.
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<AuthenticateResponse>> {
    let principal =
        validate_request(&headers, &state.store, state.config.token_max_age()).await?;

    let mut user = serde_json::to_value(UserResponse::from(&principal.user))
        .map_err(|e| ApiError::Internal(format!("Serialization error: {e}")))?;
    // The calling service references users by internal id, so it replaces
    // the sequence number in the payload.
    if let Some(id) = principal.user.id {
        user["id"] = Value::from(id.to_string());
    }

    let token = json!({
        "created_at": principal.token.created_at,
        "updated_at": principal.token.updated_at,
    });

    Ok(Json(AuthenticateResponse {
        success: true,
        status: 200,
        user,
        token,
    }))
}
