//! User JWT authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::Role;

use crate::db;
use crate::state::AppState;

/// JWT claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub sub: String,
    /// Role at token issue time (informational; the middleware re-reads
    /// the current role from the database)
    pub role: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated user identity, inserted as a request extension
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub manager_id: Option<String>,
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a JWT token for a user
pub fn create_token(
    user_id: &str,
    role: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = UserClaims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Middleware that verifies the bearer token and loads the current user.
///
/// The user row is re-read on every request so role changes and account
/// deactivation take effect immediately, not at token expiry.
pub async fn user_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::new(ErrorCode::NotAuthenticated).into_response())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::new(ErrorCode::TokenInvalid).into_response())?;

    let validation = Validation::default();
    let token_data = jsonwebtoken::decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        let code = match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => ErrorCode::TokenExpired,
            _ => ErrorCode::TokenInvalid,
        };
        AppError::new(code).into_response()
    })?;

    let user = db::users::find_by_id(&state.pool, &token_data.claims.sub)
        .await
        .map_err(|e| {
            tracing::error!("DB error during auth: {e}");
            AppError::new(ErrorCode::InternalError).into_response()
        })?
        .ok_or_else(|| AppError::new(ErrorCode::TokenInvalid).into_response())?;

    if !user.is_active {
        return Err(AppError::with_message(
            ErrorCode::AccountDisabled,
            "Your account has been deactivated. Please contact HR.",
        )
        .into_response());
    }

    let role = Role::from_db(&user.role)
        .ok_or_else(|| AppError::new(ErrorCode::InternalError).into_response())?;

    let identity = CurrentUser {
        id: user.id,
        name: user.name,
        role,
        manager_id: user.manager_id,
    };

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
