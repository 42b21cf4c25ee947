//! Registration, login, and own-profile management

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{User, UserResponse};
use shared::util::now_millis;

use super::{ApiResult, internal};
use crate::auth::{CurrentUser, create_token};
use crate::db;
use crate::state::AppState;
use crate::util::{hash_password, verify_password};

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 50;
const MIN_PASSWORD_LEN: usize = 6;

const DEFAULT_ANNUAL: f64 = 20.0;
const DEFAULT_SICK: f64 = 10.0;
const DEFAULT_CASUAL: f64 = 5.0;
const DEFAULT_UNPAID: f64 = 999.0;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn validate_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.len() < MIN_NAME_LEN || name.len() > MAX_NAME_LEN {
        return Err(AppError::validation(
            "Name must be between 2 and 50 characters.",
        ));
    }
    Ok(name)
}

fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') || !email.contains('.') {
        return Err(AppError::validation("Please provide a valid email address."));
    }
    Ok(email)
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    let name = validate_name(&req.name)?;
    let email = validate_email(&req.email)?;
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }

    if db::users::find_by_email(&state.pool, &email)
        .await
        .map_err(internal)?
        .is_some()
    {
        return Err(AppError::new(ErrorCode::EmailExists));
    }

    let hashed = hash_password(&req.password).map_err(internal)?;
    let now = now_millis();
    let department = req
        .department
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("General");
    let position = req
        .position
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("Staff");

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        email,
        hashed_password: hashed,
        role: "employee".to_string(),
        department: department.to_string(),
        position: position.to_string(),
        manager_id: None,
        balance_annual: DEFAULT_ANNUAL,
        balance_sick: DEFAULT_SICK,
        balance_casual: DEFAULT_CASUAL,
        balance_unpaid: DEFAULT_UNPAID,
        avatar: String::new(),
        phone: req.phone.unwrap_or_default(),
        is_active: true,
        joined_date: now,
        created_at: now,
    };

    db::users::insert(&state.pool, &user)
        .await
        .map_err(internal)?;

    let token = create_token(&user.id, &user.role, &state.jwt_secret).map_err(internal)?;

    Ok(Json(ApiResponse::success_with_message(
        "Account created successfully! Welcome aboard.",
        AuthResponse {
            token,
            user: user.into(),
        },
    )))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let email = req.email.trim().to_lowercase();

    let user = db::users::find_by_email(&state.pool, &email)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::InvalidCredentials, "Invalid email or password.")
        })?;

    if !verify_password(&req.password, &user.hashed_password) {
        return Err(AppError::with_message(
            ErrorCode::InvalidCredentials,
            "Invalid email or password.",
        ));
    }

    if !user.is_active {
        return Err(AppError::with_message(
            ErrorCode::AccountDisabled,
            "Your account has been deactivated. Please contact HR.",
        ));
    }

    let token = create_token(&user.id, &user.role, &state.jwt_secret).map_err(internal)?;
    let message = format!("Welcome back, {}!", user.name);

    Ok(Json(ApiResponse::success_with_message(
        message,
        AuthResponse {
            token,
            user: user.into(),
        },
    )))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<UserResponse> {
    let user = db::users::find_by_id(&state.pool, &current.id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<UserResponse> {
    let name = match req.name.as_deref() {
        Some(n) => Some(validate_name(n)?),
        None => None,
    };

    let user = db::users::update_profile(
        &state.pool,
        &current.id,
        name,
        req.department.as_deref(),
        req.position.as_deref(),
        req.phone.as_deref(),
        req.avatar.as_deref(),
    )
    .await
    .map_err(internal)?
    .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(ApiResponse::success_with_message(
        "Profile updated successfully.",
        user.into(),
    )))
}

/// PUT /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<TokenResponse> {
    let user = db::users::find_by_id(&state.pool, &current.id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    if !verify_password(&req.current_password, &user.hashed_password) {
        return Err(AppError::validation("Current password is incorrect."));
    }
    if req.new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }
    if req.new_password == req.current_password {
        return Err(AppError::validation(
            "New password must be different from the current password.",
        ));
    }

    let hashed = hash_password(&req.new_password).map_err(internal)?;
    db::users::update_password(&state.pool, &current.id, &hashed)
        .await
        .map_err(internal)?;

    // Issue a fresh token so the client can keep its session
    let token = create_token(&user.id, &user.role, &state.jwt_secret).map_err(internal)?;

    Ok(Json(ApiResponse::success_with_message(
        "Password changed successfully.",
        TokenResponse { token },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Alice  ").unwrap(), "Alice");
        assert!(validate_name("A").is_err());
        assert!(validate_name(&"x".repeat(51)).is_err());
        assert!(validate_name(&"x".repeat(50)).is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email("  Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }
}
