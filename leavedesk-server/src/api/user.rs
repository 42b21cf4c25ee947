//! Employee directory and per-user views

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Role, UserResponse};
use shared::query::{PaginatedResponse, page_params};

use super::{ApiResult, internal};
use crate::auth::CurrentUser;
use crate::db;
use crate::db::leaves::{LeaveDetail, LeaveFilter};
use crate::db::stats::StatusCount;
use crate::db::users::UserFilter;
use crate::ledger;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub department: Option<String>,
    pub role: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserLeavesQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// User detail plus a per-status summary of their leave history
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub user: UserResponse,
    pub leave_summary: Vec<StatusCount>,
}

fn user_not_found() -> AppError {
    AppError::with_message(ErrorCode::UserNotFound, "User not found.")
}

/// GET /api/users
///
/// Directory listing for managers and admins. Managers only see their
/// own team; employees use /api/auth/me instead.
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(q): Query<ListUsersQuery>,
) -> ApiResult<PaginatedResponse<UserResponse>> {
    if !current.role.can_manage() {
        return Err(AppError::permission_denied("Access denied."));
    }

    let manager_id = match current.role {
        Role::Manager => Some(current.id.as_str()),
        _ => None,
    };

    let (page, limit) = page_params(q.page, q.limit, DEFAULT_PAGE_SIZE);
    let filter = UserFilter {
        role: q.role.as_deref(),
        department: q.department.as_deref(),
        manager_id,
        is_active: Some(true),
        search: q.search.as_deref(),
    };

    let (users, total) = db::users::list(&state.pool, &filter, "name ASC", page, limit)
        .await
        .map_err(internal)?;

    let users = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        users, total, page, limit,
    ))))
}

/// GET /api/users/managers
///
/// Active managers, for assignment dropdowns.
pub async fn managers(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<UserResponse>> {
    if !current.role.can_manage() {
        return Err(AppError::permission_denied("Access denied."));
    }

    let managers = db::users::list_managers(&state.pool)
        .await
        .map_err(internal)?;

    Ok(Json(ApiResponse::success(
        managers.into_iter().map(UserResponse::from).collect(),
    )))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<UserDetail> {
    let target = db::users::find_by_id(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(user_not_found)?;

    if !ledger::scope::can_view_record(
        &current.id,
        current.role,
        &target.id,
        target.manager_id.as_deref(),
    ) {
        return Err(AppError::permission_denied("Access denied."));
    }

    let leave_summary = db::stats::leave_summary_for(&state.pool, &id)
        .await
        .map_err(internal)?;

    Ok(Json(ApiResponse::success(UserDetail {
        user: target.into(),
        leave_summary,
    })))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<UserResponse> {
    if current.id != id && !current.role.is_admin() {
        return Err(AppError::permission_denied(
            "You can only update your own profile.",
        ));
    }

    db::users::find_by_id(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(user_not_found)?;

    let user = db::users::update_profile(
        &state.pool,
        &id,
        req.name.as_deref().map(str::trim),
        req.department.as_deref(),
        req.position.as_deref(),
        req.phone.as_deref(),
        req.avatar.as_deref(),
    )
    .await
    .map_err(internal)?
    .ok_or_else(user_not_found)?;

    Ok(Json(ApiResponse::success_with_message(
        "Profile updated successfully.",
        user.into(),
    )))
}

/// GET /api/users/{id}/leaves
pub async fn leaves(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Query(q): Query<UserLeavesQuery>,
) -> ApiResult<PaginatedResponse<LeaveDetail>> {
    let target = db::users::find_by_id(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(user_not_found)?;

    if !ledger::scope::can_view_record(
        &current.id,
        current.role,
        &target.id,
        target.manager_id.as_deref(),
    ) {
        return Err(AppError::permission_denied("Access denied."));
    }

    let (page, limit) = page_params(q.page, q.limit, 10);
    let filter = LeaveFilter {
        employee_id: Some(&id),
        status: q.status.as_deref(),
        ..Default::default()
    };

    let (leaves, total) = db::leaves::list(&state.pool, &filter, page, limit)
        .await
        .map_err(internal)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        leaves, total, page, limit,
    ))))
}
