//! Admin-only endpoints: dashboard, user administration, org-wide leave list

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Role, UserResponse};
use shared::query::{PaginatedResponse, page_params};

use super::{ApiResult, internal};
use crate::auth::CurrentUser;
use crate::db;
use crate::db::leaves::{LeaveDetail, LeaveFilter};
use crate::db::stats::{DepartmentCount, LeaveCounts, TrendBucket, TypeCount};
use crate::db::users::UserFilter;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 15;

#[derive(Debug, Serialize)]
pub struct DashboardUsers {
    pub total: i64,
    pub employees: i64,
    pub managers: i64,
    pub active: i64,
    pub inactive: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub users: DashboardUsers,
    pub leaves: LeaveCounts,
    pub leaves_by_type: Vec<TypeCount>,
    pub monthly_trend: Vec<TrendBucket>,
    pub department_stats: Vec<DepartmentCount>,
}

#[derive(Debug, Deserialize)]
pub struct AdminUsersQuery {
    pub role: Option<String>,
    pub department: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AdminLeavesQuery {
    pub status: Option<String>,
    pub leave_type: Option<String>,
    pub department: Option<String>,
    pub employee_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignManagerRequest {
    pub manager_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustBalanceRequest {
    pub annual: Option<f64>,
    pub sick: Option<f64>,
    pub casual: Option<f64>,
}

fn require_admin(current: &CurrentUser) -> Result<(), AppError> {
    if !current.role.is_admin() {
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    Ok(())
}

fn user_not_found() -> AppError {
    AppError::with_message(ErrorCode::UserNotFound, "User not found.")
}

/// GET /api/admin/stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<DashboardStats> {
    require_admin(&current)?;

    let users = db::stats::user_counts(&state.pool).await.map_err(internal)?;
    let leaves = db::stats::leave_counts(&state.pool).await.map_err(internal)?;
    let leaves_by_type = db::stats::leave_type_counts(&state.pool, None)
        .await
        .map_err(internal)?;

    let since = db::stats::trend_window_start(Utc::now().date_naive())
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0);
    let monthly_trend = db::stats::monthly_trend(&state.pool, since)
        .await
        .map_err(internal)?;

    let department_stats = db::stats::department_stats(&state.pool)
        .await
        .map_err(internal)?;

    Ok(Json(ApiResponse::success(DashboardStats {
        users: DashboardUsers {
            total: users.total,
            employees: users.employees,
            managers: users.managers,
            active: users.active,
            inactive: users.total - users.active,
        },
        leaves,
        leaves_by_type,
        monthly_trend,
        department_stats,
    })))
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(q): Query<AdminUsersQuery>,
) -> ApiResult<PaginatedResponse<UserResponse>> {
    require_admin(&current)?;

    let (page, limit) = page_params(q.page, q.limit, DEFAULT_PAGE_SIZE);
    let filter = UserFilter {
        role: q.role.as_deref(),
        department: q.department.as_deref(),
        manager_id: None,
        is_active: q.is_active,
        search: q.search.as_deref(),
    };

    let (users, total) = db::users::list(&state.pool, &filter, "created_at DESC", page, limit)
        .await
        .map_err(internal)?;

    let users = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        users, total, page, limit,
    ))))
}

/// GET /api/admin/leaves
pub async fn list_leaves(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(q): Query<AdminLeavesQuery>,
) -> ApiResult<PaginatedResponse<LeaveDetail>> {
    require_admin(&current)?;

    let (page, limit) = page_params(q.page, q.limit, 20);
    let filter = LeaveFilter {
        employee_ids: None,
        employee_id: q.employee_id.as_deref(),
        status: q.status.as_deref(),
        leave_type: q.leave_type.as_deref(),
        department: q.department.as_deref(),
        from: None,
        to: None,
    };

    let (leaves, total) = db::leaves::list(&state.pool, &filter, page, limit)
        .await
        .map_err(internal)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        leaves, total, page, limit,
    ))))
}

/// PUT /api/admin/users/{id}/role
pub async fn change_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<ChangeRoleRequest>,
) -> ApiResult<UserResponse> {
    require_admin(&current)?;

    let role = Role::from_db(&req.role).ok_or_else(|| {
        AppError::validation("Invalid role. Must be one of: employee, manager, admin.")
    })?;
    if id == current.id {
        return Err(AppError::with_message(
            ErrorCode::CannotModifySelf,
            "You cannot change your own role.",
        ));
    }

    let user = db::users::set_role(&state.pool, &id, role.as_str())
        .await
        .map_err(internal)?
        .ok_or_else(user_not_found)?;

    let message = format!("{}'s role has been updated to {}.", user.name, role.as_str());
    Ok(Json(ApiResponse::success_with_message(message, user.into())))
}

/// PUT /api/admin/users/{id}/toggle
pub async fn toggle_active(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<UserResponse> {
    require_admin(&current)?;

    if id == current.id {
        return Err(AppError::with_message(
            ErrorCode::CannotModifySelf,
            "You cannot deactivate your own account.",
        ));
    }

    let target = db::users::find_by_id(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(user_not_found)?;

    let user = db::users::set_active(&state.pool, &id, !target.is_active)
        .await
        .map_err(internal)?
        .ok_or_else(user_not_found)?;

    let message = format!(
        "{}'s account has been {}.",
        user.name,
        if user.is_active { "activated" } else { "deactivated" }
    );
    Ok(Json(ApiResponse::success_with_message(message, user.into())))
}

/// PUT /api/admin/users/{id}/assign-manager
pub async fn assign_manager(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<AssignManagerRequest>,
) -> ApiResult<UserResponse> {
    require_admin(&current)?;

    db::users::find_by_id(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(user_not_found)?;

    let manager_id = req.manager_id.as_deref().map(str::trim).filter(|m| !m.is_empty());
    if let Some(mid) = manager_id {
        if mid == id {
            return Err(AppError::validation("Users cannot be their own manager."));
        }
        let manager = db::users::find_by_id(&state.pool, mid)
            .await
            .map_err(internal)?;
        match manager {
            Some(m) if m.role == Role::Manager.as_str() && m.is_active => {}
            _ => return Err(AppError::new(ErrorCode::InvalidManager)),
        }
    }

    let user = db::users::set_manager(&state.pool, &id, manager_id)
        .await
        .map_err(internal)?
        .ok_or_else(user_not_found)?;

    Ok(Json(ApiResponse::success_with_message(
        "Manager assignment updated.",
        user.into(),
    )))
}

/// PUT /api/admin/users/{id}/leave-balance
pub async fn adjust_balance(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<AdjustBalanceRequest>,
) -> ApiResult<UserResponse> {
    require_admin(&current)?;

    if req.annual.is_none() && req.sick.is_none() && req.casual.is_none() {
        return Err(AppError::validation("No balance values provided."));
    }

    // Balances never go negative by admin edit
    let annual = req.annual.map(|v| v.max(0.0));
    let sick = req.sick.map(|v| v.max(0.0));
    let casual = req.casual.map(|v| v.max(0.0));

    let user = db::users::set_balances(&state.pool, &id, annual, sick, casual)
        .await
        .map_err(internal)?
        .ok_or_else(user_not_found)?;

    let message = format!("Leave balances updated for {}.", user.name);
    Ok(Json(ApiResponse::success_with_message(message, user.into())))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    require_admin(&current)?;

    if id == current.id {
        return Err(AppError::with_message(
            ErrorCode::CannotModifySelf,
            "You cannot delete your own account.",
        ));
    }

    let name = db::users::delete_cascade(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(user_not_found)?;

    Ok(Json(ApiResponse::success_with_message(
        format!("User {name} and all their leave records have been deleted."),
        (),
    )))
}
