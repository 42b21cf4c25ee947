//! API routes for leavedesk-server

pub mod admin;
pub mod auth;
pub mod health;
pub mod leave;
pub mod reimbursement;
pub mod user;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router, middleware};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::Role;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{CurrentUser, user_auth_middleware};
use crate::db;
use crate::state::AppState;

/// Handler result: enveloped payload or an error response
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Log an unexpected failure and surface it as an opaque internal error
pub(crate) fn internal<E: std::fmt::Display>(e: E) -> AppError {
    tracing::error!("internal error: {e}");
    AppError::new(ErrorCode::InternalError)
}

/// Employee IDs visible to this user.
///
/// `None` means unrestricted (admin). Managers see their direct reports
/// plus themselves; employees see only themselves.
pub(crate) async fn visible_scope(
    state: &AppState,
    user: &CurrentUser,
) -> Result<Option<Vec<String>>, AppError> {
    match user.role {
        Role::Admin => Ok(None),
        Role::Manager => {
            let mut ids = db::users::team_member_ids(&state.pool, &user.id)
                .await
                .map_err(internal)?;
            ids.push(user.id.clone());
            Ok(Some(ids))
        }
        Role::Employee => Ok(Some(vec![user.id.clone()])),
    }
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Public: registration and login only
    let public = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    // Everything else requires a valid bearer token
    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/profile", put(auth::update_profile))
        .route("/api/auth/change-password", put(auth::change_password))
        .route("/api/leaves", post(leave::apply).get(leave::list))
        .route("/api/leaves/calendar", get(leave::calendar))
        .route("/api/leaves/my-balance", get(leave::my_balance))
        .route("/api/leaves/stats", get(leave::stats))
        .route("/api/leaves/{id}", get(leave::get_by_id))
        .route("/api/leaves/{id}/approve", put(leave::approve))
        .route("/api/leaves/{id}/reject", put(leave::reject))
        .route("/api/leaves/{id}/cancel", put(leave::cancel))
        .route(
            "/api/reimbursements",
            post(reimbursement::apply).get(reimbursement::list),
        )
        .route("/api/reimbursements/stats", get(reimbursement::stats))
        .route("/api/reimbursements/{id}", get(reimbursement::get_by_id))
        .route(
            "/api/reimbursements/{id}/approve",
            put(reimbursement::approve),
        )
        .route("/api/reimbursements/{id}/reject", put(reimbursement::reject))
        .route("/api/users", get(user::list))
        .route("/api/users/managers", get(user::managers))
        .route("/api/users/{id}", get(user::get_by_id).put(user::update))
        .route("/api/users/{id}/leaves", get(user::leaves))
        .route("/api/admin/stats", get(admin::dashboard_stats))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/{id}/role", put(admin::change_role))
        .route("/api/admin/users/{id}/toggle", put(admin::toggle_active))
        .route(
            "/api/admin/users/{id}/assign-manager",
            put(admin::assign_manager),
        )
        .route(
            "/api/admin/users/{id}/leave-balance",
            put(admin::adjust_balance),
        )
        .route("/api/admin/users/{id}", delete(admin::delete_user))
        .route("/api/admin/leaves", get(admin::list_leaves))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            user_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(public)
        .merge(protected)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
