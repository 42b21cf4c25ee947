//! Expense reimbursement claims: apply, list, review, stats

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{ClaimStatus, ClaimType};
use shared::query::{PaginatedResponse, page_params};
use shared::util::now_millis;

use super::{ApiResult, internal, visible_scope};
use crate::auth::CurrentUser;
use crate::db;
use crate::db::reimbursements::{Claim, ClaimDetail, ClaimFilter};
use crate::db::stats::ClaimTypeCount;
use crate::ledger;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct ApplyClaimRequest {
    pub claim_type: String,
    pub amount: f64,
    pub description: String,
    pub expense_date: NaiveDate,
    pub receipt_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListClaimsQuery {
    pub status: Option<String>,
    pub claim_type: Option<String>,
    pub employee_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub comment: Option<String>,
}

/// Per-status totals of the claims visible to the caller
#[derive(Debug, Default, Serialize)]
pub struct ClaimStatusSummary {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub pending_amount: f64,
    pub approved_amount: f64,
}

#[derive(Debug, Serialize)]
pub struct ClaimStats {
    pub by_status: ClaimStatusSummary,
    pub by_type: Vec<ClaimTypeCount>,
}

fn parse_claim_type(s: &str) -> Result<ClaimType, AppError> {
    ClaimType::from_db(s).ok_or_else(|| {
        AppError::validation(
            "Reimbursement type must be travel, food, office_supplies, internet, or other.",
        )
    })
}

fn parse_status_filter(s: &str) -> Result<ClaimStatus, AppError> {
    ClaimStatus::from_db(s)
        .ok_or_else(|| AppError::validation("Status must be pending, approved, or rejected."))
}

fn claim_not_found() -> AppError {
    AppError::with_message(ErrorCode::ClaimNotFound, "Reimbursement request not found.")
}

/// POST /api/reimbursements
pub async fn apply(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ApplyClaimRequest>,
) -> ApiResult<ClaimDetail> {
    let claim_type = parse_claim_type(&req.claim_type)?;
    let receipt_url =
        ledger::claim::validate_apply(req.amount, &req.description, req.receipt_url.as_deref())?;

    let claim = Claim {
        id: uuid::Uuid::new_v4().to_string(),
        employee_id: current.id.clone(),
        claim_type: claim_type.as_str().to_string(),
        amount: req.amount,
        description: req.description.trim().to_string(),
        receipt_url,
        expense_date: req.expense_date,
        status: ClaimStatus::Pending.as_str().to_string(),
        reviewed_by: None,
        review_comment: String::new(),
        reviewed_at: None,
        created_at: now_millis(),
    };

    db::reimbursements::insert(&state.pool, &claim)
        .await
        .map_err(internal)?;

    let detail = db::reimbursements::find_detail(&state.pool, &claim.id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    Ok(Json(ApiResponse::success_with_message(
        "Reimbursement request submitted successfully.",
        detail,
    )))
}

/// GET /api/reimbursements
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(q): Query<ListClaimsQuery>,
) -> ApiResult<PaginatedResponse<ClaimDetail>> {
    if let Some(status) = q.status.as_deref() {
        parse_status_filter(status)?;
    }
    if let Some(claim_type) = q.claim_type.as_deref() {
        parse_claim_type(claim_type)?;
    }

    let scope = visible_scope(&state, &current).await?;
    let employee_id = match q.employee_id.as_deref() {
        Some(id) if current.role.can_manage() => Some(id),
        _ => None,
    };

    let (page, limit) = page_params(q.page, q.limit, DEFAULT_PAGE_SIZE);
    let filter = ClaimFilter {
        employee_ids: scope.as_deref(),
        employee_id,
        status: q.status.as_deref(),
        claim_type: q.claim_type.as_deref(),
    };

    let (claims, total) = db::reimbursements::list(&state.pool, &filter, page, limit)
        .await
        .map_err(internal)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        claims, total, page, limit,
    ))))
}

/// GET /api/reimbursements/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<ClaimDetail> {
    let detail = db::reimbursements::find_detail(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(claim_not_found)?;

    let employee = db::users::find_by_id(&state.pool, &detail.employee_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    if !ledger::scope::can_view_record(
        &current.id,
        current.role,
        &detail.employee_id,
        employee.manager_id.as_deref(),
    ) {
        return Err(AppError::permission_denied("Access denied."));
    }

    Ok(Json(ApiResponse::success(detail)))
}

/// PUT /api/reimbursements/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> ApiResult<ClaimDetail> {
    let claim = db::reimbursements::find_by_id(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(claim_not_found)?;

    ledger::claim::ensure_pending(&claim.status, "approve")?;

    let employee = db::users::find_by_id(&state.pool, &claim.employee_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    if !ledger::scope::can_review(&current.id, current.role, employee.manager_id.as_deref()) {
        return Err(AppError::permission_denied(
            "You can only review reimbursements for your direct reports.",
        ));
    }

    let comment = ledger::validate_approve_comment(req.comment.as_deref())?;

    db::reimbursements::mark_reviewed(
        &state.pool,
        &id,
        ClaimStatus::Approved.as_str(),
        &current.id,
        &comment,
        now_millis(),
    )
    .await
    .map_err(internal)?;

    let detail = db::reimbursements::find_detail(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    Ok(Json(ApiResponse::success_with_message(
        format!("Reimbursement approved for {}.", employee.name),
        detail,
    )))
}

/// PUT /api/reimbursements/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> ApiResult<ClaimDetail> {
    let comment = ledger::validate_reject_comment(req.comment.as_deref())?;

    let claim = db::reimbursements::find_by_id(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(claim_not_found)?;

    ledger::claim::ensure_pending(&claim.status, "reject")?;

    let employee = db::users::find_by_id(&state.pool, &claim.employee_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    if !ledger::scope::can_review(&current.id, current.role, employee.manager_id.as_deref()) {
        return Err(AppError::permission_denied(
            "You can only review reimbursements for your direct reports.",
        ));
    }

    db::reimbursements::mark_reviewed(
        &state.pool,
        &id,
        ClaimStatus::Rejected.as_str(),
        &current.id,
        &comment,
        now_millis(),
    )
    .await
    .map_err(internal)?;

    let detail = db::reimbursements::find_detail(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    Ok(Json(ApiResponse::success_with_message(
        "Reimbursement request rejected.",
        detail,
    )))
}

/// GET /api/reimbursements/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<ClaimStats> {
    let scope = visible_scope(&state, &current).await?;

    let by_status = db::stats::claim_status_counts(&state.pool, scope.as_deref())
        .await
        .map_err(internal)?;
    let by_type = db::stats::claim_type_counts(&state.pool, scope.as_deref())
        .await
        .map_err(internal)?;

    Ok(Json(ApiResponse::success(ClaimStats {
        by_status: fold_status_counts(&by_status),
        by_type,
    })))
}

fn fold_status_counts(rows: &[db::stats::ClaimStatusCount]) -> ClaimStatusSummary {
    let mut summary = ClaimStatusSummary::default();
    for row in rows {
        match row.status.as_str() {
            "pending" => {
                summary.pending = row.count;
                summary.pending_amount = row.total_amount;
            }
            "approved" => {
                summary.approved = row.count;
                summary.approved_amount = row.total_amount;
            }
            "rejected" => summary.rejected = row.count,
            _ => {}
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_claim_type_message() {
        assert!(parse_claim_type("office_supplies").is_ok());
        let err = parse_claim_type("gym").unwrap_err();
        assert_eq!(
            err.message,
            "Reimbursement type must be travel, food, office_supplies, internet, or other."
        );
    }

    #[test]
    fn test_fold_status_counts() {
        let rows = vec![
            db::stats::ClaimStatusCount {
                status: "pending".into(),
                count: 3,
                total_amount: 120.0,
            },
            db::stats::ClaimStatusCount {
                status: "approved".into(),
                count: 7,
                total_amount: 560.5,
            },
            db::stats::ClaimStatusCount {
                status: "rejected".into(),
                count: 1,
                total_amount: 40.0,
            },
        ];
        let summary = fold_status_counts(&rows);
        assert_eq!(summary.pending, 3);
        assert_eq!(summary.pending_amount, 120.0);
        assert_eq!(summary.approved, 7);
        assert_eq!(summary.approved_amount, 560.5);
        assert_eq!(summary.rejected, 1);
    }
}
