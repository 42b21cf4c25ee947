//! Leave request lifecycle: apply, list, review, cancel, calendar, stats

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{CalendarEvent, CalendarEventProps, HalfDayPeriod, LeaveStatus, LeaveType};
use shared::query::{PaginatedResponse, page_params};
use shared::util::now_millis;

use super::{ApiResult, internal, visible_scope};
use crate::auth::CurrentUser;
use crate::db;
use crate::db::leaves::{Leave, LeaveDetail, LeaveFilter};
use crate::db::stats::TypeCount;
use crate::ledger;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct ApplyLeaveRequest {
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    #[serde(default)]
    pub is_half_day: bool,
    pub half_day_period: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListLeavesQuery {
    pub status: Option<String>,
    pub leave_type: Option<String>,
    pub employee_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub status: Option<String>,
}

/// Per-status totals of the requests visible to the caller
#[derive(Debug, Default, Serialize)]
pub struct LeaveStatusSummary {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub cancelled: i64,
    /// Total days across approved requests
    pub approved_days: f64,
}

#[derive(Debug, Serialize)]
pub struct LeaveStats {
    pub by_status: LeaveStatusSummary,
    pub by_type: Vec<TypeCount>,
}

fn parse_leave_type(s: &str) -> Result<LeaveType, AppError> {
    LeaveType::from_db(s).ok_or_else(|| {
        AppError::validation("Leave type must be annual, sick, casual, or unpaid.")
    })
}

fn parse_status_filter(s: &str) -> Result<LeaveStatus, AppError> {
    LeaveStatus::from_db(s).ok_or_else(|| {
        AppError::validation("Status must be pending, approved, rejected, or cancelled.")
    })
}

fn leave_not_found() -> AppError {
    AppError::with_message(ErrorCode::LeaveNotFound, "Leave request not found.")
}

/// The period only applies to half-day requests; a half-day request may
/// leave it unset.
fn parse_half_day_period(
    is_half_day: bool,
    period: Option<&str>,
) -> Result<Option<HalfDayPeriod>, AppError> {
    match (is_half_day, period) {
        (true, Some(p)) => HalfDayPeriod::from_db(p)
            .map(Some)
            .ok_or_else(|| AppError::validation("Half-day period must be morning or afternoon.")),
        _ => Ok(None),
    }
}

/// Calendar month window; with no month/year the calendar is unwindowed
/// and returns every visible request.
fn calendar_window(
    year: Option<i32>,
    month: Option<u32>,
) -> Result<Option<(NaiveDate, NaiveDate)>, AppError> {
    match (year, month) {
        (Some(year), Some(month)) => ledger::leave::month_window(year, month)
            .map(Some)
            .ok_or_else(|| AppError::validation("Invalid month.")),
        _ => Ok(None),
    }
}

/// POST /api/leaves
pub async fn apply(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ApplyLeaveRequest>,
) -> ApiResult<LeaveDetail> {
    let leave_type = parse_leave_type(&req.leave_type)?;

    // Half-day requests always span exactly one date
    let start = req.start_date;
    let end = if req.is_half_day { start } else { req.end_date };

    let half_day_period = parse_half_day_period(req.is_half_day, req.half_day_period.as_deref())?;

    let today = Utc::now().date_naive();
    ledger::leave::validate_apply(today, start, end, &req.reason)?;
    let total = ledger::leave::total_days(start, end, req.is_half_day);

    if let Some(conflict) =
        db::leaves::find_overlapping(&state.pool, &current.id, start, end)
            .await
            .map_err(internal)?
    {
        return Err(ledger::leave::overlap_error(
            &conflict.status,
            conflict.start_date,
            conflict.end_date,
        ));
    }

    // Balance check against a fresh row, not the token snapshot
    let user = db::users::find_by_id(&state.pool, &current.id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    ledger::leave::check_balance(leave_type, user.balance_for(leave_type), total)?;

    let leave = Leave {
        id: uuid::Uuid::new_v4().to_string(),
        employee_id: current.id.clone(),
        leave_type: leave_type.as_str().to_string(),
        start_date: start,
        end_date: end,
        total_days: total,
        is_half_day: req.is_half_day,
        half_day_period: half_day_period.map(|p| p.as_str().to_string()),
        reason: req.reason.trim().to_string(),
        status: LeaveStatus::Pending.as_str().to_string(),
        reviewed_by: None,
        review_comment: String::new(),
        reviewed_at: None,
        emergency_contact: req.emergency_contact.unwrap_or_default(),
        created_at: now_millis(),
    };

    db::leaves::insert(&state.pool, &leave)
        .await
        .map_err(internal)?;

    let detail = db::leaves::find_detail(&state.pool, &leave.id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    Ok(Json(ApiResponse::success_with_message(
        "Leave application submitted successfully. Awaiting manager approval.",
        detail,
    )))
}

/// GET /api/leaves
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(q): Query<ListLeavesQuery>,
) -> ApiResult<PaginatedResponse<LeaveDetail>> {
    if let Some(status) = q.status.as_deref() {
        parse_status_filter(status)?;
    }
    if let Some(leave_type) = q.leave_type.as_deref() {
        parse_leave_type(leave_type)?;
    }

    let scope = visible_scope(&state, &current).await?;
    // An explicit employee filter only narrows; the scope still applies
    let employee_id = match q.employee_id.as_deref() {
        Some(id) if current.role.can_manage() => Some(id),
        _ => None,
    };

    let (page, limit) = page_params(q.page, q.limit, DEFAULT_PAGE_SIZE);
    let filter = LeaveFilter {
        employee_ids: scope.as_deref(),
        employee_id,
        status: q.status.as_deref(),
        leave_type: q.leave_type.as_deref(),
        department: None,
        from: q.start_date,
        to: q.end_date,
    };

    let (leaves, total) = db::leaves::list(&state.pool, &filter, page, limit)
        .await
        .map_err(internal)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        leaves, total, page, limit,
    ))))
}

/// GET /api/leaves/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<LeaveDetail> {
    let detail = db::leaves::find_detail(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(leave_not_found)?;

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

/// PUT /api/leaves/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> ApiResult<LeaveDetail> {
    let leave = db::leaves::find_by_id(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(leave_not_found)?;

    ledger::leave::ensure_pending(&leave.status, "approve")?;

    let employee = db::users::find_by_id(&state.pool, &leave.employee_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    if !ledger::scope::can_review(&current.id, current.role, employee.manager_id.as_deref()) {
        return Err(AppError::permission_denied(
            "You can only approve leave requests for your direct reports.",
        ));
    }

    let leave_type = LeaveType::from_db(&leave.leave_type)
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    let comment = ledger::validate_approve_comment(req.comment.as_deref())?;

    db::leaves::mark_reviewed(
        &state.pool,
        &id,
        LeaveStatus::Approved.as_str(),
        &current.id,
        &comment,
        now_millis(),
    )
    .await
    .map_err(internal)?;

    if let Some(days) = ledger::leave::approval_deduction(leave_type, leave.total_days) {
        db::users::increment_balance(&state.pool, &leave.employee_id, leave_type, -days)
            .await
            .map_err(internal)?;
    }

    let detail = db::leaves::find_detail(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    Ok(Json(ApiResponse::success_with_message(
        format!("Leave approved for {}.", employee.name),
        detail,
    )))
}

/// PUT /api/leaves/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> ApiResult<LeaveDetail> {
    let comment = ledger::validate_reject_comment(req.comment.as_deref())?;

    let leave = db::leaves::find_by_id(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(leave_not_found)?;

    ledger::leave::ensure_pending(&leave.status, "reject")?;

    let employee = db::users::find_by_id(&state.pool, &leave.employee_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    if !ledger::scope::can_review(&current.id, current.role, employee.manager_id.as_deref()) {
        return Err(AppError::permission_denied(
            "You can only reject leave requests for your direct reports.",
        ));
    }

    db::leaves::mark_reviewed(
        &state.pool,
        &id,
        LeaveStatus::Rejected.as_str(),
        &current.id,
        &comment,
        now_millis(),
    )
    .await
    .map_err(internal)?;

    let detail = db::leaves::find_detail(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    Ok(Json(ApiResponse::success_with_message(
        "Leave request rejected.",
        detail,
    )))
}

/// PUT /api/leaves/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<LeaveDetail> {
    let leave = db::leaves::find_by_id(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(leave_not_found)?;

    if !ledger::scope::can_cancel(&current.id, current.role, &leave.employee_id) {
        return Err(AppError::permission_denied(
            "You can only cancel your own leave requests.",
        ));
    }

    let prior = ledger::leave::ensure_cancellable(&leave.status)?;

    db::leaves::mark_cancelled(&state.pool, &id)
        .await
        .map_err(internal)?;

    // Cancelling an approved request restores the deducted days
    if prior == LeaveStatus::Approved {
        let leave_type = LeaveType::from_db(&leave.leave_type)
            .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;
        if let Some(days) = ledger::leave::approval_deduction(leave_type, leave.total_days) {
            db::users::increment_balance(&state.pool, &leave.employee_id, leave_type, days)
                .await
                .map_err(internal)?;
        }
    }

    let detail = db::leaves::find_detail(&state.pool, &id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    Ok(Json(ApiResponse::success_with_message(
        "Leave request cancelled successfully.",
        detail,
    )))
}

/// GET /api/leaves/my-balance
pub async fn my_balance(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<shared::models::LeaveBalance> {
    let balance = db::users::get_balance(&state.pool, &current.id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(ApiResponse::success(balance)))
}

/// GET /api/leaves/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<LeaveStats> {
    let scope = visible_scope(&state, &current).await?;

    let by_status = db::stats::leave_status_counts(&state.pool, scope.as_deref())
        .await
        .map_err(internal)?;
    let by_type = db::stats::leave_type_counts(&state.pool, scope.as_deref())
        .await
        .map_err(internal)?;

    Ok(Json(ApiResponse::success(LeaveStats {
        by_status: fold_status_counts(&by_status),
        by_type,
    })))
}

fn fold_status_counts(rows: &[db::stats::StatusCount]) -> LeaveStatusSummary {
    let mut summary = LeaveStatusSummary::default();
    for row in rows {
        match row.status.as_str() {
            "pending" => summary.pending = row.count,
            "approved" => {
                summary.approved = row.count;
                summary.approved_days = row.days;
            }
            "rejected" => summary.rejected = row.count,
            "cancelled" => summary.cancelled = row.count,
            _ => {}
        }
    }
    summary
}

/// GET /api/leaves/calendar
pub async fn calendar(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(q): Query<CalendarQuery>,
) -> ApiResult<Vec<CalendarEvent>> {
    if let Some(status) = q.status.as_deref() {
        parse_status_filter(status)?;
    }

    let window = calendar_window(q.year, q.month)?;

    let scope = visible_scope(&state, &current).await?;
    let rows =
        db::leaves::list_for_calendar(&state.pool, scope.as_deref(), q.status.as_deref(), window)
            .await
            .map_err(internal)?;

    let events = rows.iter().map(calendar_event).collect();
    Ok(Json(ApiResponse::success(events)))
}

/// Build a FullCalendar-style event from a leave row. The `end` date is
/// exclusive, so a single-day leave renders as one day, not zero.
fn calendar_event(row: &LeaveDetail) -> CalendarEvent {
    let status = LeaveStatus::from_db(&row.status).unwrap_or(LeaveStatus::Pending);
    let label = LeaveType::from_db(&row.leave_type)
        .map(|t| t.label())
        .unwrap_or("Leave");
    let color = status.color();

    CalendarEvent {
        id: row.id.clone(),
        title: format!("{} - {}", row.employee_name, label),
        start: row.start_date,
        end: row.end_date + Duration::days(1),
        background_color: color.to_string(),
        border_color: color.to_string(),
        text_color: "#ffffff".to_string(),
        extended_props: CalendarEventProps {
            employee_id: row.employee_id.clone(),
            employee_name: row.employee_name.clone(),
            leave_type: row.leave_type.clone(),
            status: row.status.clone(),
            reason: row.reason.clone(),
            total_days: row.total_days,
            review_comment: row.review_comment.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn detail_row() -> LeaveDetail {
        LeaveDetail {
            id: "l1".into(),
            employee_id: "u1".into(),
            employee_name: "Alice".into(),
            employee_email: "alice@example.com".into(),
            employee_department: "Engineering".into(),
            leave_type: "annual".into(),
            start_date: d(2026, 3, 2),
            end_date: d(2026, 3, 4),
            total_days: 3.0,
            is_half_day: false,
            half_day_period: None,
            reason: "Family trip".into(),
            status: "approved".into(),
            reviewed_by: Some("m1".into()),
            reviewer_name: Some("Bob".into()),
            review_comment: "Approved".into(),
            reviewed_at: Some(1),
            emergency_contact: String::new(),
            created_at: 1,
        }
    }

    #[test]
    fn test_calendar_event_exclusive_end() {
        let event = calendar_event(&detail_row());
        assert_eq!(event.start, d(2026, 3, 2));
        // Last day of leave is the 4th; the event ends on the 5th
        assert_eq!(event.end, d(2026, 3, 5));
        assert_eq!(event.title, "Alice - Annual");
        assert_eq!(event.background_color, "#10B981");
        assert_eq!(event.text_color, "#ffffff");
    }

    #[test]
    fn test_calendar_event_single_day() {
        let mut row = detail_row();
        row.end_date = row.start_date;
        row.status = "pending".into();
        let event = calendar_event(&row);
        assert_eq!(event.end, d(2026, 3, 3));
        assert_eq!(event.background_color, "#F59E0B");
    }

    #[test]
    fn test_fold_status_counts() {
        let rows = vec![
            db::stats::StatusCount {
                status: "pending".into(),
                count: 2,
                days: 4.0,
            },
            db::stats::StatusCount {
                status: "approved".into(),
                count: 5,
                days: 12.5,
            },
        ];
        let summary = fold_status_counts(&rows);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.approved, 5);
        assert_eq!(summary.approved_days, 12.5);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.cancelled, 0);
    }

    #[test]
    fn test_parse_leave_type_message() {
        let err = parse_leave_type("maternity").unwrap_err();
        assert_eq!(
            err.message,
            "Leave type must be annual, sick, casual, or unpaid."
        );
    }

    #[test]
    fn test_calendar_window_absent_means_no_window() {
        // No month/year filter: every visible request is returned
        assert_eq!(calendar_window(None, None).unwrap(), None);
        assert_eq!(calendar_window(Some(2026), None).unwrap(), None);
        assert_eq!(calendar_window(None, Some(3)).unwrap(), None);
    }

    #[test]
    fn test_calendar_window_explicit_month() {
        assert_eq!(
            calendar_window(Some(2026), Some(2)).unwrap(),
            Some((d(2026, 2, 1), d(2026, 2, 28)))
        );
        assert!(calendar_window(Some(2026), Some(13)).is_err());
    }

    #[test]
    fn test_half_day_period_not_invented() {
        // Unset stays unset; no default period is fabricated
        assert_eq!(parse_half_day_period(true, None).unwrap(), None);
        assert_eq!(
            parse_half_day_period(true, Some("afternoon")).unwrap(),
            Some(HalfDayPeriod::Afternoon)
        );
        assert!(parse_half_day_period(true, Some("evening")).is_err());
        // Ignored entirely for whole-day requests
        assert_eq!(parse_half_day_period(false, Some("morning")).unwrap(), None);
    }
}
