//! Leave lifecycle rules: duration arithmetic, apply validation, the
//! status state machine, and balance accounting.

use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use shared::models::{LeaveStatus, LeaveType};
use shared::util::fmt_days;

pub const MIN_REASON_LEN: usize = 10;
pub const MAX_REASON_LEN: usize = 500;

/// Total days covered by a request.
///
/// Whole-day requests count both endpoints (Mon..Wed = 3 days); half-day
/// requests are always 0.5 regardless of dates.
pub fn total_days(start: NaiveDate, end: NaiveDate, is_half_day: bool) -> f64 {
    if is_half_day {
        return 0.5;
    }
    (end - start).num_days() as f64 + 1.0
}

/// Validate the date range and reason of a new application.
pub fn validate_apply(
    today: NaiveDate,
    start: NaiveDate,
    end: NaiveDate,
    reason: &str,
) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::validation("End date cannot be before start date."));
    }
    if start < today {
        return Err(AppError::validation(
            "Leave start date cannot be in the past.",
        ));
    }
    // Bounds are in characters, not bytes
    let reason_chars = reason.trim().chars().count();
    if reason_chars < MIN_REASON_LEN {
        return Err(AppError::validation(
            "Reason must be at least 10 characters.",
        ));
    }
    if reason_chars > MAX_REASON_LEN {
        return Err(AppError::validation("Reason cannot exceed 500 characters."));
    }
    Ok(())
}

/// Error for an application that overlaps an existing pending/approved
/// request. Names the conflicting status and date range.
pub fn overlap_error(status: &str, start: NaiveDate, end: NaiveDate) -> AppError {
    AppError::with_message(
        ErrorCode::LeaveOverlap,
        format!(
            "You already have a {status} leave request from {} to {} overlapping these dates.",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        ),
    )
}

/// Check the available balance against the requested days.
///
/// Unpaid leave is exempt: its balance is treated as unlimited.
pub fn check_balance(
    leave_type: LeaveType,
    available: f64,
    requested: f64,
) -> Result<(), AppError> {
    if leave_type == LeaveType::Unpaid {
        return Ok(());
    }
    if available < requested {
        return Err(AppError::with_message(
            ErrorCode::InsufficientBalance,
            format!(
                "Insufficient {} leave balance. Available: {} day(s), Requested: {} day(s).",
                leave_type.as_str(),
                fmt_days(available),
                fmt_days(requested),
            ),
        ));
    }
    Ok(())
}

/// A review (approve/reject) is only legal on a pending request.
pub fn ensure_pending(status: &str, action: &str) -> Result<(), AppError> {
    let parsed =
        LeaveStatus::from_db(status).ok_or_else(|| AppError::new(ErrorCode::InternalError))?;
    if parsed != LeaveStatus::Pending {
        return Err(AppError::with_message(
            ErrorCode::InvalidLeaveTransition,
            format!("Cannot {action} a leave request that is already {status}."),
        ));
    }
    Ok(())
}

/// Cancellation is legal on pending and approved requests; returns the
/// prior status so the caller knows whether a balance restore is due.
pub fn ensure_cancellable(status: &str) -> Result<LeaveStatus, AppError> {
    let parsed =
        LeaveStatus::from_db(status).ok_or_else(|| AppError::new(ErrorCode::InternalError))?;
    match parsed {
        LeaveStatus::Pending | LeaveStatus::Approved => Ok(parsed),
        _ => Err(AppError::with_message(
            ErrorCode::InvalidLeaveTransition,
            format!("Cannot cancel a leave request that is already {status}."),
        )),
    }
}

/// Days to deduct from the employee's balance when a request is approved,
/// or `None` when the type carries no balance (unpaid).
///
/// The same amount is restored when an approved request is cancelled.
pub fn approval_deduction(leave_type: LeaveType, total_days: f64) -> Option<f64> {
    if leave_type == LeaveType::Unpaid {
        None
    } else {
        Some(total_days)
    }
}

/// Inclusive [first, last] day pair for a calendar month.
pub fn month_window(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_total_days_inclusive() {
        // Mon 2026-03-02 .. Wed 2026-03-04
        assert_eq!(total_days(d(2026, 3, 2), d(2026, 3, 4), false), 3.0);
        // Single day
        assert_eq!(total_days(d(2026, 3, 2), d(2026, 3, 2), false), 1.0);
        // Across a month boundary
        assert_eq!(total_days(d(2026, 1, 30), d(2026, 2, 2), false), 4.0);
    }

    #[test]
    fn test_total_days_half_day() {
        assert_eq!(total_days(d(2026, 3, 2), d(2026, 3, 2), true), 0.5);
        // Half-day ignores the span entirely; the caller forces end = start
        assert_eq!(total_days(d(2026, 3, 2), d(2026, 3, 9), true), 0.5);
    }

    #[test]
    fn test_validate_apply_date_order() {
        let today = d(2026, 3, 1);
        let err = validate_apply(today, d(2026, 3, 10), d(2026, 3, 5), "A valid reason here")
            .unwrap_err();
        assert_eq!(err.message, "End date cannot be before start date.");
    }

    #[test]
    fn test_validate_apply_past_start() {
        let today = d(2026, 3, 10);
        let err = validate_apply(today, d(2026, 3, 9), d(2026, 3, 12), "A valid reason here")
            .unwrap_err();
        assert_eq!(err.message, "Leave start date cannot be in the past.");
        // Starting today is fine
        assert!(validate_apply(today, today, d(2026, 3, 12), "A valid reason here").is_ok());
    }

    #[test]
    fn test_validate_apply_reason_length() {
        let today = d(2026, 3, 1);
        let err = validate_apply(today, d(2026, 3, 2), d(2026, 3, 3), "short").unwrap_err();
        assert_eq!(err.message, "Reason must be at least 10 characters.");

        let long = "x".repeat(501);
        let err = validate_apply(today, d(2026, 3, 2), d(2026, 3, 3), &long).unwrap_err();
        assert_eq!(err.message, "Reason cannot exceed 500 characters.");

        assert!(validate_apply(today, d(2026, 3, 2), d(2026, 3, 3), &"x".repeat(500)).is_ok());
    }

    #[test]
    fn test_reason_bounds_count_chars_not_bytes() {
        let today = d(2026, 3, 1);
        // 9 characters, 27 bytes: short even though the byte length is not
        let nine_chars = "家族旅行のため休み";
        let err =
            validate_apply(today, d(2026, 3, 2), d(2026, 3, 3), nine_chars).unwrap_err();
        assert_eq!(err.message, "Reason must be at least 10 characters.");

        // 12 characters passes
        let twelve_chars = "家族旅行のための休みです";
        assert!(validate_apply(today, d(2026, 3, 2), d(2026, 3, 3), twelve_chars).is_ok());

        // 500 multibyte characters is still within the maximum
        assert!(validate_apply(today, d(2026, 3, 2), d(2026, 3, 3), &"あ".repeat(500)).is_ok());
        assert!(validate_apply(today, d(2026, 3, 2), d(2026, 3, 3), &"あ".repeat(501)).is_err());
    }

    #[test]
    fn test_overlap_error_names_conflict() {
        let err = overlap_error("approved", d(2026, 3, 2), d(2026, 3, 4));
        assert_eq!(err.code, ErrorCode::LeaveOverlap);
        assert_eq!(
            err.message,
            "You already have a approved leave request from 2026-03-02 to 2026-03-04 overlapping these dates."
        );
    }

    #[test]
    fn test_check_balance_insufficient() {
        let err = check_balance(LeaveType::Casual, 2.0, 5.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientBalance);
        assert_eq!(
            err.message,
            "Insufficient casual leave balance. Available: 2 day(s), Requested: 5 day(s)."
        );
    }

    #[test]
    fn test_check_balance_half_day_formatting() {
        let err = check_balance(LeaveType::Annual, 0.5, 2.0).unwrap_err();
        assert_eq!(
            err.message,
            "Insufficient annual leave balance. Available: 0.5 day(s), Requested: 2 day(s)."
        );
    }

    #[test]
    fn test_check_balance_exact_fit() {
        assert!(check_balance(LeaveType::Annual, 5.0, 5.0).is_ok());
    }

    #[test]
    fn test_check_balance_unpaid_exempt() {
        assert!(check_balance(LeaveType::Unpaid, 0.0, 30.0).is_ok());
    }

    #[test]
    fn test_ensure_pending() {
        assert!(ensure_pending("pending", "approve").is_ok());

        let err = ensure_pending("approved", "approve").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidLeaveTransition);
        assert_eq!(
            err.message,
            "Cannot approve a leave request that is already approved."
        );

        let err = ensure_pending("cancelled", "reject").unwrap_err();
        assert_eq!(
            err.message,
            "Cannot reject a leave request that is already cancelled."
        );
    }

    #[test]
    fn test_ensure_cancellable() {
        assert_eq!(ensure_cancellable("pending").unwrap(), LeaveStatus::Pending);
        assert_eq!(
            ensure_cancellable("approved").unwrap(),
            LeaveStatus::Approved
        );

        let err = ensure_cancellable("rejected").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidLeaveTransition);
        assert!(ensure_cancellable("cancelled").is_err());
    }

    #[test]
    fn test_deduction_restoration_symmetry() {
        // What approval deducts, cancellation restores
        for ty in [LeaveType::Annual, LeaveType::Sick, LeaveType::Casual] {
            assert_eq!(approval_deduction(ty, 3.0), Some(3.0));
            assert_eq!(approval_deduction(ty, 0.5), Some(0.5));
        }
        assert_eq!(approval_deduction(LeaveType::Unpaid, 10.0), None);
    }

    #[test]
    fn test_month_window() {
        assert_eq!(
            month_window(2026, 2),
            Some((d(2026, 2, 1), d(2026, 2, 28)))
        );
        // Leap year
        assert_eq!(
            month_window(2028, 2),
            Some((d(2028, 2, 1), d(2028, 2, 29)))
        );
        // December wraps the year
        assert_eq!(
            month_window(2026, 12),
            Some((d(2026, 12, 1), d(2026, 12, 31)))
        );
        assert_eq!(month_window(2026, 13), None);
    }
}
