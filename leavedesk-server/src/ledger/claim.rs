//! Reimbursement claim rules

use shared::error::{AppError, ErrorCode};
use shared::models::ClaimStatus;

pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Validate a new claim; returns the receipt handle on success.
pub fn validate_apply(
    amount: f64,
    description: &str,
    receipt_url: Option<&str>,
) -> Result<String, AppError> {
    if !(amount > 0.0) {
        return Err(AppError::validation("Amount must be greater than zero."));
    }
    if description.trim().is_empty() {
        return Err(AppError::validation("Description is required."));
    }
    if description.len() > MAX_DESCRIPTION_LEN {
        return Err(AppError::validation(
            "Description cannot exceed 500 characters.",
        ));
    }
    match receipt_url.map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url.to_string()),
        _ => Err(AppError::new(ErrorCode::ReceiptRequired)),
    }
}

/// A review (approve/reject) is only legal on a pending claim; claims are
/// terminal once reviewed.
pub fn ensure_pending(status: &str, action: &str) -> Result<(), AppError> {
    let parsed =
        ClaimStatus::from_db(status).ok_or_else(|| AppError::new(ErrorCode::InternalError))?;
    if parsed != ClaimStatus::Pending {
        return Err(AppError::with_message(
            ErrorCode::InvalidClaimTransition,
            format!("Cannot {action} a reimbursement that is already {status}."),
        ));
    }
    Ok(())
}
