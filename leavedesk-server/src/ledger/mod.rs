//! Pure decision logic for the leave and expense ledgers
//!
//! Everything here is side-effect free: handlers load the rows, these
//! functions decide, the db layer applies the outcome. That keeps the
//! lifecycle rules testable without a database.

pub mod claim;
pub mod leave;
pub mod scope;

use shared::error::{AppError, ErrorCode};

/// Minimum length of a trimmed rejection comment
pub const MIN_REJECT_COMMENT_LEN: usize = 5;
/// Maximum length of any review comment
pub const MAX_REVIEW_COMMENT_LEN: usize = 300;

/// Validate the comment supplied with a rejection; returns the trimmed
/// comment on success.
pub fn validate_reject_comment(comment: Option<&str>) -> Result<String, AppError> {
    let trimmed = comment.unwrap_or("").trim();
    if trimmed.len() < MIN_REJECT_COMMENT_LEN {
        return Err(AppError::with_message(
            ErrorCode::ValidationFailed,
            "A reason for rejection is required (minimum 5 characters).",
        ));
    }
    if trimmed.len() > MAX_REVIEW_COMMENT_LEN {
        return Err(AppError::validation(
            "Comment cannot exceed 300 characters.",
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate the optional comment supplied with an approval; empty or
/// missing comments fall back to "Approved".
pub fn validate_approve_comment(comment: Option<&str>) -> Result<String, AppError> {
    let trimmed = comment.unwrap_or("").trim();
    if trimmed.len() > MAX_REVIEW_COMMENT_LEN {
        return Err(AppError::validation(
            "Comment cannot exceed 300 characters.",
        ));
    }
    if trimmed.is_empty() {
        return Ok("Approved".to_string());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_comment_required() {
        assert!(validate_reject_comment(None).is_err());
        assert!(validate_reject_comment(Some("")).is_err());
        assert!(validate_reject_comment(Some("no")).is_err());
        // Whitespace does not count toward the minimum
        assert!(validate_reject_comment(Some("  ab  ")).is_err());
    }

    #[test]
    fn test_reject_comment_trimmed() {
        let comment = validate_reject_comment(Some("  too many absences  ")).unwrap();
        assert_eq!(comment, "too many absences");
    }

    #[test]
    fn test_review_comment_max_length() {
        let long = "x".repeat(301);
        assert!(validate_reject_comment(Some(&long)).is_err());
        assert!(validate_approve_comment(Some(&long)).is_err());
        assert!(validate_reject_comment(Some(&"x".repeat(300))).is_ok());
    }

    #[test]
    fn test_approve_comment_defaults() {
        assert_eq!(validate_approve_comment(None).unwrap(), "Approved");
        assert_eq!(validate_approve_comment(Some("   ")).unwrap(), "Approved");
        assert_eq!(
            validate_approve_comment(Some(" Enjoy! ")).unwrap(),
            "Enjoy!"
        );
    }
}
