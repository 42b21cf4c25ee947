//! Role-based visibility and capability checks
//!
//! - employee: own records only
//! - manager: own records plus direct reports
//! - admin: everything

use shared::models::Role;

/// May `actor` see a record belonging to `employee_id`?
///
/// `employee_manager` is the record owner's assigned manager.
pub fn can_view_record(
    actor_id: &str,
    actor_role: Role,
    employee_id: &str,
    employee_manager: Option<&str>,
) -> bool {
    match actor_role {
        Role::Admin => true,
        Role::Manager => actor_id == employee_id || employee_manager == Some(actor_id),
        Role::Employee => actor_id == employee_id,
    }
}

/// May `actor` approve or reject a request from this employee?
pub fn can_review(actor_id: &str, actor_role: Role, employee_manager: Option<&str>) -> bool {
    match actor_role {
        Role::Admin => true,
        Role::Manager => employee_manager == Some(actor_id),
        Role::Employee => false,
    }
}

/// May `actor` cancel a request belonging to `employee_id`?
///
/// Only the owning employee or an admin; a manager cannot cancel a
/// report's request on their behalf.
pub fn can_cancel(actor_id: &str, actor_role: Role, employee_id: &str) -> bool {
    actor_role == Role::Admin || actor_id == employee_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_sees_only_self() {
        assert!(can_view_record("e1", Role::Employee, "e1", Some("m1")));
        assert!(!can_view_record("e1", Role::Employee, "e2", Some("m1")));
    }

    #[test]
    fn test_manager_sees_team_and_self() {
        assert!(can_view_record("m1", Role::Manager, "e1", Some("m1")));
        assert!(can_view_record("m1", Role::Manager, "m1", None));
        // Not someone else's report
        assert!(!can_view_record("m1", Role::Manager, "e2", Some("m2")));
        assert!(!can_view_record("m1", Role::Manager, "e3", None));
    }

    #[test]
    fn test_admin_sees_everything() {
        assert!(can_view_record("a1", Role::Admin, "e1", Some("m1")));
        assert!(can_view_record("a1", Role::Admin, "e2", None));
    }

    #[test]
    fn test_review_requires_assignment_or_admin() {
        assert!(can_review("m1", Role::Manager, Some("m1")));
        assert!(!can_review("m1", Role::Manager, Some("m2")));
        assert!(!can_review("m1", Role::Manager, None));
        assert!(can_review("a1", Role::Admin, None));
        // An employee can never review, even their own
        assert!(!can_review("e1", Role::Employee, Some("e1")));
    }

    #[test]
    fn test_cancel_owner_or_admin() {
        assert!(can_cancel("e1", Role::Employee, "e1"));
        assert!(!can_cancel("e1", Role::Employee, "e2"));
        // Managers cannot cancel on behalf of reports
        assert!(!can_cancel("m1", Role::Manager, "e1"));
        assert!(can_cancel("a1", Role::Admin, "e1"));
    }
}
