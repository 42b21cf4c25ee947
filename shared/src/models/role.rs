//! User roles

use serde::{Deserialize, Serialize};

/// Role of a user account
///
/// Stored as TEXT in the database; use [`Role::from_db`] / [`Role::as_str`]
/// for conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Parse a role from its database representation
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "employee" => Some(Self::Employee),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    #[inline]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Managers and admins may see records beyond their own
    #[inline]
    pub fn can_manage(self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_db() {
        assert_eq!(Role::from_db("employee"), Some(Role::Employee));
        assert_eq!(Role::from_db("manager"), Some(Role::Manager));
        assert_eq!(Role::from_db("admin"), Some(Role::Admin));
        assert_eq!(Role::from_db("superuser"), None);
        assert_eq!(Role::from_db(""), None);
    }

    #[test]
    fn test_roundtrip() {
        for role in [Role::Employee, Role::Manager, Role::Admin] {
            assert_eq!(Role::from_db(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_capabilities() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Manager.is_admin());
        assert!(Role::Admin.can_manage());
        assert!(Role::Manager.can_manage());
        assert!(!Role::Employee.can_manage());
    }

    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
