//! User account model

use serde::{Deserialize, Serialize};

use super::leave::LeaveType;

/// User row as stored in the `users` table
///
/// Never serialized directly: `hashed_password` must not leave the server.
/// Convert to [`UserResponse`] for API output.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    /// employee | manager | admin
    pub role: String,
    pub department: String,
    pub position: String,
    /// Direct manager (self reference), if assigned
    pub manager_id: Option<String>,
    pub balance_annual: f64,
    pub balance_sick: f64,
    pub balance_casual: f64,
    pub balance_unpaid: f64,
    pub avatar: String,
    pub phone: String,
    pub is_active: bool,
    /// Unix millis
    pub joined_date: i64,
    /// Unix millis
    pub created_at: i64,
}

impl User {
    /// Remaining balance for the given leave type
    pub fn balance_for(&self, leave_type: LeaveType) -> f64 {
        match leave_type {
            LeaveType::Annual => self.balance_annual,
            LeaveType::Sick => self.balance_sick,
            LeaveType::Casual => self.balance_casual,
            LeaveType::Unpaid => self.balance_unpaid,
        }
    }

    pub fn leave_balance(&self) -> LeaveBalance {
        LeaveBalance {
            annual: self.balance_annual,
            sick: self.balance_sick,
            casual: self.balance_casual,
            unpaid: self.balance_unpaid,
        }
    }
}

/// The four leave counters of a user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LeaveBalance {
    pub annual: f64,
    pub sick: f64,
    pub casual: f64,
    pub unpaid: f64,
}

/// Public view of a user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: String,
    pub position: String,
    pub manager_id: Option<String>,
    pub leave_balance: LeaveBalance,
    pub avatar: String,
    pub phone: String,
    pub is_active: bool,
    pub joined_date: i64,
    pub created_at: i64,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            leave_balance: user.leave_balance(),
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            department: user.department,
            position: user.position,
            manager_id: user.manager_id,
            avatar: user.avatar,
            phone: user.phone,
            is_active: user.is_active,
            joined_date: user.joined_date,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u1".into(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            hashed_password: "$argon2id$...".into(),
            role: "employee".into(),
            department: "Engineering".into(),
            position: "Developer".into(),
            manager_id: Some("m1".into()),
            balance_annual: 20.0,
            balance_sick: 10.0,
            balance_casual: 5.0,
            balance_unpaid: 999.0,
            avatar: String::new(),
            phone: String::new(),
            is_active: true,
            joined_date: 1_700_000_000_000,
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_balance_for() {
        let user = sample_user();
        assert_eq!(user.balance_for(LeaveType::Annual), 20.0);
        assert_eq!(user.balance_for(LeaveType::Sick), 10.0);
        assert_eq!(user.balance_for(LeaveType::Casual), 5.0);
        assert_eq!(user.balance_for(LeaveType::Unpaid), 999.0);
    }

    #[test]
    fn test_response_hides_password() {
        let response = UserResponse::from(sample_user());
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"leave_balance\""));
    }
}
