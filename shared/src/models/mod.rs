//! Domain models for LeaveDesk

pub mod leave;
pub mod reimbursement;
pub mod role;
pub mod user;

pub use leave::{CalendarEvent, CalendarEventProps, HalfDayPeriod, LeaveStatus, LeaveType};
pub use reimbursement::{ClaimStatus, ClaimType};
pub use role::Role;
pub use user::{LeaveBalance, User, UserResponse};
