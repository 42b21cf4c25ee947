//! Database access, one module per table

pub mod leaves;
pub mod reimbursements;
pub mod stats;
pub mod users;
