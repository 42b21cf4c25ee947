//! Shared types for LeaveDesk
//!
//! Domain models, the unified error system, and pagination types used by
//! the server and any future clients.

pub mod error;
pub mod models;
pub mod query;
pub mod util;
