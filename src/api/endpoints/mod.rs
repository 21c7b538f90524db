//! API endpoint handlers.

pub mod analyze;
pub mod auth;
pub mod cases;
pub mod health;
pub mod vomiting;
