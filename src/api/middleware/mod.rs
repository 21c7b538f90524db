//! API middleware stack.
//!
//! Execution order on protected routes (outermost → innermost):
//! 1. Auth validator: bearer JWT → `UserContext`
//! 2. Audit logger: runs after auth, has the user id

pub mod audit;
pub mod auth;
