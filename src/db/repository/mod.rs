//! Repository layer: entity-scoped database operations.
//!
//! Case operations always take the owning user's id; a case that belongs
//! to someone else is indistinguishable from a missing one.

mod case;
mod user;

pub use case::*;
pub use user::*;

/// True when `err` is a SQLite UNIQUE/NOT NULL/FK constraint failure.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
