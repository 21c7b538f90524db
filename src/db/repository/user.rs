use rusqlite::{params, Connection, OptionalExtension, Row};

use super::is_constraint_violation;
use crate::db::DatabaseError;
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, email, hashed_password, full_name, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        hashed_password: row.get(2)?,
        full_name: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Insert a user. A taken email surfaces as `ConstraintViolation`.
pub fn insert_user(conn: &Connection, user: &NewUser) -> Result<User, DatabaseError> {
    conn.execute(
        "INSERT INTO users (email, hashed_password, full_name) VALUES (?1, ?2, ?3)",
        params![user.email, user.hashed_password, user.full_name],
    )
    .map_err(|e| {
        if is_constraint_violation(&e) {
            DatabaseError::ConstraintViolation(format!("email already registered: {}", user.email))
        } else {
            e.into()
        }
    })?;

    let id = conn.last_insert_rowid();
    get_user(conn, id)?.ok_or_else(|| DatabaseError::not_found("user", id))
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], user_from_row).optional()?)
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
    Ok(conn.query_row(&sql, params![email], user_from_row).optional()?)
}
