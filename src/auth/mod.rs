//! Password hashing and bearer tokens.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, MIN_PASSWORD_LEN};
pub use token::{issue_token, verify_token, Claims};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Token encoding failed: {0}")]
    Encode(String),
}
