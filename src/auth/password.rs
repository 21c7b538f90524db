use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Params, Pbkdf2};
use rand::RngCore;

use super::AuthError;

pub const MIN_PASSWORD_LEN: usize = 8;
const SALT_LENGTH: usize = 16;
const OUTPUT_LENGTH: usize = 32;

/// Hash a password as a PBKDF2-SHA256 PHC string.
pub fn hash_password(password: &str, rounds: u32) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hash(e.to_string()))?;

    let params = Params {
        rounds,
        output_length: OUTPUT_LENGTH,
    };
    Pbkdf2
        .hash_password_customized(password.as_bytes(), None, None, params, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Check a password against a stored PHC string. The round count is read
/// from the hash, so older hashes keep verifying after a config change.
pub fn verify_password(password: &str, stored: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::Hash(e.to_string()))?;
    Pbkdf2
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|e| match e {
            pbkdf2::password_hash::Error::Password => AuthError::InvalidCredentials,
            other => AuthError::Hash(other.to_string()),
        })
}
