use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// JWT claims. `sub` carries the email, `uid` the user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Issue an HS256 token valid for `ttl_secs`.
pub fn issue_token(secret: &str, ttl_secs: u64, uid: i64, email: &str) -> Result<String, AuthError> {
    issue_token_at(secret, Utc::now().timestamp(), ttl_secs, uid, email)
}

fn issue_token_at(
    secret: &str,
    now: i64,
    ttl_secs: u64,
    uid: i64,
    email: &str,
) -> Result<String, AuthError> {
    let ttl = i64::try_from(ttl_secs).map_err(|e| AuthError::Encode(e.to_string()))?;
    let claims = Claims {
        sub: email.to_string(),
        uid,
        iat: now,
        exp: now.saturating_add(ttl),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Encode(e.to_string()))
}

/// Decode and validate signature and expiry.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken(e.to_string()),
    })
}

#[cfg(test)]
pub(crate) fn expired_token(secret: &str, uid: i64, email: &str) -> String {
    // Well past the default validation leeway.
    issue_token_at(secret, Utc::now().timestamp() - 3_600, 60, uid, email).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn issue_then_verify() {
        let token = issue_token(SECRET, 3_600, 7, "vet@example.com").unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "vet@example.com");
        assert_eq!(claims.uid, 7);
        assert_eq!(claims.exp - claims.iat, 3_600);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = issue_token(SECRET, 3_600, 7, "vet@example.com").unwrap();
        assert!(matches!(
            verify_token("other-secret", &token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let token = expired_token(SECRET, 7, "vet@example.com");
        assert!(matches!(verify_token(SECRET, &token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            verify_token(SECRET, "not.a.jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
