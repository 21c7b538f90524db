//! Account endpoints.
//!
//! `POST /auth/signup`: create a user
//! `POST /auth/login`: exchange credentials for a bearer token

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::{self, AuthError, MIN_PASSWORD_LEN};
use crate::db::{self, DatabaseError};
use crate::models::NewUser;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// `POST /auth/signup`
pub async fn signup(
    State(ctx): State<ApiContext>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = body?;
    let email = normalize_email(&request.email)?;
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let conn = ctx.open_db()?;
    if db::get_user_by_email(&conn, &email)?.is_some() {
        return Err(ApiError::EmailTaken);
    }

    // Hashing runs on the blocking pool.
    let rounds = ctx.config.password_rounds;
    let password = request.password;
    let hashed_password = tokio::task::spawn_blocking(move || auth::hash_password(&password, rounds))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let user = db::insert_user(
        &conn,
        &NewUser {
            email,
            hashed_password,
            full_name: request.full_name.filter(|n| !n.trim().is_empty()),
        },
    )
    .map_err(|e| match e {
        DatabaseError::ConstraintViolation(_) => ApiError::EmailTaken,
        other => other.into(),
    })?;

    tracing::info!(user_id = user.id, "User registered");
    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
    }))
}

/// `POST /auth/login`
///
/// Unknown email and wrong password produce the same response.
pub async fn login(
    State(ctx): State<ApiContext>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = body?;
    let email = request.email.trim().to_lowercase();
    let conn = ctx.open_db()?;

    let Some(user) = db::get_user_by_email(&conn, &email)? else {
        tracing::warn!("Login failed: unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    let stored = user.hashed_password.clone();
    let password = request.password;
    let verified = tokio::task::spawn_blocking(move || auth::verify_password(&password, &stored))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if let Err(e) = verified {
        if matches!(e, AuthError::InvalidCredentials) {
            tracing::warn!(user_id = user.id, "Login failed: wrong password");
        }
        return Err(e.into());
    }

    let access_token = auth::issue_token(
        &ctx.config.jwt_secret,
        ctx.config.token_ttl_secs,
        user.id,
        &user.email,
    )?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// Trim and lowercase; reject anything that is not `local@domain.tld`.
fn normalize_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(ApiError::BadRequest("Invalid email address".into()))
    }
}
