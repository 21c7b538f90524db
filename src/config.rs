use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Application-level constants
pub const APP_NAME: &str = "petmed";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_DATABASE_PATH: &str = "./app.db";
const DEFAULT_KB_ROOT: &str = "./knowledge-base";
const DEV_JWT_SECRET: &str = "CHANGE_ME_IN_ENV";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 60 * 60 * 24;
pub const DEFAULT_PASSWORD_ROUNDS: u32 = 600_000;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "petmed=info,petmed_lib=info,tower_http=info"
}

/// Runtime configuration, resolved once at startup and handed to every
/// component that needs it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    /// Directory holding the knowledge-base documents.
    pub kb_root: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    /// PBKDF2 iteration count for new password hashes.
    pub password_rounds: u32,
}

impl AppConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to their defaults with a warning so a
    /// typo in the environment never prevents startup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("PETMED_BIND_ADDR")
            .and_then(|raw| match raw.parse::<SocketAddr>() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Invalid PETMED_BIND_ADDR, using default");
                    None
                }
            })
            .unwrap_or_else(default_bind_addr);

        let database_path = lookup("PETMED_DATABASE_PATH")
            .or_else(|| lookup("DATABASE_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let kb_root = lookup("KB_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KB_ROOT));

        let jwt_secret = match lookup("PETMED_JWT_SECRET") {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ => {
                tracing::warn!("PETMED_JWT_SECRET not set, using development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let token_ttl_secs = parse_or_default(
            &lookup,
            "PETMED_TOKEN_TTL_SECS",
            DEFAULT_TOKEN_TTL_SECS,
        );
        let password_rounds = parse_or_default(
            &lookup,
            "PETMED_PASSWORD_ROUNDS",
            DEFAULT_PASSWORD_ROUNDS,
        );

        Self {
            bind_addr,
            database_path,
            kb_root,
            jwt_secret,
            token_ttl_secs,
            password_rounds,
        }
    }

    /// Isolated configuration rooted in `dir`: database file inside it,
    /// bundled knowledge base, cheap password hashing.
    pub fn for_tests(dir: &Path) -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_path: dir.join("test.db"),
            kb_root: bundled_kb_root(),
            jwt_secret: "test-secret-with-enough-bytes-for-hs256".to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            password_rounds: 1_000,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid numeric setting, using default");
            default
        }),
        None => default,
    }
}

/// Knowledge base shipped with the crate sources.
pub fn bundled_kb_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("knowledge-base")
}
