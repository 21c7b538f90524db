//! Shared types for the HTTP API layer.

use std::sync::Arc;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::config::AppConfig;
use crate::db;
use crate::knowledge::{KnowledgeBase, Locale};

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared, immutable context for all routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<AppConfig>,
}

impl ApiContext {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Open a request-scoped connection. Connections are never shared
    /// between requests.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        Ok(db::open_database(&self.config.database_path)?)
    }

    pub fn kb(&self) -> KnowledgeBase {
        KnowledgeBase::new(&self.config.kb_root)
    }
}

// ═══════════════════════════════════════════════════════════
// User context: injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated caller, injected into request extensions by the auth
/// middleware after the bearer token validated.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: i64,
    pub email: String,
}

/// Parse an optional `locale` query value. Absent means `zh`.
pub fn parse_locale(raw: Option<&str>) -> Result<Locale, ApiError> {
    match raw {
        None => Ok(Locale::default()),
        Some(value) => value.parse().map_err(ApiError::BadRequest),
    }
}
