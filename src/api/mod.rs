//! HTTP API.
//!
//! Public routes serve health, accounts and the triage knowledge base.
//! Case routes are protected by a middleware stack: Auth → Audit → Handler.
//!
//! The router is composable: `api_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, start_server_on, ApiServer, ServerSession};
pub use types::ApiContext;
