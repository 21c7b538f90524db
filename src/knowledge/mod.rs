//! Symptom knowledge base: decision tree + prompt catalog.
//!
//! Documents are read from disk on every call. Nothing here caches or
//! mutates loaded data, so each request works on its own parsed copy.

pub mod payload;
pub mod store;
pub mod types;
pub mod validate;

pub use payload::{transform, TransformedNode, TreePayload};
pub use store::KnowledgeBase;
pub use types::{Locale, Node, PromptCatalog, PromptText, ResolvedPrompt, TreeDocument};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KbError {
    #[error("Knowledge base file not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse {file}: {reason}")]
    Parse { file: String, reason: String },

    #[error("Knowledge base structure violated: {0}")]
    StructuralViolation(String),
}
