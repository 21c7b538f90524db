//! Knowledge base document loading.
//!
//! Layout under the configured root:
//! `vomiting/data/vomiting.json` (tree) and `vomiting/data/prompts.yaml`
//! (prompt catalog).

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::types::{PromptCatalog, PromptText, TreeDocument};
use super::KbError;

const TOPIC_DIR: &str = "vomiting";
const TREE_FILE: &str = "vomiting.json";
const PROMPTS_FILE: &str = "prompts.yaml";

/// Handle on a knowledge base directory. Cheap to clone; holds no
/// loaded data.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    root: PathBuf,
}

/// Raw shape of `prompts.yaml`.
#[derive(Debug, Default, Deserialize)]
struct PromptDocument {
    #[serde(default)]
    prompts: Vec<PromptEntry>,
}

#[derive(Debug, Deserialize)]
struct PromptEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    zh: Option<String>,
    #[serde(default)]
    en: Option<String>,
}

impl KnowledgeBase {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tree_path(&self) -> PathBuf {
        self.root.join(TOPIC_DIR).join("data").join(TREE_FILE)
    }

    pub fn prompts_path(&self) -> PathBuf {
        self.root.join(TOPIC_DIR).join("data").join(PROMPTS_FILE)
    }

    /// Load and parse the decision tree.
    pub fn load_tree(&self) -> Result<TreeDocument, KbError> {
        let raw = read_document(&self.tree_path())?;
        serde_json::from_str(&raw).map_err(|e| KbError::Parse {
            file: TREE_FILE.into(),
            reason: e.to_string(),
        })
    }

    /// Load the prompt catalog. Entries without an `id` are skipped.
    pub fn load_prompts(&self) -> Result<PromptCatalog, KbError> {
        let raw = read_document(&self.prompts_path())?;
        parse_prompts(&raw)
    }
}

fn read_document(path: &Path) -> Result<String, KbError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => KbError::NotFound(path.display().to_string()),
        _ => KbError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        },
    })
}

fn parse_prompts(raw: &str) -> Result<PromptCatalog, KbError> {
    if raw.trim().is_empty() {
        return Ok(PromptCatalog::default());
    }
    let doc: Option<PromptDocument> = serde_yaml::from_str(raw).map_err(|e| KbError::Parse {
        file: PROMPTS_FILE.into(),
        reason: e.to_string(),
    })?;

    let mut entries = HashMap::new();
    for entry in doc.unwrap_or_default().prompts {
        let Some(id) = entry.id.filter(|id| !id.is_empty()) else {
            continue;
        };
        entries.insert(
            id,
            PromptText {
                zh: entry.zh.unwrap_or_default(),
                en: entry.en.unwrap_or_default(),
            },
        );
    }
    Ok(PromptCatalog::new(entries))
}
