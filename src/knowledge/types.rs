use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::KbError;

/// Id the first child of the root must carry.
pub const TRIAGE_NODE_ID: &str = "triage";

// ═══════════════════════════════════════════
// Locale
// ═══════════════════════════════════════════

/// Display language for labels and prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zh => "zh",
            Self::En => "en",
        }
    }

    /// Pick the matching half of a bilingual pair.
    pub fn pick<'a>(&self, zh: &'a str, en: &'a str) -> &'a str {
        match self {
            Self::Zh => zh,
            Self::En => en,
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" => Ok(Self::Zh),
            "en" => Ok(Self::En),
            other => Err(format!("Unsupported locale: {other}")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════
// Decision tree
// ═══════════════════════════════════════════

/// Parsed tree document (`vomiting.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDocument {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    pub root: Node,
}

/// One diagnostic category or triage branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub label_zh: String,
    #[serde(default)]
    pub label_en: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub questions_ref: Vec<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Direct child with the given id.
    pub fn child(&self, id: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.id == id)
    }

    /// Label for `locale`. `zh` is returned verbatim even when empty;
    /// any other locale falls back to `label_zh` when `label_en` is empty.
    pub fn label(&self, locale: Locale) -> &str {
        match locale {
            Locale::Zh => &self.label_zh,
            Locale::En if self.label_en.is_empty() => &self.label_zh,
            Locale::En => &self.label_en,
        }
    }
}

impl TreeDocument {
    /// The `triage` node, which must be the root's first child.
    pub fn triage_node(&self) -> Result<&Node, KbError> {
        let first = self.root.children.first().ok_or_else(|| {
            KbError::StructuralViolation("root.children is empty".into())
        })?;
        if first.id != TRIAGE_NODE_ID {
            return Err(KbError::StructuralViolation(format!(
                "first child of root must be '{TRIAGE_NODE_ID}', found '{}'",
                first.id
            )));
        }
        Ok(first)
    }
}

// ═══════════════════════════════════════════
// Prompt catalog
// ═══════════════════════════════════════════

/// Bilingual question text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptText {
    pub zh: String,
    pub en: String,
}

/// A question id resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrompt {
    pub id: String,
    pub text: String,
    pub text_zh: String,
    pub text_en: String,
}

/// Question id → bilingual text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptCatalog {
    entries: HashMap<String, PromptText>,
}

impl PromptCatalog {
    pub fn new(entries: HashMap<String, PromptText>) -> Self {
        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&PromptText> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve an id; unknown ids resolve to empty text.
    pub fn resolve(&self, id: &str, locale: Locale) -> ResolvedPrompt {
        match self.entries.get(id) {
            Some(text) => resolved(id, text, locale),
            None => ResolvedPrompt {
                id: id.to_string(),
                text: String::new(),
                text_zh: String::new(),
                text_en: String::new(),
            },
        }
    }

    /// Resolve every id, keeping unknown ones with empty text.
    pub fn resolve_all(&self, ids: &[String], locale: Locale) -> Vec<ResolvedPrompt> {
        ids.iter().map(|id| self.resolve(id, locale)).collect()
    }

    /// Resolve only the ids present in the catalog, in request order.
    pub fn resolve_known(&self, ids: &[String], locale: Locale) -> Vec<ResolvedPrompt> {
        ids.iter()
            .filter_map(|id| self.entries.get(id).map(|text| resolved(id, text, locale)))
            .collect()
    }
}

fn resolved(id: &str, text: &PromptText, locale: Locale) -> ResolvedPrompt {
    ResolvedPrompt {
        id: id.to_string(),
        text: locale.pick(&text.zh, &text.en).to_string(),
        text_zh: text.zh.clone(),
        text_en: text.en.clone(),
    }
}
