//! Client-facing tree payloads.
//!
//! Converts raw nodes into locale-resolved views, optionally inlining the
//! prompt text for each node's `questions_ref`.

use serde::Serialize;

use super::store::KnowledgeBase;
use super::types::{Locale, Node, PromptCatalog, ResolvedPrompt};
use super::KbError;

/// Locale-resolved node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformedNode {
    pub id: String,
    pub label: String,
    pub label_zh: String,
    pub label_en: String,
    pub tags: Vec<String>,
    pub signals: Vec<String>,
    #[serde(flatten)]
    pub questions: NodeQuestions,
    pub children: Vec<TransformedNode>,
}

/// Either inlined prompts or the raw id list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeQuestions {
    Prompts { prompts: Vec<ResolvedPrompt> },
    Ids { questions_ref: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreePayload {
    pub version: Option<String>,
    pub updated_at: Option<String>,
    pub root: TransformedNode,
}

/// Transform `node` and its descendants, depth-first, preserving order.
pub fn transform(
    node: &Node,
    prompts: &PromptCatalog,
    locale: Locale,
    embed_prompts: bool,
) -> TransformedNode {
    let questions = if embed_prompts {
        NodeQuestions::Prompts {
            prompts: prompts.resolve_all(&node.questions_ref, locale),
        }
    } else {
        NodeQuestions::Ids {
            questions_ref: node.questions_ref.clone(),
        }
    };

    TransformedNode {
        id: node.id.clone(),
        label: node.label(locale).to_string(),
        label_zh: node.label_zh.clone(),
        label_en: node.label_en.clone(),
        tags: node.tags.clone(),
        signals: node.signals.clone(),
        questions,
        children: node
            .children
            .iter()
            .map(|child| transform(child, prompts, locale, embed_prompts))
            .collect(),
    }
}

impl KnowledgeBase {
    /// Full tree payload. In ids mode the prompt document is never read.
    pub fn tree_payload(&self, locale: Locale, embed_prompts: bool) -> Result<TreePayload, KbError> {
        let tree = self.load_tree()?;
        let prompts = if embed_prompts {
            self.load_prompts()?
        } else {
            PromptCatalog::default()
        };

        Ok(TreePayload {
            root: transform(&tree.root, &prompts, locale, embed_prompts),
            version: tree.version,
            updated_at: tree.updated_at,
        })
    }

    /// Resolve question ids; ids missing from the catalog are dropped.
    pub fn prompts_by_ids(&self, ids: &[String], locale: Locale) -> Result<Vec<ResolvedPrompt>, KbError> {
        Ok(self.load_prompts()?.resolve_known(ids, locale))
    }
}
