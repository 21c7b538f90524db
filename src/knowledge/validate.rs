//! Authoring checks over a loaded knowledge base.
//!
//! Evaluation only hard-fails on the triage-first rule. The remaining
//! checks report problems that degrade output silently (duplicate ids,
//! question ids missing from the catalog) so they can be surfaced at
//! startup.

use std::collections::HashSet;

use serde::Serialize;

use super::store::KnowledgeBase;
use super::types::{Node, PromptCatalog, TreeDocument};
use super::KbError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KbIssue {
    Structure { reason: String },
    EmptyId { parent_id: String },
    DuplicateId { id: String },
    UnknownQuestion { node_id: String, question_id: String },
}

/// Check a tree against its catalog. Empty result means clean.
pub fn check_tree(tree: &TreeDocument, prompts: &PromptCatalog) -> Vec<KbIssue> {
    let mut issues = Vec::new();

    if let Err(KbError::StructuralViolation(reason)) = tree.triage_node() {
        issues.push(KbIssue::Structure { reason });
    }

    let mut seen = HashSet::new();
    walk(&tree.root, None, prompts, &mut seen, &mut issues);
    issues
}

fn walk<'a>(
    node: &'a Node,
    parent: Option<&str>,
    prompts: &PromptCatalog,
    seen: &mut HashSet<&'a str>,
    issues: &mut Vec<KbIssue>,
) {
    if node.id.is_empty() {
        issues.push(KbIssue::EmptyId {
            parent_id: parent.unwrap_or("<root>").to_string(),
        });
    } else if !seen.insert(node.id.as_str()) {
        issues.push(KbIssue::DuplicateId { id: node.id.clone() });
    }

    for qid in &node.questions_ref {
        if prompts.get(qid).is_none() {
            issues.push(KbIssue::UnknownQuestion {
                node_id: node.id.clone(),
                question_id: qid.clone(),
            });
        }
    }

    for child in &node.children {
        walk(child, Some(&node.id), prompts, seen, issues);
    }
}

impl KnowledgeBase {
    /// Load both documents and run the authoring checks.
    pub fn check(&self) -> Result<Vec<KbIssue>, KbError> {
        let tree = self.load_tree()?;
        let prompts = self.load_prompts()?;
        Ok(check_tree(&tree, &prompts))
    }
}
