use serde::Serialize;

use crate::knowledge::ResolvedPrompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    Emergency,
    Urgent,
    Routine,
}

/// A top-level differential branch scored against the input signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub label_zh: String,
    pub label_en: String,
    pub score: usize,
    pub signals_hit: Vec<String>,
}

/// Triage decision record returned to staff.
///
/// The emergency path fills `suggested_first_actions` and
/// `suggested_first_tests`; the regular path fills `ddx_candidates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageResult {
    pub kb_version: Option<String>,
    pub updated_at: Option<String>,
    pub priority_level: PriorityLevel,
    pub matched_node: Option<String>,
    pub signals_hit: Vec<String>,
    pub derived_signals: Vec<String>,
    pub next_questions: Vec<ResolvedPrompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_first_actions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_first_tests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddx_candidates: Option<Vec<Candidate>>,
    pub note_for_staff: String,
}
