use crate::knowledge::{KbError, KnowledgeBase, Locale, Node, PromptCatalog, TreeDocument};

use super::signals::{derive_signals, EnergyLevel, Signal, TriageInput};
use super::types::{Candidate, PriorityLevel, TriageResult};

pub const RED_FLAGS_ID: &str = "triage.red_flags";
pub const ACUTE_ID: &str = "triage.acute";
pub const CHRONIC_ID: &str = "triage.chronic";

const MAX_CANDIDATES: usize = 5;
const URGENT_VOMIT_COUNT: u32 = 5;

/// (zh, en)
type Bilingual = (&'static str, &'static str);

const FIRST_ACTIONS: &[Bilingual] = &[
    ("T/HR/RR/BP/SpO2/CRT", "T/HR/RR/BP/SpO2/CRT"),
    (
        "POCUS/腹部快速超声（如可用）",
        "POCUS / rapid abdominal ultrasound (if available)",
    ),
    (
        "血糖/PCV-TP/乳酸（按院内流程）",
        "Blood glucose / PCV-TP / lactate (per hospital protocol)",
    ),
];

const FIRST_TESTS: &[Bilingual] = &[
    (
        "CBC + 生化 + 电解质（Na/K/Cl）",
        "CBC + chemistry + electrolytes (Na/K/Cl)",
    ),
    (
        "腹部X线（异物/GDV/梗阻风险）",
        "Abdominal radiographs (foreign body / GDV / obstruction risk)",
    ),
    ("必要时凝血/血气", "Coagulation panel / blood gas if indicated"),
];

const EMERGENCY_NOTE: Bilingual = (
    "红旗命中：优先分诊处理；先稳定后完善病史与影像。",
    "Red flag hit: prioritise triage; stabilise first, then complete history and imaging.",
);

const STAFF_NOTE: Bilingual = (
    "基于信号的初步分诊；请结合问诊与体格检查确认。",
    "Signal-based preliminary triage; confirm with history and physical examination.",
);

/// Score of one node against the input signals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMatch {
    pub score: usize,
    /// Intersection, in the node's own declaration order.
    pub matched: Vec<String>,
}

/// Intersect the node's declared signals with the input set.
pub fn match_node(node: &Node, signals: &[Signal]) -> NodeMatch {
    let matched: Vec<String> = node
        .signals
        .iter()
        .filter(|declared| signals.iter().any(|s| s.as_str() == declared.as_str()))
        .cloned()
        .collect();
    NodeMatch {
        score: matched.len(),
        matched,
    }
}

fn match_optional(node: Option<&Node>, signals: &[Signal]) -> NodeMatch {
    node.map(|n| match_node(n, signals)).unwrap_or_default()
}

/// Load the knowledge base and triage `input`.
///
/// The tree structure is checked before the prompt catalog is read and
/// before any signal is derived.
pub fn triage(
    kb: &KnowledgeBase,
    input: &TriageInput,
    locale: Locale,
) -> Result<TriageResult, KbError> {
    let tree = kb.load_tree()?;
    if let Err(e) = tree.triage_node() {
        tracing::warn!(error = %e, path = %kb.tree_path().display(), "Knowledge base failed triage precondition");
        return Err(e);
    }
    let prompts = kb.load_prompts()?;
    evaluate(&tree, &prompts, input, locale)
}

/// Triage against already-loaded documents.
///
/// Emergency results list only the triage questions the catalog knows,
/// matching `prompts_by_ids`. Regular results keep every referenced id
/// and leave unknown ones with empty text, matching the tree payload.
pub fn evaluate(
    tree: &TreeDocument,
    prompts: &PromptCatalog,
    input: &TriageInput,
    locale: Locale,
) -> Result<TriageResult, KbError> {
    let triage_node = tree.triage_node()?;
    let signals = derive_signals(input);
    let derived: Vec<String> = signals.iter().map(|s| s.as_str().to_string()).collect();

    // Red flags win over everything else.
    let red = match_optional(triage_node.child(RED_FLAGS_ID), &signals);
    if red.score > 0 {
        tracing::debug!(signals = ?red.matched, "Red flag triage hit");
        return Ok(TriageResult {
            kb_version: tree.version.clone(),
            updated_at: tree.updated_at.clone(),
            priority_level: PriorityLevel::Emergency,
            matched_node: Some(RED_FLAGS_ID.to_string()),
            signals_hit: red.matched,
            derived_signals: derived,
            next_questions: prompts.resolve_known(&triage_node.questions_ref, locale),
            suggested_first_actions: Some(localized(FIRST_ACTIONS, locale)),
            suggested_first_tests: Some(localized(FIRST_TESTS, locale)),
            ddx_candidates: None,
            note_for_staff: pick(EMERGENCY_NOTE, locale),
        });
    }

    // Acute wins ties.
    let acute = match_optional(triage_node.child(ACUTE_ID), &signals);
    let chronic = match_optional(triage_node.child(CHRONIC_ID), &signals);
    let (matched_node, signals_hit) = if acute.score >= chronic.score && acute.score > 0 {
        (Some(ACUTE_ID.to_string()), acute.matched)
    } else if chronic.score > 0 {
        (Some(CHRONIC_ID.to_string()), chronic.matched)
    } else {
        (None, Vec::new())
    };

    let candidates = rank_candidates(&tree.root, &signals);
    let priority_level = classify_priority(input);

    tracing::debug!(
        priority = ?priority_level,
        matched = ?matched_node,
        signals = ?derived,
        "Triage evaluated"
    );

    Ok(TriageResult {
        kb_version: tree.version.clone(),
        updated_at: tree.updated_at.clone(),
        priority_level,
        matched_node,
        signals_hit,
        derived_signals: derived,
        next_questions: prompts.resolve_all(&triage_node.questions_ref, locale),
        suggested_first_actions: None,
        suggested_first_tests: None,
        ddx_candidates: Some(candidates),
        note_for_staff: pick(STAFF_NOTE, locale),
    })
}

/// Score every top-level branch except `triage`, best first. Equal
/// scores keep declaration order.
fn rank_candidates(root: &Node, signals: &[Signal]) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = root
        .children
        .iter()
        .skip(1)
        .map(|child| {
            let m = match_node(child, signals);
            Candidate {
                id: child.id.clone(),
                label_zh: child.label_zh.clone(),
                label_en: child.label_en.clone(),
                score: m.score,
                signals_hit: m.matched,
            }
        })
        .collect();

    // `sort_by` is stable.
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

/// Non-emergency priority. Only `reduced` energy escalates here;
/// `severe` reaches emergency through the red-flag node when the
/// knowledge base lists `severe_lethargy` there.
fn classify_priority(input: &TriageInput) -> PriorityLevel {
    let reduced = input.energy_level == Some(EnergyLevel::Reduced);
    let frequent = input.vomit_count_24h.unwrap_or(0) >= URGENT_VOMIT_COUNT;
    if reduced || frequent {
        PriorityLevel::Urgent
    } else {
        PriorityLevel::Routine
    }
}

fn pick(text: Bilingual, locale: Locale) -> String {
    locale.pick(text.0, text.1).to_string()
}

fn localized(items: &[Bilingual], locale: Locale) -> Vec<String> {
    items.iter().map(|item| pick(*item, locale)).collect()
}
