//! Keyword rule engine for free-text case analysis.
//!
//! Produces the three narrative fields stored on a case. Matching is
//! substring-based and case-insensitive; output text is Chinese, as the
//! clinic staff read it.

use serde::{Deserialize, Serialize};

const NO_DDX: &str = "需完善检查以明确病因。";
const NO_PLAN: &str = "建议完善血常规/生化/电解质/影像检查后再定方案。";
const DDX_HEADER: &str = "可能的鉴别诊断：";
const PLAN_HEADER: &str = "建议的下一步处理/治疗：";
const PROGNOSIS: &str = "总体预后良好；需结合影像与实验室检查动态评估。";

/// A keyword rule: fires when any keyword occurs in the inspected field.
struct Rule {
    field: Field,
    keywords: &'static [&'static str],
    differentials: &'static [&'static str],
    plan: &'static [&'static str],
}

#[derive(Clone, Copy)]
enum Field {
    ChiefComplaint,
    ExamFindings,
}

const RULES: &[Rule] = &[
    Rule {
        field: Field::ChiefComplaint,
        keywords: &["vomit", "呕吐"],
        differentials: &["胃肠炎", "胃/肠异物", "胰腺炎"],
        plan: &[
            "补液与电解质",
            "胃黏膜保护（硫糖铝）",
            "抗吐（马罗匹坦/昂丹司琼）",
            "必要时腹超与犬特异性脂肪酶 cPL",
        ],
    },
    Rule {
        field: Field::ChiefComplaint,
        keywords: &["diarrhea", "腹泻"],
        differentials: &["应激性结肠炎", "寄生虫/贾第鞭毛虫", "食物反应/IBD"],
        plan: &["粪检寄生虫筛查", "益生菌", "短期肠道处方粮"],
    },
    Rule {
        field: Field::ExamFindings,
        keywords: &["bilirubin", "胆红素"],
        differentials: &["肝胆疾病/胆汁淤积"],
        plan: &[],
    },
];

/// Request body for the analyze operations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeInput {
    pub chief_complaint: String,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default)]
    pub exam_findings: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub age_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub analysis: String,
    pub treatment: String,
    pub prognosis: String,
}

/// Run the keyword rules over a complaint and exam findings.
pub fn rule_infer(chief_complaint: &str, exam_findings: Option<&str>) -> AnalysisOutcome {
    let complaint = chief_complaint.to_lowercase();
    let exam = exam_findings.unwrap_or_default().to_lowercase();

    let mut differentials: Vec<&str> = Vec::new();
    let mut plan: Vec<&str> = Vec::new();

    for rule in RULES {
        let haystack = match rule.field {
            Field::ChiefComplaint => &complaint,
            Field::ExamFindings => &exam,
        };
        if rule.keywords.iter().any(|k| haystack.contains(k)) {
            extend_unique(&mut differentials, rule.differentials);
            extend_unique(&mut plan, rule.plan);
        }
    }

    AnalysisOutcome {
        analysis: bullet_list(DDX_HEADER, &differentials, NO_DDX),
        treatment: bullet_list(PLAN_HEADER, &plan, NO_PLAN),
        prognosis: PROGNOSIS.to_string(),
    }
}

fn extend_unique<'a>(target: &mut Vec<&'a str>, items: &[&'a str]) {
    for item in items {
        if !target.contains(item) {
            target.push(*item);
        }
    }
}

fn bullet_list(header: &str, items: &[&str], empty: &str) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    let mut out = String::from(header);
    for item in items {
        out.push_str("\n- ");
        out.push_str(item);
    }
    out
}
