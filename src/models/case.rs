use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SPECIES: &str = "dog";

/// A patient case record. `deleted_at` set means soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Case {
    pub id: i64,
    pub owner_id: Option<i64>,
    pub patient_name: String,
    pub species: String,
    pub sex: Option<String>,
    pub age_info: Option<String>,
    pub chief_complaint: String,
    pub history: Option<String>,
    pub exam_findings: Option<String>,
    pub analysis: Option<String>,
    pub treatment: Option<String>,
    pub prognosis: Option<String>,
    /// Client-defined attachment descriptors (`[{id, url, name, type, size}]`).
    pub attachments: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
}

impl Case {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCase {
    pub patient_name: String,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub age_info: Option<String>,
    #[serde(default)]
    pub chief_complaint: String,
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default)]
    pub exam_findings: Option<String>,
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub prognosis: Option<String>,
    #[serde(default)]
    pub attachments: Option<serde_json::Value>,
}

/// Partial update: `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseUpdate {
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub age_info: Option<String>,
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default)]
    pub exam_findings: Option<String>,
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub prognosis: Option<String>,
    #[serde(default)]
    pub attachments: Option<serde_json::Value>,
}

impl CaseUpdate {
    pub fn is_empty(&self) -> bool {
        self.patient_name.is_none()
            && self.species.is_none()
            && self.sex.is_none()
            && self.age_info.is_none()
            && self.chief_complaint.is_none()
            && self.history.is_none()
            && self.exam_findings.is_none()
            && self.analysis.is_none()
            && self.treatment.is_none()
            && self.prognosis.is_none()
            && self.attachments.is_none()
    }
}

/// One page of a case listing plus the unpaged match count.
#[derive(Debug, Clone, Serialize)]
pub struct CasePage {
    pub items: Vec<Case>,
    pub total: i64,
}
