//! `POST /analyze`: run the keyword rules and store the result as a new
//! case owned by the caller.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::analysis::{self, AnalysisOutcome, AnalyzeInput};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::models::NewCase;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
    pub case_id: i64,
}

pub async fn analyze(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<AnalyzeInput>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(input) = body?;
    let outcome = analysis::rule_infer(&input.chief_complaint, input.exam_findings.as_deref());

    let record = NewCase {
        patient_name: input.patient_name.unwrap_or_default().trim().to_string(),
        species: input.species,
        age_info: input.age_info,
        chief_complaint: input.chief_complaint,
        history: input.history,
        exam_findings: input.exam_findings,
        analysis: Some(outcome.analysis.clone()),
        treatment: Some(outcome.treatment.clone()),
        prognosis: Some(outcome.prognosis.clone()),
        ..Default::default()
    };

    let conn = ctx.open_db()?;
    let case = db::insert_case(&conn, user.user_id, &record)?;
    tracing::info!(case_id = case.id, user_id = user.user_id, "Analysis stored");

    Ok(Json(AnalyzeResponse {
        outcome,
        case_id: case.id,
    }))
}
