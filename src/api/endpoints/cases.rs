//! Case endpoints. Every handler is scoped to the authenticated caller.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::analysis;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db::{self, SoftDelete};
use crate::models::{Case, CaseFilter, CasePage, CaseUpdate, NewCase, MAX_PAGE_SIZE};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub include_deleted: Option<bool>,
}

impl ListQuery {
    fn into_filter(self) -> Result<CaseFilter, ApiError> {
        let defaults = CaseFilter::default();
        let page = self.page.unwrap_or(defaults.page);
        let page_size = self.page_size.unwrap_or(defaults.page_size);
        if page < 1 {
            return Err(ApiError::BadRequest("page must be >= 1".into()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ApiError::BadRequest(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(CaseFilter {
            q: self.q,
            page,
            page_size,
            include_deleted: self.include_deleted.unwrap_or(false),
        })
    }
}

/// Body of `POST /api/cases/:id/analyze`. Provided fields are written to
/// the case before the rules run.
#[derive(Debug, Default, Deserialize)]
pub struct ReanalyzeRequest {
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default)]
    pub exam_findings: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub age_info: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// `GET /api/cases`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<CasePage>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let filter = query.into_filter()?;
    let conn = ctx.open_db()?;
    Ok(Json(db::list_cases(&conn, user.user_id, &filter)?))
}

/// `POST /api/cases`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<NewCase>, JsonRejection>,
) -> Result<Json<Case>, ApiError> {
    let Json(mut input) = body?;
    input.patient_name = required_name(&input.patient_name)?;
    let conn = ctx.open_db()?;
    let case = db::insert_case(&conn, user.user_id, &input)?;
    tracing::info!(case_id = case.id, user_id = user.user_id, "Case created");
    Ok(Json(case))
}

/// `GET /api/cases/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
) -> Result<Json<Case>, ApiError> {
    let conn = ctx.open_db()?;
    db::get_case(&conn, user.user_id, id)?
        .map(Json)
        .ok_or_else(case_not_found)
}

/// `PUT /api/cases/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
    body: Result<Json<CaseUpdate>, JsonRejection>,
) -> Result<Json<Case>, ApiError> {
    let Json(mut update) = body?;
    if let Some(name) = &update.patient_name {
        update.patient_name = Some(required_name(name)?);
    }
    let conn = ctx.open_db()?;
    Ok(Json(db::update_case(&conn, user.user_id, id, &update)?))
}

/// `DELETE /api/cases/:id`: soft delete.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let response = match db::soft_delete_case(&conn, user.user_id, id)? {
        SoftDelete::Deleted(at) => {
            tracing::info!(case_id = id, user_id = user.user_id, "Case soft-deleted");
            DeleteResponse {
                ok: true,
                id,
                deleted_at: Some(at.format("%Y-%m-%dT%H:%M:%S").to_string()),
                message: None,
            }
        }
        SoftDelete::AlreadyDeleted => DeleteResponse {
            ok: true,
            id,
            deleted_at: None,
            message: Some("already deleted"),
        },
    };
    Ok(Json(response))
}

/// `POST /api/cases/:id/restore`
pub async fn restore(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
) -> Result<Json<Case>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::restore_case(&conn, user.user_id, id)?))
}

/// `POST /api/cases/:id/analyze`: sync fields, rerun the rules, store
/// the result. Deleted cases are not analyzable. A request without a
/// JSON body reruns the rules on the stored fields.
pub async fn reanalyze(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
    body: Result<Json<ReanalyzeRequest>, JsonRejection>,
) -> Result<Json<Case>, ApiError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => ReanalyzeRequest::default(),
        Err(e) => return Err(e.into()),
    };
    let conn = ctx.open_db()?;
    let case = db::get_case(&conn, user.user_id, id)?
        .filter(|c| !c.is_deleted())
        .ok_or_else(case_not_found)?;

    let complaint = request
        .chief_complaint
        .as_deref()
        .unwrap_or(&case.chief_complaint);
    let exam = request
        .exam_findings
        .as_deref()
        .or(case.exam_findings.as_deref());
    let outcome = analysis::rule_infer(complaint, exam);

    let update = CaseUpdate {
        chief_complaint: request.chief_complaint,
        history: request.history,
        exam_findings: request.exam_findings,
        species: request.species,
        age_info: request.age_info,
        analysis: Some(outcome.analysis),
        treatment: Some(outcome.treatment),
        prognosis: Some(outcome.prognosis),
        ..Default::default()
    };
    Ok(Json(db::update_case(&conn, user.user_id, id, &update)?))
}

fn required_name(name: &str) -> Result<String, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest("patient_name is required".into()));
    }
    Ok(trimmed.to_string())
}

fn case_not_found() -> ApiError {
    ApiError::NotFound("case not found".into())
}

