//! Knowledge-base endpoints. Public: the knowledge base is static
//! reference content.
//!
//! `GET  /api/v1/vomiting/tree?locale=zh&embed=prompts|ids`
//! `GET  /api/v1/prompts?ids=Q1&ids=Q2&locale=zh`
//! `POST /api/v1/vomiting/triage?locale=zh`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{parse_locale, ApiContext};
use crate::knowledge::{ResolvedPrompt, TreePayload};
use crate::triage::{self, TriageInput, TriageResult};

const EMBED_IDS: &str = "ids";

#[derive(Debug, Default, Deserialize)]
pub struct TreeQuery {
    pub locale: Option<String>,
    pub embed: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PromptsResponse {
    pub prompts: Vec<ResolvedPrompt>,
}

/// `GET /api/v1/vomiting/tree`. Any `embed` other than `ids` inlines
/// prompt text.
pub async fn tree(
    State(ctx): State<ApiContext>,
    query: Result<Query<TreeQuery>, QueryRejection>,
) -> Result<Json<TreePayload>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let locale = parse_locale(query.locale.as_deref())?;
    let embed_prompts = query.embed.as_deref() != Some(EMBED_IDS);
    Ok(Json(ctx.kb().tree_payload(locale, embed_prompts)?))
}

/// `GET /api/v1/prompts`. `ids` repeats; unknown ids are dropped.
pub async fn prompts(
    State(ctx): State<ApiContext>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<PromptsResponse>, ApiError> {
    let Query(pairs) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut ids = Vec::new();
    let mut locale = None;
    for (key, value) in pairs {
        match key.as_str() {
            "ids" => ids.push(value),
            "locale" => locale = Some(value),
            _ => {}
        }
    }
    if ids.is_empty() {
        return Err(ApiError::BadRequest("at least one `ids` parameter is required".into()));
    }
    let locale = parse_locale(locale.as_deref())?;

    let prompts = ctx.kb().prompts_by_ids(&ids, locale)?;
    Ok(Json(PromptsResponse { prompts }))
}

/// `POST /api/v1/vomiting/triage`
pub async fn triage(
    State(ctx): State<ApiContext>,
    query: Result<Query<LocaleQuery>, QueryRejection>,
    body: Result<Json<TriageInput>, JsonRejection>,
) -> Result<Json<TriageResult>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let Json(input) = body?;
    let locale = parse_locale(query.locale.as_deref())?;
    Ok(Json(triage::triage(&ctx.kb(), &input, locale)?))
}
