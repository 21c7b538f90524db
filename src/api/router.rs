//! HTTP router.
//!
//! Public routes: health, account, knowledge base.
//! Protected routes (bearer JWT): cases and analysis.
//!
//! Middleware stack on protected routes (outermost → innermost):
//! 1. Auth validator → 2. Audit logger

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config::AppConfig;

/// Build the full application router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(config: AppConfig) -> Router {
    build_router(ApiContext::new(config))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route(
            "/api/cases",
            get(endpoints::cases::list).post(endpoints::cases::create),
        )
        .route(
            "/api/cases/:id",
            get(endpoints::cases::detail)
                .put(endpoints::cases::update)
                .delete(endpoints::cases::remove),
        )
        .route("/api/cases/:id/restore", post(endpoints::cases::restore))
        .route("/api/cases/:id/analyze", post(endpoints::cases::reanalyze))
        .route("/analyze", post(endpoints::analyze::analyze))
        .with_state(ctx.clone())
        // Innermost first, outermost last
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    let public = Router::new()
        .route("/healthz", get(endpoints::health::check))
        .route("/ping", get(endpoints::health::ping))
        .route("/auth/signup", post(endpoints::auth::signup))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/api/v1/vomiting/tree", get(endpoints::vomiting::tree))
        .route("/api/v1/vomiting/triage", post(endpoints::vomiting::triage))
        .route("/api/v1/prompts", get(endpoints::vomiting::prompts))
        .with_state(ctx);

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::knowledge::store::fixtures::{write_kb, TREE};

    fn test_app() -> (Router, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let app = api_router(AppConfig::for_tests(tmp.path()));
        (app, tmp)
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn signup_and_login(app: &Router, email: &str) -> String {
        let (status, _) = send(
            app,
            request(
                "POST",
                "/auth/signup",
                None,
                Some(json!({"email": email, "password": "password123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(
            app,
            request(
                "POST",
                "/auth/login",
                None,
                Some(json!({"email": email, "password": "password123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["token_type"], "bearer");
        json["access_token"].as_str().unwrap().to_string()
    }

    async fn create_case(app: &Router, token: &str, name: &str, complaint: &str) -> i64 {
        let (status, json) = send(
            app,
            request(
                "POST",
                "/api/cases",
                Some(token),
                Some(json!({"patient_name": name, "chief_complaint": complaint})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        json["id"].as_i64().unwrap()
    }

    // ── Health ──────────────────────────────────────────────

    #[tokio::test]
    async fn healthz_and_ping() {
        let (app, _tmp) = test_app();
        let (status, json) = send(&app, request("GET", "/healthz", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);

        let (status, json) = send(&app, request("GET", "/ping", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let (app, _tmp) = test_app();
        let (status, _) = send(&app, request("GET", "/nonexistent", None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // ── Accounts ────────────────────────────────────────────

    #[tokio::test]
    async fn signup_returns_user_without_hash() {
        let (app, _tmp) = test_app();
        let (status, json) = send(
            &app,
            request(
                "POST",
                "/auth/signup",
                None,
                Some(json!({"email": "Vet@Clinic.com", "password": "password123", "full_name": "Dr. Li"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["email"], "vet@clinic.com");
        assert_eq!(json["full_name"], "Dr. Li");
        assert!(json.get("hashed_password").is_none());
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let (app, _tmp) = test_app();
        signup_and_login(&app, "dup@clinic.com").await;
        let (status, json) = send(
            &app,
            request(
                "POST",
                "/auth/signup",
                None,
                Some(json!({"email": "DUP@clinic.com", "password": "another-password"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn short_password_and_bad_email_rejected() {
        let (app, _tmp) = test_app();
        let (status, _) = send(
            &app,
            request(
                "POST",
                "/auth/signup",
                None,
                Some(json!({"email": "a@clinic.com", "password": "short"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/auth/signup",
                None,
                Some(json!({"email": "not-an-email", "password": "password123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (app, _tmp) = test_app();
        signup_and_login(&app, "vet@clinic.com").await;

        let (status_wrong, json_wrong) = send(
            &app,
            request(
                "POST",
                "/auth/login",
                None,
                Some(json!({"email": "vet@clinic.com", "password": "wrong-password"})),
            ),
        )
        .await;
        let (status_unknown, json_unknown) = send(
            &app,
            request(
                "POST",
                "/auth/login",
                None,
                Some(json!({"email": "ghost@clinic.com", "password": "password123"})),
            ),
        )
        .await;
        assert_eq!(status_wrong, StatusCode::UNAUTHORIZED);
        assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);
        assert_eq!(json_wrong, json_unknown);
    }

    // ── Auth middleware ─────────────────────────────────────

    #[tokio::test]
    async fn cases_require_auth() {
        let (app, _tmp) = test_app();
        let (status, json) = send(&app, request("GET", "/api/cases", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");

        let (status, _) = send(&app, request("GET", "/api/cases", Some("garbage"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_token_returns_token_expired() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::for_tests(tmp.path());
        let token = crate::auth::token::expired_token(&config.jwt_secret, 1, "vet@clinic.com");
        let app = api_router(config);

        let (status, json) = send(&app, request("GET", "/api/cases", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "TOKEN_EXPIRED");
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_rejected() {
        let (app, _tmp) = test_app();
        let token = crate::auth::issue_token("some-other-secret", 3_600, 1, "vet@clinic.com").unwrap();
        let (status, _) = send(&app, request("GET", "/api/cases", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // ── Cases ───────────────────────────────────────────────

    #[tokio::test]
    async fn case_lifecycle() {
        let (app, _tmp) = test_app();
        let token = signup_and_login(&app, "vet@clinic.com").await;
        let id = create_case(&app, &token, "Rex", "vomiting").await;

        let (status, json) =
            send(&app, request("GET", &format!("/api/cases/{id}"), Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["species"], "dog");
        assert!(json["deleted_at"].is_null());

        let (status, json) = send(
            &app,
            request(
                "PUT",
                &format!("/api/cases/{id}"),
                Some(&token),
                Some(json!({"history": "ate a sock"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["history"], "ate a sock");
        assert_eq!(json["patient_name"], "Rex");

        let (status, json) =
            send(&app, request("DELETE", &format!("/api/cases/{id}"), Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert_eq!(json["id"], id);
        assert!(json["deleted_at"].is_string());

        let (_, json) =
            send(&app, request("DELETE", &format!("/api/cases/{id}"), Some(&token), None)).await;
        assert_eq!(json["message"], "already deleted");

        let (_, json) = send(&app, request("GET", "/api/cases", Some(&token), None)).await;
        assert_eq!(json["total"], 0);
        let (_, json) = send(
            &app,
            request("GET", "/api/cases?include_deleted=true", Some(&token), None),
        )
        .await;
        assert_eq!(json["total"], 1);

        let (status, json) = send(
            &app,
            request("POST", &format!("/api/cases/{id}/restore"), Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["deleted_at"].is_null());
    }

    #[tokio::test]
    async fn create_requires_patient_name() {
        let (app, _tmp) = test_app();
        let token = signup_and_login(&app, "vet@clinic.com").await;
        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/cases",
                Some(&token),
                Some(json!({"patient_name": "   ", "chief_complaint": "cough"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cases_are_isolated_between_users() {
        let (app, _tmp) = test_app();
        let alice = signup_and_login(&app, "alice@clinic.com").await;
        let bob = signup_and_login(&app, "bob@clinic.com").await;
        let id = create_case(&app, &alice, "Rex", "vomiting").await;

        let (status, _) =
            send(&app, request("GET", &format!("/api/cases/{id}"), Some(&bob), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) =
            send(&app, request("DELETE", &format!("/api/cases/{id}"), Some(&bob), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, json) = send(&app, request("GET", "/api/cases", Some(&bob), None)).await;
        assert_eq!(json["total"], 0);
    }

    #[tokio::test]
    async fn list_searches_and_paginates() {
        let (app, _tmp) = test_app();
        let token = signup_and_login(&app, "vet@clinic.com").await;
        for i in 0..12 {
            create_case(&app, &token, &format!("Pet {i}"), "check-up").await;
        }
        create_case(&app, &token, "Rex", "Vomiting").await;

        let (status, json) = send(
            &app,
            request("GET", "/api/cases?page=2&page_size=5", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 13);
        assert_eq!(json["items"].as_array().unwrap().len(), 5);

        let (_, json) = send(&app, request("GET", "/api/cases?q=vomit", Some(&token), None)).await;
        assert_eq!(json["total"], 1);
        assert_eq!(json["items"][0]["patient_name"], "Rex");
    }

    #[tokio::test]
    async fn list_rejects_out_of_range_paging() {
        let (app, _tmp) = test_app();
        let token = signup_and_login(&app, "vet@clinic.com").await;
        for uri in [
            "/api/cases?page=0",
            "/api/cases?page_size=0",
            "/api/cases?page_size=501",
            "/api/cases?page=abc",
        ] {
            let (status, _) = send(&app, request("GET", uri, Some(&token), None)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    // ── Analysis ────────────────────────────────────────────

    #[tokio::test]
    async fn analyze_stores_a_case() {
        let (app, _tmp) = test_app();
        let token = signup_and_login(&app, "vet@clinic.com").await;

        let (status, json) = send(
            &app,
            request(
                "POST",
                "/analyze",
                Some(&token),
                Some(json!({"chief_complaint": "呕吐两天", "exam_findings": "bilirubin high"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["analysis"].as_str().unwrap().contains("胰腺炎"));
        assert!(json["analysis"].as_str().unwrap().contains("胆汁淤积"));

        let case_id = json["case_id"].as_i64().unwrap();
        let (_, case) =
            send(&app, request("GET", &format!("/api/cases/{case_id}"), Some(&token), None)).await;
        assert_eq!(case["analysis"], json["analysis"]);
        assert_eq!(case["prognosis"], json["prognosis"]);
    }

    #[tokio::test]
    async fn analyze_requires_auth() {
        let (app, _tmp) = test_app();
        let (status, _) = send(
            &app,
            request("POST", "/analyze", None, Some(json!({"chief_complaint": "vomit"}))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn reanalyze_updates_case_and_skips_deleted() {
        let (app, _tmp) = test_app();
        let token = signup_and_login(&app, "vet@clinic.com").await;
        let id = create_case(&app, &token, "Rex", "limping").await;

        let (status, json) = send(
            &app,
            request(
                "POST",
                &format!("/api/cases/{id}/analyze"),
                Some(&token),
                Some(json!({"chief_complaint": "diarrhea since Monday"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["chief_complaint"], "diarrhea since Monday");
        assert!(json["analysis"].as_str().unwrap().contains("应激性结肠炎"));

        send(&app, request("DELETE", &format!("/api/cases/{id}"), Some(&token), None)).await;
        let (status, _) = send(
            &app,
            request("POST", &format!("/api/cases/{id}/analyze"), Some(&token), Some(json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reanalyze_without_body_uses_stored_fields() {
        let (app, _tmp) = test_app();
        let token = signup_and_login(&app, "vet@clinic.com").await;
        let id = create_case(&app, &token, "Rex", "vomiting twice").await;

        let (status, json) = send(
            &app,
            request("POST", &format!("/api/cases/{id}/analyze"), Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["analysis"].as_str().unwrap().contains("胰腺炎"));
    }

    #[tokio::test]
    async fn malformed_case_bodies_are_bad_requests() {
        let (app, _tmp) = test_app();
        let token = signup_and_login(&app, "vet@clinic.com").await;
        let id = create_case(&app, &token, "Rex", "cough").await;

        let (status, json) = send(
            &app,
            request("POST", "/api/cases", Some(&token), Some(json!({"patient_name": 42}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (status, json) = send(
            &app,
            request("PUT", &format!("/api/cases/{id}"), Some(&token), Some(json!({"species": []}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (status, json) = send(
            &app,
            request(
                "POST",
                &format!("/api/cases/{id}/analyze"),
                Some(&token),
                Some(json!({"history": {"nested": true}})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (status, json) = send(
            &app,
            request("POST", "/auth/login", None, Some(json!({"email": "vet@clinic.com"}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    // ── Knowledge base ──────────────────────────────────────

    #[tokio::test]
    async fn tree_embeds_prompts_by_default() {
        let (app, _tmp) = test_app();
        let (status, json) =
            send(&app, request("GET", "/api/v1/vomiting/tree?locale=en", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let triage = &json["root"]["children"][0];
        assert_eq!(triage["id"], "triage");
        assert!(triage["prompts"].is_array());
        assert!(triage.get("questions_ref").is_none());
    }

    #[tokio::test]
    async fn tree_ids_mode_works_without_prompt_document() {
        let tmp = tempfile::tempdir().unwrap();
        let kb_dir = tmp.path().join("kb");
        write_kb(&kb_dir, Some(TREE), None);
        let mut config = AppConfig::for_tests(tmp.path());
        config.kb_root = kb_dir;
        let app = api_router(config);

        let (status, json) =
            send(&app, request("GET", "/api/v1/vomiting/tree?embed=ids", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["root"]["children"][0]["questions_ref"],
            json!(["Q1", "Q2", "Q_MISSING"])
        );

        let (status, json) = send(&app, request("GET", "/api/v1/vomiting/tree", None, None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "KB_ERROR");
    }

    #[tokio::test]
    async fn prompts_by_repeated_ids() {
        let (app, _tmp) = test_app();
        let (status, json) = send(
            &app,
            request(
                "GET",
                "/api/v1/prompts?ids=Q_SPECIES_AGE&ids=Q_UNKNOWN&ids=Q_WATER_INTAKE&locale=en",
                None,
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let prompts = json["prompts"].as_array().unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0]["id"], "Q_SPECIES_AGE");
        assert_eq!(prompts[1]["id"], "Q_WATER_INTAKE");
    }

    #[tokio::test]
    async fn prompts_unknown_only_is_empty_and_missing_ids_is_400() {
        let (app, _tmp) = test_app();
        let (status, json) =
            send(&app, request("GET", "/api/v1/prompts?ids=Q_UNKNOWN", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["prompts"], json!([]));

        let (status, _) = send(&app, request("GET", "/api/v1/prompts?locale=zh", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_locale_is_bad_request() {
        let (app, _tmp) = test_app();
        let (status, _) =
            send(&app, request("GET", "/api/v1/vomiting/tree?locale=fr", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn triage_fresh_blood_is_emergency() {
        let (app, _tmp) = test_app();
        let (status, json) = send(
            &app,
            request(
                "POST",
                "/api/v1/vomiting/triage?locale=en",
                None,
                Some(json!({"blood": "fresh"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["priority_level"], "emergency");
        assert_eq!(json["matched_node"], "triage.red_flags");
        assert_eq!(json["signals_hit"], json!(["blood_vomit"]));
        assert!(json["suggested_first_actions"].is_array());
    }

    #[tokio::test]
    async fn triage_empty_input_is_routine() {
        let (app, _tmp) = test_app();
        let (status, json) = send(
            &app,
            request("POST", "/api/v1/vomiting/triage", None, Some(json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["priority_level"], "routine");
        assert!(json["matched_node"].is_null());
        assert_eq!(json["derived_signals"], json!([]));
        assert!(json["ddx_candidates"].as_array().unwrap().len() <= 5);
    }

    #[tokio::test]
    async fn triage_invalid_body_is_structured_bad_request() {
        let (app, _tmp) = test_app();
        let (status, json) = send(
            &app,
            request("POST", "/api/v1/vomiting/triage", None, Some(json!({"blood": "purple"}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(json["error"]["message"].as_str().unwrap().contains("purple"));

        let (status, json) = send(
            &app,
            request("POST", "/api/v1/vomiting/triage", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn missing_knowledge_base_maps_to_kb_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = AppConfig::for_tests(tmp.path());
        config.kb_root = tmp.path().join("no-such-kb");
        let app = api_router(config);

        let (status, json) = send(
            &app,
            request("POST", "/api/v1/vomiting/triage", None, Some(json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "KB_ERROR");
    }
}
