/// End-to-end tests of the decision/audit orchestration with a mocked
/// remote auditor. The router is exercised in-process via `oneshot`.
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use loan_decision_api::audit_client::AuditorClient;
use loan_decision_api::handlers::{router, AppState};
use loan_decision_api::ledger::Ledger;
use loan_decision_api::models::{
    AuditMode, AuditStatus, EmploymentStatus, LedgerRecord, LoanApplication, PredictionResponse,
};
use loan_decision_api::scoring::{NoiseSource, ScoringPolicy};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fixed perturbation so approval outcomes are deterministic.
struct FixedNoise(f64);

impl NoiseSource for FixedNoise {
    fn sample(&self) -> f64 {
        self.0
    }
}

async fn build_app(auditor_url: &str, timeout: Duration) -> (Router, Arc<AppState>) {
    let ledger = Ledger::in_memory().await.expect("in-memory ledger");
    let auditor = AuditorClient::new(auditor_url.to_string(), timeout).expect("auditor client");
    let state = Arc::new(AppState {
        ledger,
        scoring: ScoringPolicy::with_noise(Arc::new(FixedNoise(0.0))),
        auditor,
    });
    (router(state.clone()), state)
}

fn strong_application() -> LoanApplication {
    LoanApplication {
        applicant_income: 50000.0,
        credit_score: 750,
        loan_amount: 10000.0,
        employment_status: EmploymentStatus::Employed,
    }
}

fn predict_request(application: &LoanApplication) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/predict")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(application).unwrap()))
        .unwrap()
}

fn history_request() -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/api/v1/history")
        .body(Body::empty())
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn mock_cleared_auditor() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "audit_id": "7a4866f1-51b5-4f5e-9e2a-cf4f9bb34a22",
            "status": "CLEARED",
            "compliance_score": 1.0,
            "comments": ["Automated Check Cleared."],
            "mode": "GEN_AI"
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn approved_application_carries_remote_audit() {
    let server = mock_cleared_auditor().await;
    let (app, _) = build_app(&server.uri(), Duration::from_secs(5)).await;

    let response = app.oneshot(predict_request(&strong_application())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: PredictionResponse = body_json(response).await;
    assert!(body.approved);
    assert_eq!(body.confidence_score, 1.0);
    assert!(body.reasons.is_empty());

    let audit = body.audit_analysis.expect("audit analysis present");
    assert_eq!(audit.status, AuditStatus::Cleared);
    assert_eq!(audit.mode, AuditMode::GenAi);
    assert_eq!(audit.compliance_score, 1.0);
}

#[tokio::test]
async fn prediction_is_persisted_to_history() {
    let server = mock_cleared_auditor().await;
    let (app, _) = build_app(&server.uri(), Duration::from_secs(5)).await;

    let response = app
        .clone()
        .oneshot(predict_request(&strong_application()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(history_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let records: Vec<LedgerRecord> = body_json(response).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].decision, "Approved");
    assert_eq!(records[0].audit_status, "CLEARED");
    assert_eq!(records[0].credit_score, 750);
}

#[tokio::test]
async fn auditor_error_status_falls_back_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audit"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    let (app, _) = build_app(&server.uri(), Duration::from_secs(5)).await;

    let response = app.oneshot(predict_request(&strong_application())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: PredictionResponse = body_json(response).await;
    let audit = body.audit_analysis.expect("fallback audit always present");
    assert_eq!(audit.mode, AuditMode::LocalFallback);
    assert_eq!(audit.status, AuditStatus::Cleared);
}

#[tokio::test]
async fn auditor_timeout_falls_back_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audit"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(serde_json::json!({
                    "status": "CLEARED",
                    "compliance_score": 1.0,
                    "mode": "GEN_AI"
                })),
        )
        .mount(&server)
        .await;
    let (app, _) = build_app(&server.uri(), Duration::from_millis(250)).await;

    let response = app.oneshot(predict_request(&strong_application())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: PredictionResponse = body_json(response).await;
    let audit = body.audit_analysis.expect("fallback audit always present");
    assert_eq!(audit.mode, AuditMode::LocalFallback);
}

#[tokio::test]
async fn unreachable_auditor_falls_back_locally() {
    // Nothing listens here; connection is refused immediately.
    let (app, _) = build_app("http://127.0.0.1:9", Duration::from_secs(1)).await;

    let response = app.oneshot(predict_request(&strong_application())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: PredictionResponse = body_json(response).await;
    let audit = body.audit_analysis.expect("fallback audit always present");
    assert_eq!(audit.mode, AuditMode::LocalFallback);
    assert_eq!(audit.status, AuditStatus::Cleared);
    assert_eq!(audit.compliance_score, 1.0);
}

#[tokio::test]
async fn denied_application_reports_reasons_and_keeps_response_shape() {
    let server = mock_cleared_auditor().await;
    let (app, _) = build_app(&server.uri(), Duration::from_secs(5)).await;

    let application = LoanApplication {
        applicant_income: 10000.0,
        credit_score: 400,
        loan_amount: 50000.0,
        employment_status: EmploymentStatus::Unemployed,
    };

    let response = app.oneshot(predict_request(&application)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: PredictionResponse = body_json(response).await;
    assert!(!body.approved);
    assert_eq!(
        body.reasons,
        vec![
            "Credit score below 600",
            "Income too low for loan amount",
            "Employment status required",
        ]
    );
    assert!(body.audit_analysis.is_some());
}

#[tokio::test]
async fn invalid_input_is_rejected_before_scoring() {
    let server = mock_cleared_auditor().await;
    let (app, _) = build_app(&server.uri(), Duration::from_secs(5)).await;

    let payload = serde_json::json!({
        "applicant_income": -100,
        "credit_score": 900,
        "loan_amount": 10000,
        "employment_status": "employed"
    });
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/predict")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = body_json(response).await;
    let violations = body["violations"].as_array().unwrap();
    let fields: Vec<&str> = violations
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"applicant_income"));
    assert!(fields.contains(&"credit_score"));

    // No audit call, no ledger record
    assert!(server.received_requests().await.unwrap().is_empty());
    let response = app.oneshot(history_request()).await.unwrap();
    let records: Vec<LedgerRecord> = body_json(response).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn persistence_failure_does_not_change_the_response() {
    let server = mock_cleared_auditor().await;
    let (app, state) = build_app(&server.uri(), Duration::from_secs(5)).await;

    // Make the store unavailable; appends now fail and must be swallowed.
    state.ledger.close().await;

    let response = app.oneshot(predict_request(&strong_application())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: PredictionResponse = body_json(response).await;
    assert!(body.approved);
    assert!(body.audit_analysis.is_some());
}

#[tokio::test]
async fn empty_history_returns_empty_list() {
    let server = mock_cleared_auditor().await;
    let (app, _) = build_app(&server.uri(), Duration::from_secs(5)).await;

    let response = app.oneshot(history_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let records: Vec<LedgerRecord> = body_json(response).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn correlation_id_is_echoed_when_supplied() {
    let server = mock_cleared_auditor().await;
    let (app, _) = build_app(&server.uri(), Duration::from_secs(5)).await;

    let mut request = predict_request(&strong_application());
    request
        .headers_mut()
        .insert("x-correlation-id", "req-abc-123".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-correlation-id").unwrap(),
        "req-abc-123"
    );
}

#[tokio::test]
async fn correlation_id_is_generated_when_absent() {
    let server = mock_cleared_auditor().await;
    let (app, _) = build_app(&server.uri(), Duration::from_secs(5)).await;

    let response = app.oneshot(predict_request(&strong_application())).await.unwrap();
    let header = response
        .headers()
        .get("x-correlation-id")
        .expect("correlation id attached");
    assert!(!header.to_str().unwrap().is_empty());
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let server = mock_cleared_auditor().await;
    let (app, _) = build_app(&server.uri(), Duration::from_secs(5)).await;

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(response).await;
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}
