//! Standalone compliance auditor service.
//!
//! Reviews loan decisions for fairness issues using the shared rule engine
//! and answers in the remote audit shape the inference service expects.
//! Outcomes are tagged `RULE_BASED`; the inference side treats this service
//! as best-effort and falls back locally when it is down.

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use loan_decision_api::fallback_audit::{self, CLEARED_ANALYSIS};
use loan_decision_api::models::{AuditMode, AuditOutcome, AuditStatus};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct AuditRequest {
    #[serde(default)]
    decision_reason: String,
    /// Opaque applicant payload; only `credit_score` participates in the
    /// rule review.
    #[serde(default)]
    applicant_data: Value,
}

/// POST /audit
async fn perform_audit(Json(request): Json<AuditRequest>) -> Json<AuditOutcome> {
    let credit_score = request
        .applicant_data
        .get("credit_score")
        .and_then(|v| v.as_i64())
        .unwrap_or(0);

    let review = fallback_audit::review(&request.decision_reason, credit_score);
    tracing::info!(
        flagged = review.flagged,
        "Audit performed for reason: {}",
        request.decision_reason
    );

    let comments = if review.comments.is_empty() {
        vec![CLEARED_ANALYSIS.to_string()]
    } else {
        review.comments
    };

    Json(AuditOutcome {
        audit_id: Some(Uuid::new_v4()),
        status: if review.flagged {
            AuditStatus::Flagged
        } else {
            AuditStatus::Cleared
        },
        compliance_score: if review.flagged { 0.4 } else { 1.0 },
        comments,
        mode: AuditMode::RuleBased,
    })
}

/// GET /health
async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auditor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let port: u16 = std::env::var("AUDITOR_PORT")
        .unwrap_or_else(|_| "8001".to_string())
        .parse()
        .map_err(|_| anyhow::anyhow!("AUDITOR_PORT must be a valid number between 1-65535"))?;

    let app = Router::new()
        .route("/audit", post(perform_audit))
        .route("/health", get(health));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Auditor listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
