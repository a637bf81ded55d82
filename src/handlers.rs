use crate::audit_client::{AuditorClient, GatewayError};
use crate::correlation;
use crate::errors::AppError;
use crate::fallback_audit;
use crate::ledger::{Ledger, HISTORY_LIMIT};
use crate::models::{LedgerRecord, LoanApplication, PredictionResponse};
use crate::scoring::ScoringPolicy;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Decision reason reported to the auditor when no rejection reason exists.
pub const MET_ALL_CRITERIA: &str = "Met all criteria";

/// Shared application state injected into handlers.
///
/// No shared mutable state lives here: the scoring policy and fallback
/// auditor are stateless, and the ledger owns its own pool.
#[derive(Clone)]
pub struct AppState {
    /// Append-only decision ledger.
    pub ledger: Ledger,
    /// Simulated approval model.
    pub scoring: ScoringPolicy,
    /// Client for the remote compliance auditor.
    pub auditor: AuditorClient,
}

/// Builds the inference service router with its middleware stack.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/predict", post(predict))
        .route("/api/v1/history", get(history))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(correlation::correlation_id))
                .layer(RequestBodyLimitLayer::new(1024 * 1024)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Health check endpoint. Liveness only.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// POST /api/v1/predict
///
/// Orchestrates the full decision pipeline: validate, score, audit (with
/// fallback substitution), persist, respond.
///
/// Only validation can change the HTTP outcome. Once scoring has run, a full
/// response is always produced: any audit failure is replaced by the local
/// rule-based auditor, and any persistence failure is logged and swallowed.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(application): Json<LoanApplication>,
) -> Result<Json<PredictionResponse>, AppError> {
    application.validate().map_err(AppError::Validation)?;

    let decision = state.scoring.score(&application);
    tracing::info!(
        approved = decision.approved,
        confidence = decision.confidence,
        loan_amount = application.loan_amount,
        "Prediction made"
    );

    let decision_reason = decision
        .reasons
        .first()
        .map(String::as_str)
        .unwrap_or(MET_ALL_CRITERIA);

    let audit = match state
        .auditor
        .request_audit(decision_reason, &application)
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            match &err {
                // Timeouts are an expected degraded condition
                GatewayError::Timeout => {
                    tracing::warn!("Auditor timed out, proceeding with rule-based audit")
                }
                GatewayError::Unreachable(detail) => tracing::warn!(
                    "Auditor unavailable, proceeding with rule-based audit: {}",
                    detail
                ),
                GatewayError::BadStatus { status, body } => {
                    tracing::error!("Auditor returned {}: {}", status, body)
                }
            }
            fallback_audit::audit_locally(decision_reason, &application)
        }
    };

    let record = LedgerRecord::new(&application, &decision, &audit);
    if let Err(err) = state.ledger.append(&record).await {
        tracing::error!("Failed to save loan record: {}", err);
    }

    Ok(Json(PredictionResponse {
        approved: decision.approved,
        confidence_score: decision.confidence,
        reasons: decision.reasons,
        audit_analysis: Some(audit),
    }))
}

/// GET /api/v1/history
///
/// Returns the most recent ledger records, newest first, capped at
/// [`HISTORY_LIMIT`].
pub async fn history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LedgerRecord>>, AppError> {
    let records = state.ledger.recent(HISTORY_LIMIT).await?;
    Ok(Json(records))
}
