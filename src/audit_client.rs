use crate::errors::AppError;
use crate::models::{AuditMode, AuditOutcome, AuditStatus, LoanApplication};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Failure modes of one remote audit attempt.
///
/// These never escalate into an [`AppError`]: the orchestrator always
/// recovers them with the local fallback auditor.
#[derive(Debug)]
pub enum GatewayError {
    /// The auditor did not answer within the configured deadline. Expected
    /// degraded condition, not an incident.
    Timeout,
    /// Connection, DNS or response-decoding failure.
    Unreachable(String),
    /// The auditor answered with a non-success status.
    BadStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Timeout => write!(f, "audit request timed out"),
            GatewayError::Unreachable(detail) => write!(f, "auditor unreachable: {}", detail),
            GatewayError::BadStatus { status, body } => {
                write!(f, "auditor returned {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for GatewayError {}

/// Raw response shape of the remote auditor.
///
/// Older auditor iterations answer with a single `detailed_analysis` string
/// instead of a `comments` list; both are accepted and normalized.
#[derive(Debug, Deserialize)]
struct RemoteAuditResponse {
    #[serde(default)]
    audit_id: Option<Uuid>,
    #[serde(default)]
    status: Option<AuditStatus>,
    compliance_score: f64,
    #[serde(default)]
    comments: Vec<String>,
    #[serde(default)]
    detailed_analysis: Option<String>,
    #[serde(default)]
    mode: Option<AuditMode>,
}

impl From<RemoteAuditResponse> for AuditOutcome {
    fn from(raw: RemoteAuditResponse) -> Self {
        let comments = if !raw.comments.is_empty() {
            raw.comments
        } else {
            raw.detailed_analysis
                .filter(|s| !s.is_empty())
                .map(|s| vec![s])
                .unwrap_or_default()
        };

        AuditOutcome {
            audit_id: raw.audit_id,
            status: raw.status.unwrap_or(AuditStatus::Unknown),
            compliance_score: raw.compliance_score,
            comments,
            mode: raw.mode.unwrap_or(AuditMode::GenAi),
        }
    }
}

/// Client for the remote compliance auditor.
///
/// Single attempt per request, bounded by a per-call timeout; no retries.
/// The caller decides fallback behavior.
#[derive(Clone)]
pub struct AuditorClient {
    client: reqwest::Client,
    base_url: String,
}

impl AuditorClient {
    /// Creates a new `AuditorClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the auditor service.
    /// * `timeout` - Deadline applied to every audit call.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create auditor client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }

    /// Submits one decision for compliance review.
    ///
    /// # Arguments
    ///
    /// * `decision_reason` - Primary reason for the decision, or the
    ///   "met all criteria" sentinel for approvals.
    /// * `application` - The applicant data the decision was based on.
    pub async fn request_audit(
        &self,
        decision_reason: &str,
        application: &LoanApplication,
    ) -> Result<AuditOutcome, GatewayError> {
        let url = format!("{}/audit", self.base_url);
        tracing::debug!("Requesting compliance audit: {}", url);

        let body = json!({
            "decision_reason": decision_reason,
            "applicant_data": application,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::BadStatus { status, body });
        }

        let raw: RemoteAuditResponse = response.json().await.map_err(classify)?;
        Ok(raw.into())
    }
}

fn classify(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Unreachable(err.to_string())
    }
}
