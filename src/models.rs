use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Employment status of a loan applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Employed,
    SelfEmployed,
    Unemployed,
    Retired,
    Freelance,
}

/// A loan application as submitted by the client.
///
/// Immutable once received. Field constraints are enforced by [`validate`]
/// before any scoring happens:
///
/// - `applicant_income` must be finite and strictly positive.
/// - `credit_score` must be within 300..=850 (both bounds inclusive).
/// - `loan_amount` must be finite and strictly positive.
///
/// [`validate`]: LoanApplication::validate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanApplication {
    /// Annual income of the applicant.
    pub applicant_income: f64,
    /// Credit score of the applicant.
    pub credit_score: i64,
    /// Requested loan amount.
    pub loan_amount: f64,
    /// Employment status of the applicant.
    pub employment_status: EmploymentStatus,
}

/// A single field-level constraint violation reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

impl LoanApplication {
    /// Validates the application against its field constraints.
    ///
    /// Returns every violated constraint, not just the first, so the caller
    /// gets a complete picture in one round trip.
    pub fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();

        if !self.applicant_income.is_finite() || self.applicant_income <= 0.0 {
            violations.push(FieldViolation {
                field: "applicant_income",
                message: "must be greater than 0",
            });
        }
        if !(300..=850).contains(&self.credit_score) {
            violations.push(FieldViolation {
                field: "credit_score",
                message: "must be between 300 and 850",
            });
        }
        if !self.loan_amount.is_finite() || self.loan_amount <= 0.0 {
            violations.push(FieldViolation {
                field: "loan_amount",
                message: "must be greater than 0",
            });
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Outcome of the scoring policy for one application. Never mutated after
/// creation; `reasons` is empty iff `approved`.
#[derive(Debug, Clone)]
pub struct Decision {
    pub approved: bool,
    /// Confidence rounded to 2 decimal places.
    pub confidence: f64,
    pub reasons: Vec<String>,
}

/// Compliance status assigned by an auditor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Cleared,
    Flagged,
    Unknown,
    Offline,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Cleared => "CLEARED",
            AuditStatus::Flagged => "FLAGGED",
            AuditStatus::Unknown => "UNKNOWN",
            AuditStatus::Offline => "OFFLINE",
        }
    }
}

/// Which auditor produced an [`AuditOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditMode {
    /// Remote auditor, LLM-backed reasoning.
    GenAi,
    /// Remote auditor, rule-based path.
    RuleBased,
    /// Inference-side fallback; the remote auditor could not be reached.
    LocalFallback,
}

/// A compliance review of one decision, shape-identical regardless of which
/// auditor produced it. Comments are always a list internally; interfaces
/// that need a single analysis string join them at the edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_id: Option<Uuid>,
    pub status: AuditStatus,
    pub compliance_score: f64,
    #[serde(default)]
    pub comments: Vec<String>,
    pub mode: AuditMode,
}

/// Unified response for `POST /api/v1/predict`.
///
/// `audit_analysis` stays nullable for schema compatibility, but the served
/// flow always fills it: the fallback auditor cannot fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub approved: bool,
    pub confidence_score: f64,
    pub reasons: Vec<String>,
    pub audit_analysis: Option<AuditOutcome>,
}

/// One append-only row in the decision ledger.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LedgerRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub applicant_income: f64,
    pub credit_score: i64,
    pub decision: String,
    pub audit_status: String,
    /// JSON-serialized list of audit comments.
    pub audit_comments: String,
}

impl LedgerRecord {
    /// Builds the ledger row for a completed request, after both the decision
    /// and the audit outcome are known.
    pub fn new(application: &LoanApplication, decision: &Decision, audit: &AuditOutcome) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            applicant_income: application.applicant_income,
            credit_score: application.credit_score,
            decision: if decision.approved { "Approved" } else { "Denied" }.to_string(),
            audit_status: audit.status.as_str().to_string(),
            audit_comments: serde_json::to_string(&audit.comments).unwrap_or_default(),
        }
    }
}
