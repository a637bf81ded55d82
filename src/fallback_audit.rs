use crate::models::{AuditMode, AuditOutcome, AuditStatus, LoanApplication};

/// Analysis comment attached when no rule raised a flag.
pub const CLEARED_ANALYSIS: &str = "Automated Check Cleared.";

/// Result of the shared rule engine, before being shaped into an
/// [`AuditOutcome`] by a specific auditor surface.
#[derive(Debug)]
pub struct RuleReview {
    pub flagged: bool,
    pub comments: Vec<String>,
}

/// Rule-based compliance review shared by the local fallback and the
/// standalone auditor service.
///
/// Rules are independent and can co-occur:
/// - an empty decision reason lacks transparent reasoning;
/// - a reason citing employment while the credit score exceeds 700 suggests
///   a biased rejection.
pub fn review(decision_reason: &str, credit_score: i64) -> RuleReview {
    let mut flagged = false;
    let mut comments = Vec::new();

    if decision_reason.is_empty() {
        flagged = true;
        comments.push("REDACTED: Decision lacks transparent reasoning.".to_string());
    }

    if decision_reason.to_lowercase().contains("employ") && credit_score > 700 {
        flagged = true;
        comments.push(
            "ADVISORY: Potential bias detected. High credit score rejected due to employment status."
                .to_string(),
        );
    }

    RuleReview { flagged, comments }
}

/// Audits a decision locally when the remote auditor is unavailable.
///
/// Pure function, no I/O, always succeeds; this is what guarantees the
/// orchestrator can answer with a complete audit analysis in degraded mode.
pub fn audit_locally(decision_reason: &str, application: &LoanApplication) -> AuditOutcome {
    let review = review(decision_reason, application.credit_score);

    let comments = if review.comments.is_empty() {
        vec![CLEARED_ANALYSIS.to_string()]
    } else {
        review.comments
    };

    AuditOutcome {
        audit_id: None,
        status: if review.flagged {
            AuditStatus::Flagged
        } else {
            AuditStatus::Cleared
        },
        compliance_score: if review.flagged { 0.4 } else { 1.0 },
        comments,
        mode: AuditMode::LocalFallback,
    }
}
