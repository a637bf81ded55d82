use crate::models::{Decision, EmploymentStatus, LoanApplication};
use rand::Rng;
use std::sync::Arc;

/// Source of the random perturbation added to every score.
///
/// Injectable so tests can pin the draw; production draws uniformly from
/// [-0.1, 0.1] on each call.
pub trait NoiseSource: Send + Sync {
    fn sample(&self) -> f64;
}

/// Production noise source.
pub struct UniformNoise;

impl NoiseSource for UniformNoise {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen_range(-0.1..=0.1)
    }
}

/// Simulated loan-approval model: a deterministic rule evaluator plus a
/// bounded random perturbation. Stateless, no locking required.
#[derive(Clone)]
pub struct ScoringPolicy {
    noise: Arc<dyn NoiseSource>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringPolicy {
    pub fn new() -> Self {
        Self {
            noise: Arc::new(UniformNoise),
        }
    }

    pub fn with_noise(noise: Arc<dyn NoiseSource>) -> Self {
        Self { noise }
    }

    /// Scores one application into a decision.
    ///
    /// Base score: +0.5 for credit score above 700, +0.3 for income above
    /// 30000, +0.2 for employed status. The perturbation can drive the final
    /// confidence below zero; only the upper end is clamped at 1.0. Approval
    /// requires confidence strictly above 0.6.
    pub fn score(&self, application: &LoanApplication) -> Decision {
        let mut score = 0.0;
        if application.credit_score > 700 {
            score += 0.5;
        }
        if application.applicant_income > 30000.0 {
            score += 0.3;
        }
        if application.employment_status == EmploymentStatus::Employed {
            score += 0.2;
        }

        let confidence = (score + self.noise.sample()).min(1.0);
        let approved = confidence > 0.6;

        let mut reasons = Vec::new();
        if !approved {
            if application.credit_score <= 600 {
                reasons.push("Credit score below 600".to_string());
            }
            if application.applicant_income < 30000.0 {
                reasons.push("Income too low for loan amount".to_string());
            }
            if !matches!(
                application.employment_status,
                EmploymentStatus::Employed | EmploymentStatus::SelfEmployed
            ) {
                reasons.push("Employment status required".to_string());
            }
            // A denial always carries at least one reason, even when no
            // individual rule tripped (e.g. mid-range profile plus noise).
            if reasons.is_empty() {
                reasons.push("Confidence below approval threshold".to_string());
            }
        }

        Decision {
            approved,
            confidence: round2(confidence),
            reasons,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
