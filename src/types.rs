//! Request and payload types
//!
//! Requests come in from the presentation layer; assessments are the engine's
//! in-memory result; payloads are the JSON shape handed back out.

use crate::error::ScoreError;
use crate::features::FeatureVector;
use crate::inverse::InverseUnavailable;
use crate::scoring::{AdjustedScore, ScoreOutcome, SeverityBand};
use crate::simulate::WhatIfOutcome;
use serde::{Deserialize, Serialize};

// ============================================================================
// Requests
// ============================================================================

/// Input perturbation for a what-if evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WhatIfRequest {
    #[serde(default)]
    pub delta_screen_hours: f64,
    #[serde(default)]
    pub delta_exercise_hours: f64,
}

/// A single assessment request. Omitted inputs take the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    #[serde(default)]
    pub screen_hours: Option<f64>,
    #[serde(default)]
    pub exercise_hours: Option<f64>,
    /// Key into the configured adjustment table (e.g. a profession)
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub what_if: Option<WhatIfRequest>,
    #[serde(default)]
    pub target_score: Option<f64>,
}

impl AssessmentRequest {
    pub fn new(screen_hours: f64, exercise_hours: f64) -> Self {
        Self {
            screen_hours: Some(screen_hours),
            exercise_hours: Some(exercise_hours),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_what_if(mut self, delta_screen_hours: f64, delta_exercise_hours: f64) -> Self {
        self.what_if = Some(WhatIfRequest {
            delta_screen_hours,
            delta_exercise_hours,
        });
        self
    }

    pub fn with_target(mut self, target_score: f64) -> Self {
        self.target_score = Some(target_score);
        self
    }

    /// Parse a request from JSON
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reject inputs that cannot describe a day of habits.
    ///
    /// Values above the input domains are accepted; the engine clamps its outputs.
    pub fn validate(&self) -> Result<(), ScoreError> {
        for (name, value) in [
            ("screen_hours", self.screen_hours),
            ("exercise_hours", self.exercise_hours),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(ScoreError::InvalidRequest(format!(
                        "{name} must be a nonnegative number, got {v}"
                    )));
                }
            }
        }
        if let Some(target) = self.target_score {
            if !target.is_finite() {
                return Err(ScoreError::InvalidRequest(
                    "target_score must be finite".to_string(),
                ));
            }
        }
        if let Some(what_if) = &self.what_if {
            if !what_if.delta_screen_hours.is_finite() || !what_if.delta_exercise_hours.is_finite()
            {
                return Err(ScoreError::InvalidRequest(
                    "what_if deltas must be finite".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Assessment
// ============================================================================

/// Contextual adjustment applied to an assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedAdjustment {
    pub category: String,
    pub score: AdjustedScore,
    pub tip: Option<String>,
}

/// Inverse solve against a target score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetEstimate {
    pub target_score: f64,
    /// Signed hours of exercise to add; `None` when the model cannot be inverted
    pub required_exercise_delta_hours: Option<f64>,
    pub unavailable_reason: Option<InverseUnavailable>,
}

impl TargetEstimate {
    pub fn from_solve(target_score: f64, solved: Result<f64, InverseUnavailable>) -> Self {
        match solved {
            Ok(delta) => Self {
                target_score,
                required_exercise_delta_hours: Some(delta),
                unavailable_reason: None,
            },
            Err(reason) => Self {
                target_score,
                required_exercise_delta_hours: None,
                unavailable_reason: Some(reason),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        self.required_exercise_delta_hours.is_some()
    }
}

/// Full result of assessing one request
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub screen_hours: f64,
    pub exercise_hours: f64,
    pub features: FeatureVector,
    /// True when the model declared no features and the fallback pair was used
    pub fallback_features: bool,
    pub outcome: ScoreOutcome,
    pub adjustment: Option<AppliedAdjustment>,
    pub what_if: Option<WhatIfOutcome>,
    pub target: TargetEstimate,
}

impl Assessment {
    /// Final score: adjusted when a category was applied, otherwise the clamped score
    pub fn final_score(&self) -> f64 {
        self.adjustment
            .as_ref()
            .map(|a| a.score.adjusted)
            .unwrap_or(self.outcome.clamped)
    }

    pub fn final_band(&self) -> SeverityBand {
        self.adjustment
            .as_ref()
            .map(|a| a.score.band)
            .unwrap_or(self.outcome.band)
    }
}

// ============================================================================
// Payload
// ============================================================================

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Inputs as evaluated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayloadInputs {
    pub screen_hours: f64,
    pub exercise_hours: f64,
}

/// One model feature as evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadFeature {
    pub name: String,
    pub value: f64,
}

/// Score namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadScore {
    pub raw: f64,
    pub clamped: f64,
    pub band: SeverityBand,
    pub color: String,
    pub advice: String,
}

/// Contextual adjustment namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadAdjustment {
    pub category: String,
    pub adjustment: f64,
    pub adjusted: f64,
    pub band: SeverityBand,
    pub color: String,
    pub advice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

/// Assessment payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentPayload {
    pub payload_version: String,
    pub producer: PayloadProducer,
    pub computed_at_utc: String,
    pub inputs: PayloadInputs,
    pub features: Vec<PayloadFeature>,
    pub fallback_features: bool,
    pub score: PayloadScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<PayloadAdjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub what_if: Option<WhatIfOutcome>,
    pub target: TargetEstimate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_partial_json() {
        let request = AssessmentRequest::from_json(r#"{ "screen_hours": 6.5 }"#).unwrap();
        assert_eq!(request.screen_hours, Some(6.5));
        assert!(request.exercise_hours.is_none());
        assert!(request.category.is_none());
    }

    #[test]
    fn test_request_with_what_if() {
        let json = r#"{
            "screen_hours": 6.0,
            "exercise_hours": 0.5,
            "category": "Student",
            "what_if": { "delta_screen_hours": -2.0 },
            "target_score": 85.0
        }"#;
        let request = AssessmentRequest::from_json(json).unwrap();
        let what_if = request.what_if.unwrap();
        assert_eq!(what_if.delta_screen_hours, -2.0);
        assert_eq!(what_if.delta_exercise_hours, 0.0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_negative_input_rejected() {
        let request = AssessmentRequest::new(-1.0, 0.5);
        assert!(matches!(
            request.validate(),
            Err(ScoreError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_above_domain_input_accepted() {
        assert!(AssessmentRequest::new(20.0, 9.0).validate().is_ok());
    }

    #[test]
    fn test_target_estimate_from_solve() {
        let ok = TargetEstimate::from_solve(80.0, Ok(0.75));
        assert!(ok.is_available());
        assert!(ok.unavailable_reason.is_none());

        let unavailable = TargetEstimate::from_solve(80.0, Err(InverseUnavailable::NotLinear));
        assert!(!unavailable.is_available());
        assert_eq!(
            unavailable.unavailable_reason,
            Some(InverseUnavailable::NotLinear)
        );
    }
}
