//! Assessment payload encoder
//!
//! Encodes an [`Assessment`] into a JSON payload with producer and timing metadata.

use crate::error::ScoreError;
use crate::types::{
    Assessment, AssessmentPayload, PayloadAdjustment, PayloadFeature, PayloadInputs,
    PayloadProducer, PayloadScore,
};
use crate::{MINDSCORE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current payload schema version
pub const PAYLOAD_VERSION: &str = "1.0.0";

/// Assessment encoder
pub struct AssessmentEncoder {
    instance_id: String,
}

impl Default for AssessmentEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode an assessment into a payload
    pub fn encode(&self, assessment: &Assessment) -> AssessmentPayload {
        let outcome = &assessment.outcome;

        let producer = PayloadProducer {
            name: PRODUCER_NAME.to_string(),
            version: MINDSCORE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let features = assessment
            .features
            .iter()
            .map(|(name, value)| PayloadFeature {
                name: name.to_string(),
                value,
            })
            .collect();

        let score = PayloadScore {
            raw: outcome.raw,
            clamped: outcome.clamped,
            band: outcome.band,
            color: outcome.band.color().to_string(),
            advice: outcome.band.advice().to_string(),
        };

        let adjustment = assessment.adjustment.as_ref().map(|a| PayloadAdjustment {
            category: a.category.clone(),
            adjustment: a.score.adjustment,
            adjusted: a.score.adjusted,
            band: a.score.band,
            color: a.score.band.color().to_string(),
            advice: a.score.band.advice().to_string(),
            tip: a.tip.clone(),
        });

        AssessmentPayload {
            payload_version: PAYLOAD_VERSION.to_string(),
            producer,
            computed_at_utc: Utc::now().to_rfc3339(),
            inputs: PayloadInputs {
                screen_hours: assessment.screen_hours,
                exercise_hours: assessment.exercise_hours,
            },
            features,
            fallback_features: assessment.fallback_features,
            score,
            adjustment,
            what_if: assessment.what_if,
            target: assessment.target,
        }
    }

    /// Encode to a compact JSON string
    pub fn encode_to_json(&self, assessment: &Assessment) -> Result<String, ScoreError> {
        serde_json::to_string(&self.encode(assessment)).map_err(ScoreError::JsonError)
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json_pretty(&self, assessment: &Assessment) -> Result<String, ScoreError> {
        serde_json::to_string_pretty(&self.encode(assessment)).map_err(ScoreError::JsonError)
    }
}
