//! Engine orchestration
//!
//! This module provides the public API for assessing habit inputs against a loaded
//! model. It orchestrates the full flow from request to payload:
//! Request → Features → Score → Adjustment → What-if → Inverse → Payload.

use crate::config::EngineConfig;
use crate::encoder::AssessmentEncoder;
use crate::error::ScoreError;
use crate::features::{FeatureLayout, FeatureVector};
use crate::inverse::solve_required_exercise_delta;
use crate::model::{load_model_file, LinearRegression, Predictable};
use crate::scoring::{score_features, score_with_layout, AdjustedScore, ScoreOutcome};
use crate::simulate::{simulate_with_layout, WhatIfOutcome};
use crate::types::{AppliedAdjustment, Assessment, AssessmentRequest, TargetEstimate};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Assess a request JSON against a model JSON (stateless, one-shot).
///
/// Uses the default configuration.
///
/// # Example
/// ```ignore
/// let payload_json = assess_to_json(model_json, request_json)?;
/// ```
pub fn assess_to_json(model_json: String, request_json: String) -> Result<String, ScoreError> {
    let engine = ScoreEngine::from_model_json(&model_json, EngineConfig::default())?;
    engine.assess_json(&request_json)
}

/// Scoring engine over one loaded, immutable model.
///
/// The engine never mutates the model or itself after construction, so a single
/// instance can be shared across threads behind an `Arc`.
pub struct ScoreEngine {
    model: Arc<dyn Predictable>,
    layout: FeatureLayout,
    config: EngineConfig,
    encoder: AssessmentEncoder,
}

impl ScoreEngine {
    /// Create an engine over a shared model
    pub fn new(model: Arc<dyn Predictable>, config: EngineConfig) -> Result<Self, ScoreError> {
        config.validate()?;

        let layout = FeatureLayout::for_model(model.as_ref());
        if layout.is_fallback() && model.feature_names().is_some() {
            warn!("model declares an empty feature list, using fallback feature names");
        }
        debug!(
            features = layout.len(),
            unknown = layout.unknown_count(),
            fallback = layout.is_fallback(),
            linear = model.as_linear().is_some(),
            "resolved feature layout"
        );

        Ok(Self {
            model,
            layout,
            config,
            encoder: AssessmentEncoder::new(),
        })
    }

    /// Create an engine owning the given model
    pub fn from_model<M: Predictable + 'static>(
        model: M,
        config: EngineConfig,
    ) -> Result<Self, ScoreError> {
        Self::new(Arc::new(model), config)
    }

    /// Create an engine from a JSON model artifact
    pub fn from_model_json(json: &str, config: EngineConfig) -> Result<Self, ScoreError> {
        Self::from_model(LinearRegression::from_json(json)?, config)
    }

    /// Create an engine from a model file on disk
    pub fn from_model_file(path: &Path, config: EngineConfig) -> Result<Self, ScoreError> {
        let model = load_model_file(path)?;
        debug!(path = %path.display(), "loaded model");
        Self::from_model(model, config)
    }

    pub fn model(&self) -> &dyn Predictable {
        self.model.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Feature vector the model is fed for the given inputs
    pub fn prepare_features(&self, screen_hours: f64, exercise_hours: f64) -> FeatureVector {
        self.layout.resolve(screen_hours, exercise_hours)
    }

    /// Score the given inputs with the configured thresholds
    pub fn score(&self, screen_hours: f64, exercise_hours: f64) -> ScoreOutcome {
        score_with_layout(
            self.model.as_ref(),
            &self.layout,
            screen_hours,
            exercise_hours,
            &self.config.thresholds,
        )
    }

    /// What-if evaluation with the configured input bounds
    pub fn simulate(
        &self,
        screen_hours: f64,
        exercise_hours: f64,
        delta_screen: f64,
        delta_exercise: f64,
    ) -> WhatIfOutcome {
        simulate_with_layout(
            self.model.as_ref(),
            &self.layout,
            screen_hours,
            exercise_hours,
            delta_screen,
            delta_exercise,
            &self.config.bounds,
        )
    }

    /// Signed exercise delta (hours) to reach a target, `None` when not invertible
    pub fn estimate_required_exercise_delta(
        &self,
        screen_hours: f64,
        exercise_hours: f64,
        target_score: f64,
    ) -> Option<f64> {
        self.target_estimate(screen_hours, exercise_hours, target_score)
            .required_exercise_delta_hours
    }

    fn target_estimate(
        &self,
        screen_hours: f64,
        exercise_hours: f64,
        target_score: f64,
    ) -> TargetEstimate {
        let solved = solve_required_exercise_delta(
            self.model.as_ref(),
            screen_hours,
            exercise_hours,
            target_score,
        );
        if let Err(reason) = &solved {
            debug!(%reason, target_score, "inverse estimate unavailable");
        }
        TargetEstimate::from_solve(target_score, solved)
    }

    /// Run a full assessment
    pub fn assess(&self, request: &AssessmentRequest) -> Result<Assessment, ScoreError> {
        request.validate()?;

        let defaults = &self.config.defaults;
        let screen_hours = request.screen_hours.unwrap_or(defaults.screen_hours);
        let exercise_hours = request.exercise_hours.unwrap_or(defaults.exercise_hours);
        let target_score = request.target_score.unwrap_or(defaults.target_score);

        // Stage 1: Canonicalize features
        let features = self.prepare_features(screen_hours, exercise_hours);

        // Stage 2: Score the same vector that goes into the payload
        let outcome = score_features(self.model.as_ref(), &features, &self.config.thresholds);

        // Stage 3: Contextual adjustment
        let adjustment = match &request.category {
            Some(category) => {
                let entry = self.config.adjustment(category)?;
                Some(AppliedAdjustment {
                    category: category.clone(),
                    score: AdjustedScore::from_outcome(
                        &outcome,
                        entry.adjustment,
                        &self.config.thresholds,
                    ),
                    tip: entry.tip.clone(),
                })
            }
            None => None,
        };

        // Stage 4: What-if
        let what_if = request.what_if.map(|w| {
            self.simulate(
                screen_hours,
                exercise_hours,
                w.delta_screen_hours,
                w.delta_exercise_hours,
            )
        });

        // Stage 5: Inverse solve
        let target = self.target_estimate(screen_hours, exercise_hours, target_score);

        debug!(
            raw = outcome.raw,
            clamped = outcome.clamped,
            band = %outcome.band,
            adjusted = adjustment.is_some(),
            "assessment complete"
        );

        Ok(Assessment {
            screen_hours,
            exercise_hours,
            features,
            fallback_features: self.layout.is_fallback(),
            outcome,
            adjustment,
            what_if,
            target,
        })
    }

    /// Assess a request JSON and return the payload JSON
    pub fn assess_json(&self, request_json: &str) -> Result<String, ScoreError> {
        let request = AssessmentRequest::from_json(request_json)?;
        let assessment = self.assess(&request)?;
        self.encoder.encode_to_json(&assessment)
    }

    /// Encode an assessment with this engine's encoder
    pub fn encode(&self, assessment: &Assessment) -> Result<String, ScoreError> {
        self.encoder.encode_to_json(assessment)
    }

    /// Encode an assessment as pretty-printed JSON
    pub fn encode_pretty(&self, assessment: &Assessment) -> Result<String, ScoreError> {
        self.encoder.encode_to_json_pretty(assessment)
    }
}
