//! Engine configuration
//!
//! Everything that varies between deployments lives here rather than in code: band
//! thresholds, input domains, input defaults and the contextual adjustment table.

use crate::error::ScoreError;
use crate::scoring::{BandThresholds, SCORE_MAX, SCORE_MIN};
use crate::simulate::InputBounds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default daily screen time (hours)
pub const DEFAULT_SCREEN_HOURS: f64 = 4.0;

/// Default daily exercise (hours)
pub const DEFAULT_EXERCISE_HOURS: f64 = 0.5;

/// Default target score for the inverse solver
pub const DEFAULT_TARGET_SCORE: f64 = 80.0;

/// Input defaults used when a request omits a value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputDefaults {
    pub screen_hours: f64,
    pub exercise_hours: f64,
    pub target_score: f64,
}

impl Default for InputDefaults {
    fn default() -> Self {
        Self {
            screen_hours: DEFAULT_SCREEN_HOURS,
            exercise_hours: DEFAULT_EXERCISE_HOURS,
            target_score: DEFAULT_TARGET_SCORE,
        }
    }
}

/// Additive adjustment and tip for one external category (e.g. a profession)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextAdjustment {
    pub adjustment: f64,
    #[serde(default)]
    pub tip: Option<String>,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: BandThresholds,
    pub bounds: InputBounds,
    pub defaults: InputDefaults,
    /// Keyed by category name
    pub adjustments: BTreeMap<String, ContextAdjustment>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: BandThresholds::default(),
            bounds: InputBounds::default(),
            defaults: InputDefaults::default(),
            adjustments: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ScoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ScoreError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        self.thresholds.validate()?;
        self.bounds.validate()?;

        let target = self.defaults.target_score;
        if !target.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&target) {
            return Err(ScoreError::InvalidConfig(format!(
                "default target score {target} is outside [{SCORE_MIN}, {SCORE_MAX}]"
            )));
        }
        if !self.defaults.screen_hours.is_finite() || self.defaults.screen_hours < 0.0 {
            return Err(ScoreError::InvalidConfig(
                "default screen hours must be a nonnegative number".to_string(),
            ));
        }
        if !self.defaults.exercise_hours.is_finite() || self.defaults.exercise_hours < 0.0 {
            return Err(ScoreError::InvalidConfig(
                "default exercise hours must be a nonnegative number".to_string(),
            ));
        }

        for (category, adj) in &self.adjustments {
            if !adj.adjustment.is_finite() {
                return Err(ScoreError::InvalidConfig(format!(
                    "adjustment for {category} is not finite"
                )));
            }
        }
        Ok(())
    }

    /// Look up a category's adjustment
    pub fn adjustment(&self, category: &str) -> Result<&ContextAdjustment, ScoreError> {
        self.adjustments
            .get(category)
            .ok_or_else(|| ScoreError::UnknownCategory(category.to_string()))
    }
}
