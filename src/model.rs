//! Scoring model capabilities
//!
//! Models are opaque and pre-trained. Every model can predict from a feature vector;
//! some additionally expose linear metadata (per-feature coefficients aligned with
//! their declared names), which enables the inverse solver.

use crate::error::ScoreError;
use crate::features::{FeatureVector, FALLBACK_FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A model that turns a feature vector into a single real number
pub trait Predictable: Send + Sync {
    /// Ordered feature names the model expects, if it declares any
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Predict from a vector ordered as [`Predictable::feature_names`] (or the fallback pair)
    fn predict(&self, features: &FeatureVector) -> f64;

    /// Linear metadata, when the model exposes it
    fn as_linear(&self) -> Option<&dyn LinearInspectable> {
        None
    }
}

/// Linear metadata exposed by a model
pub trait LinearInspectable {
    /// Per-feature coefficients aligned by position with the declared feature names
    fn coefficients(&self) -> Option<&[f64]>;

    fn intercept(&self) -> f64;
}

/// Ordinary least squares model `y = intercept + sum(coef_i * x_i)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    #[serde(alias = "intercept_")]
    pub intercept: f64,
    #[serde(alias = "coef_")]
    pub coefficients: Vec<f64>,
    #[serde(default, alias = "feature_names_in_")]
    pub feature_names: Option<Vec<String>>,
}

impl LinearRegression {
    pub fn new(intercept: f64, coefficients: Vec<f64>, feature_names: Option<Vec<String>>) -> Self {
        Self {
            intercept,
            coefficients,
            feature_names,
        }
    }

    /// Check that coefficients line up with the features the model will be fed
    pub fn validate(&self) -> Result<(), ScoreError> {
        if !self.intercept.is_finite() {
            return Err(ScoreError::InvalidModel(
                "intercept must be finite".to_string(),
            ));
        }
        if let Some(i) = self.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(ScoreError::InvalidModel(format!(
                "coefficient {i} is not finite"
            )));
        }

        let expected = match &self.feature_names {
            Some(names) if !names.is_empty() => names.len(),
            _ => FALLBACK_FEATURE_NAMES.len(),
        };
        if self.coefficients.len() != expected {
            return Err(ScoreError::InvalidModel(format!(
                "expected {} coefficients, found {}",
                expected,
                self.coefficients.len()
            )));
        }
        Ok(())
    }

    /// Parse and validate a model artifact from JSON
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Serialize the model artifact to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Predictable for LinearRegression {
    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict(&self, features: &FeatureVector) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.values())
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    fn as_linear(&self) -> Option<&dyn LinearInspectable> {
        Some(self)
    }
}

impl LinearInspectable for LinearRegression {
    fn coefficients(&self) -> Option<&[f64]> {
        Some(&self.coefficients)
    }

    fn intercept(&self) -> f64 {
        self.intercept
    }
}

/// Load a model artifact from disk.
///
/// A missing file is reported as [`ScoreError::ModelNotFound`]; callers treat it
/// as fatal for the session.
pub fn load_model_file(path: &Path) -> Result<LinearRegression, ScoreError> {
    if !path.exists() {
        return Err(ScoreError::ModelNotFound(path.display().to_string()));
    }
    let json = fs::read_to_string(path)?;
    LinearRegression::from_json(&json)
}
