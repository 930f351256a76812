//! Score clamping and severity bands
//!
//! Raw model output is unbounded. It is clamped to [0, 100] once, and again after a
//! contextual adjustment is added, so the base and adjusted scores both stay bounded.

use crate::error::ScoreError;
use crate::features::{FeatureLayout, FeatureVector};
use crate::model::Predictable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest possible score
pub const SCORE_MIN: f64 = 0.0;

/// Highest possible score
pub const SCORE_MAX: f64 = 100.0;

/// Clamp a value onto the score scale. NaN maps to the bottom of the scale.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return SCORE_MIN;
    }
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// Severity category of a clamped score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBand {
    Critical,
    Moderate,
    Good,
}

impl SeverityBand {
    /// Static advice shown alongside the score
    pub fn advice(self) -> &'static str {
        match self {
            Self::Good => "Excellent! Your mental health appears strong. Keep it up!",
            Self::Moderate => {
                "You're doing okay, but there's room to improve. Try reducing screen time or moving more!"
            }
            Self::Critical => {
                "Your score is low. Consider healthier routines. You're not alone, start small!"
            }
        }
    }

    /// Display color (hex)
    pub fn color(self) -> &'static str {
        match self {
            Self::Good => "#C8E6C9",
            Self::Moderate => "#FFF9C4",
            Self::Critical => "#FFCDD2",
        }
    }
}

impl fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Moderate => write!(f, "moderate"),
            Self::Good => write!(f, "good"),
        }
    }
}

/// Band boundaries: below `moderate_from` is Critical, below `good_from` is Moderate,
/// everything else is Good.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    pub moderate_from: f64,
    pub good_from: f64,
}

impl BandThresholds {
    /// {<40 Critical, 40-69 Moderate, >=70 Good}
    pub const LENIENT: Self = Self {
        moderate_from: 40.0,
        good_from: 70.0,
    };

    /// {<60 Critical, 60-79 Moderate, >=80 Good}
    pub const STRICT: Self = Self {
        moderate_from: 60.0,
        good_from: 80.0,
    };

    pub fn new(moderate_from: f64, good_from: f64) -> Result<Self, ScoreError> {
        let thresholds = Self {
            moderate_from,
            good_from,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        let in_scale = |v: f64| v.is_finite() && (SCORE_MIN..=SCORE_MAX).contains(&v);
        if !in_scale(self.moderate_from) || !in_scale(self.good_from) {
            return Err(ScoreError::InvalidConfig(format!(
                "band thresholds must lie in [{SCORE_MIN}, {SCORE_MAX}]"
            )));
        }
        if self.moderate_from > self.good_from {
            return Err(ScoreError::InvalidConfig(format!(
                "moderate threshold {} exceeds good threshold {}",
                self.moderate_from, self.good_from
            )));
        }
        Ok(())
    }

    /// Band for an already clamped score
    pub fn band(&self, clamped: f64) -> SeverityBand {
        if clamped >= self.good_from {
            SeverityBand::Good
        } else if clamped >= self.moderate_from {
            SeverityBand::Moderate
        } else {
            SeverityBand::Critical
        }
    }
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self::STRICT
    }
}

/// Result of a single model evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    /// Unclamped model output
    pub raw: f64,
    pub clamped: f64,
    pub band: SeverityBand,
}

/// Evaluate a model for the given inputs and clamp the result
pub fn score<M: Predictable + ?Sized>(
    model: &M,
    screen_hours: f64,
    exercise_hours: f64,
    thresholds: &BandThresholds,
) -> ScoreOutcome {
    let layout = FeatureLayout::for_model(model);
    score_with_layout(model, &layout, screen_hours, exercise_hours, thresholds)
}

/// Same as [`score`] but with a layout resolved ahead of time
pub fn score_with_layout<M: Predictable + ?Sized>(
    model: &M,
    layout: &FeatureLayout,
    screen_hours: f64,
    exercise_hours: f64,
    thresholds: &BandThresholds,
) -> ScoreOutcome {
    score_features(model, &layout.resolve(screen_hours, exercise_hours), thresholds)
}

/// Score an already prepared feature vector
pub fn score_features<M: Predictable + ?Sized>(
    model: &M,
    features: &FeatureVector,
    thresholds: &BandThresholds,
) -> ScoreOutcome {
    let raw = model.predict(features);
    let clamped = clamp_score(raw);
    ScoreOutcome {
        raw,
        clamped,
        band: thresholds.band(clamped),
    }
}

pub(crate) fn raw_prediction<M: Predictable + ?Sized>(
    model: &M,
    layout: &FeatureLayout,
    screen_hours: f64,
    exercise_hours: f64,
) -> f64 {
    model.predict(&layout.resolve(screen_hours, exercise_hours))
}

/// Add a contextual adjustment to an already clamped score and clamp again
pub fn apply_adjustment(clamped: f64, adjustment: f64) -> f64 {
    clamp_score(clamp_score(clamped) + adjustment)
}

/// Score after a contextual adjustment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedScore {
    pub base: f64,
    pub adjustment: f64,
    pub adjusted: f64,
    pub band: SeverityBand,
}

impl AdjustedScore {
    pub fn from_outcome(
        outcome: &ScoreOutcome,
        adjustment: f64,
        thresholds: &BandThresholds,
    ) -> Self {
        let adjusted = apply_adjustment(outcome.clamped, adjustment);
        Self {
            base: outcome.clamped,
            adjustment,
            adjusted,
            band: thresholds.band(adjusted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;

    struct ConstantModel(f64);

    impl Predictable for ConstantModel {
        fn predict(&self, _features: &FeatureVector) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-12.0), 0.0);
        assert_eq!(clamp_score(55.5), 55.5);
        assert_eq!(clamp_score(240.0), 100.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(f64::INFINITY), 100.0);
    }

    #[test]
    fn test_strict_bands() {
        let t = BandThresholds::STRICT;
        assert_eq!(t.band(59.9), SeverityBand::Critical);
        assert_eq!(t.band(60.0), SeverityBand::Moderate);
        assert_eq!(t.band(79.9), SeverityBand::Moderate);
        assert_eq!(t.band(80.0), SeverityBand::Good);
    }

    #[test]
    fn test_lenient_bands() {
        let t = BandThresholds::LENIENT;
        assert_eq!(t.band(39.0), SeverityBand::Critical);
        assert_eq!(t.band(40.0), SeverityBand::Moderate);
        assert_eq!(t.band(70.0), SeverityBand::Good);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(BandThresholds::new(50.0, 75.0).is_ok());
        assert!(BandThresholds::new(80.0, 60.0).is_err());
        assert!(BandThresholds::new(-1.0, 60.0).is_err());
        assert!(BandThresholds::new(40.0, f64::NAN).is_err());
    }

    #[test]
    fn test_score_keeps_raw_output() {
        let outcome = score(&ConstantModel(130.0), 4.0, 0.5, &BandThresholds::STRICT);
        assert_eq!(outcome.raw, 130.0);
        assert_eq!(outcome.clamped, 100.0);
        assert_eq!(outcome.band, SeverityBand::Good);

        let outcome = score(&ConstantModel(-20.0), 4.0, 0.5, &BandThresholds::STRICT);
        assert_eq!(outcome.raw, -20.0);
        assert_eq!(outcome.clamped, 0.0);
        assert_eq!(outcome.band, SeverityBand::Critical);
    }

    #[test]
    fn test_two_stage_clamp() {
        let outcome = score(&ConstantModel(130.0), 0.0, 0.0, &BandThresholds::STRICT);
        let adjusted = AdjustedScore::from_outcome(&outcome, -50.0, &BandThresholds::STRICT);

        assert_eq!(adjusted.base, 100.0);
        assert_eq!(adjusted.adjusted, 50.0);
        assert_eq!(adjusted.band, SeverityBand::Critical);
    }

    #[test]
    fn test_adjustment_is_reclamped() {
        assert_eq!(apply_adjustment(95.0, 10.0), 100.0);
        assert_eq!(apply_adjustment(5.0, -10.0), 0.0);
        assert_eq!(apply_adjustment(70.0, 5.0), 75.0);
    }
}
