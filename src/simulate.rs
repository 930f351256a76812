//! What-if simulation
//!
//! Re-runs the model with perturbed inputs. Perturbed inputs are clamped to their
//! domains before evaluation; contextual adjustments are never applied here.

use crate::error::ScoreError;
use crate::features::FeatureLayout;
use crate::model::Predictable;
use crate::scoring::{clamp_score, raw_prediction};
use serde::{Deserialize, Serialize};

/// Closed interval for one input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputRange {
    pub min: f64,
    pub max: f64,
}

impl InputRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

/// Input domains for screen time and exercise, in hours
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputBounds {
    pub screen_hours: InputRange,
    pub exercise_hours: InputRange,
}

impl InputBounds {
    pub fn validate(&self) -> Result<(), ScoreError> {
        for (name, range) in [
            ("screen_hours", &self.screen_hours),
            ("exercise_hours", &self.exercise_hours),
        ] {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(ScoreError::InvalidConfig(format!(
                    "{name} bounds [{}, {}] are not a valid interval",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }
}

impl Default for InputBounds {
    fn default() -> Self {
        Self {
            screen_hours: InputRange::new(0.0, 12.0),
            exercise_hours: InputRange::new(0.0, 4.0),
        }
    }
}

/// Outcome of a what-if evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WhatIfOutcome {
    /// Screen hours actually evaluated, after clamping
    pub screen_hours: f64,
    /// Exercise hours actually evaluated, after clamping
    pub exercise_hours: f64,
    pub base_score: f64,
    pub simulated_score: f64,
    /// `simulated_score - base_score`
    pub difference: f64,
}

/// Evaluate the model at the base inputs and at the perturbed, clamped inputs
pub fn simulate<M: Predictable + ?Sized>(
    model: &M,
    base_screen: f64,
    base_exercise: f64,
    delta_screen: f64,
    delta_exercise: f64,
    bounds: &InputBounds,
) -> WhatIfOutcome {
    let layout = FeatureLayout::for_model(model);
    simulate_with_layout(
        model,
        &layout,
        base_screen,
        base_exercise,
        delta_screen,
        delta_exercise,
        bounds,
    )
}

/// Same as [`simulate`] but with a layout resolved ahead of time
pub fn simulate_with_layout<M: Predictable + ?Sized>(
    model: &M,
    layout: &FeatureLayout,
    base_screen: f64,
    base_exercise: f64,
    delta_screen: f64,
    delta_exercise: f64,
    bounds: &InputBounds,
) -> WhatIfOutcome {
    let base_score = clamp_score(raw_prediction(model, layout, base_screen, base_exercise));

    let screen_hours = bounds.screen_hours.clamp(base_screen + delta_screen);
    let exercise_hours = bounds.exercise_hours.clamp(base_exercise + delta_exercise);
    let simulated_score = clamp_score(raw_prediction(model, layout, screen_hours, exercise_hours));

    WhatIfOutcome {
        screen_hours,
        exercise_hours,
        base_score,
        simulated_score,
        difference: simulated_score - base_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearRegression;

    fn model() -> LinearRegression {
        LinearRegression::new(
            80.0,
            vec![-4.0, 6.0],
            Some(vec!["Screen_Time_Hours".into(), "Exercise_Hours".into()]),
        )
    }

    #[test]
    fn test_screen_is_clamped_to_upper_bound() {
        let outcome = simulate(&model(), 11.5, 1.0, 2.0, 0.0, &InputBounds::default());
        assert_eq!(outcome.screen_hours, 12.0);
        assert_eq!(outcome.exercise_hours, 1.0);
        // 80 - 48 + 6
        assert!((outcome.simulated_score - 38.0).abs() < 1e-9);
    }

    #[test]
    fn test_exercise_is_clamped_to_lower_bound() {
        let outcome = simulate(&model(), 2.0, 0.5, 0.0, -3.0, &InputBounds::default());
        assert_eq!(outcome.exercise_hours, 0.0);
    }

    #[test]
    fn test_difference_is_signed() {
        let outcome = simulate(&model(), 4.0, 1.0, -2.0, 0.5, &InputBounds::default());
        // base: 80 - 16 + 6 = 70; simulated: 80 - 8 + 9 = 81
        assert!((outcome.base_score - 70.0).abs() < 1e-9);
        assert!((outcome.simulated_score - 81.0).abs() < 1e-9);
        assert!((outcome.difference - 11.0).abs() < 1e-9);

        let worse = simulate(&model(), 4.0, 1.0, 3.0, 0.0, &InputBounds::default());
        assert!(worse.difference < 0.0);
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let bounds = InputBounds::default();
        let a = simulate(&model(), 6.0, 0.25, 1.5, 0.75, &bounds);
        let b = simulate(&model(), 6.0, 0.25, 1.5, 0.75, &bounds);
        assert_eq!(a, b);
    }

    #[test]
    fn test_bounds_validation() {
        assert!(InputBounds::default().validate().is_ok());

        let broken = InputBounds {
            screen_hours: InputRange::new(12.0, 0.0),
            ..InputBounds::default()
        };
        assert!(broken.validate().is_err());
    }
}
