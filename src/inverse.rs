//! Linear inverse solver
//!
//! Estimates how many hours of exercise must be added (or removed) to move a linear
//! model's output to a target score.
//!
//! The estimate is first-order. It is exact only when the model is linear in the
//! exercise feature and every other feature is held fixed. It inverts the model's raw
//! output, not the display-clamped score, so a model currently predicting 130 needs a
//! negative delta to reach a target of 100.

use crate::features::{FeatureLayout, FeatureSemantic};
use crate::model::Predictable;
use crate::scoring::raw_prediction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coefficients smaller than this cannot be inverted
pub const MIN_COEFFICIENT_MAGNITUDE: f64 = 1e-9;

/// Why no inverse estimate could be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InverseUnavailable {
    /// The model exposes no linear metadata
    NotLinear,
    /// The model declares no feature names to align coefficients with
    MissingFeatureNames,
    /// The model exposes no coefficients
    MissingCoefficients,
    /// Coefficient count differs from the declared name count
    MisalignedCoefficients,
    /// No declared feature encodes exercise
    NoExerciseFeature,
    /// The exercise coefficient is effectively zero
    FlatCoefficient,
}

impl fmt::Display for InverseUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NotLinear => "model does not expose linear coefficients",
            Self::MissingFeatureNames => "model does not declare its feature names",
            Self::MissingCoefficients => "model does not expose coefficients",
            Self::MisalignedCoefficients => "coefficients do not align with feature names",
            Self::NoExerciseFeature => "model has no exercise feature",
            Self::FlatCoefficient => "model is insensitive to exercise",
        };
        f.write_str(msg)
    }
}

/// Exercise feature chosen for inversion
#[derive(Debug, Clone, Copy, PartialEq)]
struct ExerciseTerm {
    coefficient: f64,
    units_per_hour: f64,
}

/// Pick the exercise coefficient, preferring an hours feature over a minutes one
fn exercise_term<M: Predictable + ?Sized>(model: &M) -> Result<ExerciseTerm, InverseUnavailable> {
    let linear = model.as_linear().ok_or(InverseUnavailable::NotLinear)?;
    let names = model
        .feature_names()
        .filter(|names| !names.is_empty())
        .ok_or(InverseUnavailable::MissingFeatureNames)?;
    let coefficients = linear
        .coefficients()
        .ok_or(InverseUnavailable::MissingCoefficients)?;
    if coefficients.len() != names.len() {
        return Err(InverseUnavailable::MisalignedCoefficients);
    }

    let find = |wanted: FeatureSemantic| {
        names
            .iter()
            .position(|name| FeatureSemantic::from_name(name) == wanted)
            .map(|i| (i, wanted))
    };
    let (index, semantic) = find(FeatureSemantic::ExerciseHours)
        .or_else(|| find(FeatureSemantic::ExerciseMinutes))
        .ok_or(InverseUnavailable::NoExerciseFeature)?;

    let coefficient = coefficients[index];
    if coefficient.abs() < MIN_COEFFICIENT_MAGNITUDE {
        return Err(InverseUnavailable::FlatCoefficient);
    }

    Ok(ExerciseTerm {
        coefficient,
        units_per_hour: semantic.units_per_hour().unwrap_or(1.0),
    })
}

/// Whether the model can be inverted at all, independent of the inputs
pub fn inverse_availability<M: Predictable + ?Sized>(model: &M) -> Result<(), InverseUnavailable> {
    exercise_term(model).map(|_| ())
}

/// Signed exercise delta (hours) needed to reach `target_score`, or the reason none exists
pub fn solve_required_exercise_delta<M: Predictable + ?Sized>(
    model: &M,
    screen_hours: f64,
    exercise_hours: f64,
    target_score: f64,
) -> Result<f64, InverseUnavailable> {
    let term = exercise_term(model)?;
    let layout = FeatureLayout::for_model(model);
    let current = raw_prediction(model, &layout, screen_hours, exercise_hours);

    let delta_feature = (target_score - current) / term.coefficient;
    Ok(delta_feature / term.units_per_hour)
}

/// Signed exercise delta (hours) needed to reach `target_score`.
///
/// `None` means the model cannot be inverted; see [`solve_required_exercise_delta`]
/// for the reason.
pub fn estimate_required_exercise_delta<M: Predictable + ?Sized>(
    model: &M,
    screen_hours: f64,
    exercise_hours: f64,
    target_score: f64,
) -> Option<f64> {
    solve_required_exercise_delta(model, screen_hours, exercise_hours, target_score).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{prepare_features, FeatureVector};
    use crate::model::{LinearInspectable, LinearRegression};

    fn names(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|s| s.to_string()).collect())
    }

    /// Predicts linearly but hides its coefficients
    struct SealedModel(LinearRegression);

    impl Predictable for SealedModel {
        fn feature_names(&self) -> Option<&[String]> {
            self.0.feature_names()
        }

        fn predict(&self, features: &FeatureVector) -> f64 {
            self.0.predict(features)
        }
    }

    /// Exposes linear capability but no coefficients
    struct NoCoefficients {
        names: Vec<String>,
    }

    impl Predictable for NoCoefficients {
        fn feature_names(&self) -> Option<&[String]> {
            Some(&self.names)
        }

        fn predict(&self, _features: &FeatureVector) -> f64 {
            50.0
        }

        fn as_linear(&self) -> Option<&dyn LinearInspectable> {
            Some(self)
        }
    }

    impl LinearInspectable for NoCoefficients {
        fn coefficients(&self) -> Option<&[f64]> {
            None
        }

        fn intercept(&self) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_round_trip_exercise_hours() {
        let model =
            LinearRegression::new(10.0, vec![2.0, 5.0], names(&["Screen_Time_Hours", "Exercise_Hours"]));
        let target = model.predict(&prepare_features(&model, 4.0, 0.5)) + 5.0;

        let delta = estimate_required_exercise_delta(&model, 4.0, 0.5, target).unwrap();
        assert!((delta - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_minutes_feature_converts_to_hours() {
        // 0.25 points per minute of exercise = 15 points per hour
        let model = LinearRegression::new(
            40.0,
            vec![-2.0, 0.25],
            names(&["Screen_Time_Hours", "Exercise_Minutes"]),
        );
        let current = model.predict(&prepare_features(&model, 5.0, 1.0));

        let delta = estimate_required_exercise_delta(&model, 5.0, 1.0, current + 15.0).unwrap();
        assert!((delta - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hours_feature_preferred_over_minutes() {
        let model = LinearRegression::new(
            0.0,
            vec![1.0, 4.0, 8.0],
            names(&["Exercise_Minutes", "Exercise_Hours", "Screen_Time_Hours"]),
        );
        let current = model.predict(&prepare_features(&model, 1.0, 1.0));

        let delta = estimate_required_exercise_delta(&model, 1.0, 1.0, current + 8.0).unwrap();
        assert!((delta - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_delta_for_lower_target() {
        let model =
            LinearRegression::new(10.0, vec![2.0, 5.0], names(&["Screen_Time_Hours", "Exercise_Hours"]));
        let delta = estimate_required_exercise_delta(&model, 4.0, 2.0, 20.0).unwrap();
        // current = 10 + 8 + 10 = 28
        assert!((delta + 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_inverts_raw_not_clamped_output() {
        let model =
            LinearRegression::new(100.0, vec![0.0, 10.0], names(&["Screen_Time_Hours", "Exercise_Hours"]));
        // raw = 130, clamped would be 100
        let delta = estimate_required_exercise_delta(&model, 0.0, 3.0, 100.0).unwrap();
        assert!((delta + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_unavailable_without_linear_capability() {
        let model = SealedModel(LinearRegression::new(
            10.0,
            vec![2.0, 5.0],
            names(&["Screen_Time_Hours", "Exercise_Hours"]),
        ));
        for target in [0.0, 50.0, 100.0] {
            assert_eq!(estimate_required_exercise_delta(&model, 4.0, 0.5, target), None);
        }
        assert_eq!(
            solve_required_exercise_delta(&model, 4.0, 0.5, 80.0),
            Err(InverseUnavailable::NotLinear)
        );
    }

    #[test]
    fn test_unavailable_without_coefficients() {
        let model = NoCoefficients {
            names: vec!["Screen_Time_Hours".into(), "Exercise_Hours".into()],
        };
        assert_eq!(
            solve_required_exercise_delta(&model, 4.0, 0.5, 80.0),
            Err(InverseUnavailable::MissingCoefficients)
        );
    }

    #[test]
    fn test_unavailable_without_names() {
        let model = LinearRegression::new(10.0, vec![2.0, 5.0], None);
        assert_eq!(
            solve_required_exercise_delta(&model, 4.0, 0.5, 80.0),
            Err(InverseUnavailable::MissingFeatureNames)
        );
    }

    #[test]
    fn test_unavailable_without_exercise_feature() {
        let model =
            LinearRegression::new(10.0, vec![2.0, 5.0], names(&["Screen_Time_Hours", "Sleep_Hours"]));
        assert_eq!(
            solve_required_exercise_delta(&model, 4.0, 0.5, 80.0),
            Err(InverseUnavailable::NoExerciseFeature)
        );
    }

    #[test]
    fn test_unavailable_for_flat_coefficient() {
        let model = LinearRegression::new(
            10.0,
            vec![2.0, 1e-12],
            names(&["Screen_Time_Hours", "Exercise_Hours"]),
        );
        assert_eq!(
            solve_required_exercise_delta(&model, 4.0, 0.5, 80.0),
            Err(InverseUnavailable::FlatCoefficient)
        );
    }

    #[test]
    fn test_availability_agrees_with_estimate() {
        let cases = [
            (LinearRegression::new(10.0, vec![2.0, 5.0], None), false),
            (
                LinearRegression::new(10.0, vec![2.0, 0.0], names(&["Screen_Time_Hours", "Exercise_Hours"])),
                false,
            ),
            (
                LinearRegression::new(10.0, vec![2.0, 5.0], names(&["Screen_Time_Hours", "Sleep_Hours"])),
                false,
            ),
            (
                LinearRegression::new(10.0, vec![2.0, 5.0], names(&["Screen_Time_Hours", "Exercise_Minutes"])),
                true,
            ),
        ];

        for (model, expected) in cases {
            let available = inverse_availability(&model).is_ok();
            assert_eq!(available, expected, "{model:?}");
            assert_eq!(
                available,
                estimate_required_exercise_delta(&model, 4.0, 0.5, 80.0).is_some()
            );
        }

        let flat =
            LinearRegression::new(10.0, vec![2.0, 0.0], names(&["Screen_Time_Hours", "Exercise_Hours"]));
        assert_eq!(
            inverse_availability(&flat),
            Err(InverseUnavailable::FlatCoefficient)
        );
    }

    #[test]
    fn test_unavailable_for_misaligned_coefficients() {
        let model = LinearRegression::new(
            10.0,
            vec![2.0],
            names(&["Screen_Time_Hours", "Exercise_Hours"]),
        );
        assert_eq!(
            solve_required_exercise_delta(&model, 4.0, 0.5, 80.0),
            Err(InverseUnavailable::MisalignedCoefficients)
        );
    }
}
