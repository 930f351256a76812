//! Engine-level properties over the public API

use pretty_assertions::assert_eq;
use synheart_mindscore::{
    apply_adjustment, estimate_required_exercise_delta, prepare_features, score, simulate,
    BandThresholds, EngineConfig, FeatureVector, InputBounds, LinearRegression, Predictable,
    ScoreEngine,
};

fn named(list: &[&str]) -> Option<Vec<String>> {
    Some(list.iter().map(|s| s.to_string()).collect())
}

/// `predict(s, e) = 10 + 2s + 5e`
fn reference_model() -> LinearRegression {
    LinearRegression::new(10.0, vec![2.0, 5.0], named(&["Screen_Time_Hours", "Exercise_Hours"]))
}

/// Steep model whose raw output leaves [0, 100] inside the input domain
fn steep_model() -> LinearRegression {
    LinearRegression::new(
        150.0,
        vec![-25.0, 1.5],
        named(&["Screen_Time_Hours", "Exercise_Minutes"]),
    )
}

/// Predicts from a hidden function and exposes nothing linear
struct OpaqueModel;

impl Predictable for OpaqueModel {
    fn predict(&self, features: &FeatureVector) -> f64 {
        let v = features.values();
        200.0 * (v[1] / 240.0) - v[0] * v[0]
    }
}

fn grid() -> impl Iterator<Item = (f64, f64)> {
    (0..=24).flat_map(|s| (0..=16).map(move |e| (s as f64 * 0.5, e as f64 * 0.25)))
}

#[test]
fn clamped_score_stays_on_scale() {
    for thresholds in [BandThresholds::STRICT, BandThresholds::LENIENT] {
        for (s, e) in grid() {
            for outcome in [
                score(&steep_model(), s, e, &thresholds),
                score(&OpaqueModel, s, e, &thresholds),
                score(&reference_model(), s, e, &thresholds),
            ] {
                assert!((0.0..=100.0).contains(&outcome.clamped), "{s} {e} {outcome:?}");
            }
        }
    }
}

#[test]
fn canonicalization_follows_declared_order() {
    let declared = ["Exercise_Minutes", "Mood", "screen time hours"];
    let model = LinearRegression::new(0.0, vec![0.0; 3], named(&declared));
    let vector = prepare_features(&model, 5.0, 1.0);

    assert_eq!(vector.names().collect::<Vec<_>>(), declared.to_vec());
    assert_eq!(vector.values(), vec![60.0, 0.0, 5.0]);
}

#[test]
fn canonicalization_falls_back_when_names_absent() {
    let vector = prepare_features(&OpaqueModel, 5.0, 1.0);
    assert_eq!(
        vector.names().collect::<Vec<_>>(),
        vec!["Screen_Time_Hours", "Exercise_Minutes"]
    );
}

#[test]
fn canonicalization_is_idempotent() {
    let model = steep_model();
    for (s, e) in grid() {
        assert_eq!(prepare_features(&model, s, e), prepare_features(&model, s, e));
    }
}

#[test]
fn exercise_minutes_is_exact() {
    let model = steep_model();
    for (s, e) in grid() {
        let vector = prepare_features(&model, s, e);
        assert_eq!(vector.get("Exercise_Minutes"), Some(e * 60.0));
    }
}

#[test]
fn inverse_round_trip_on_reference_model() {
    let model = reference_model();
    let target = model.predict(&prepare_features(&model, 4.0, 0.5)) + 5.0;

    let delta = estimate_required_exercise_delta(&model, 4.0, 0.5, target).unwrap();
    assert!((delta - 1.0).abs() < 1e-6, "delta was {delta}");
}

#[test]
fn inverse_unavailable_without_coefficients() {
    for target in [0.0, 42.0, 80.0, 100.0, 250.0] {
        assert_eq!(estimate_required_exercise_delta(&OpaqueModel, 4.0, 0.5, target), None);
    }
}

#[test]
fn two_stage_clamp_ordering() {
    struct Fixed;
    impl Predictable for Fixed {
        fn predict(&self, _features: &FeatureVector) -> f64 {
            130.0
        }
    }

    let outcome = score(&Fixed, 4.0, 0.5, &BandThresholds::STRICT);
    assert_eq!(outcome.raw, 130.0);
    assert_eq!(apply_adjustment(outcome.clamped, -50.0), 50.0);
}

#[test]
fn what_if_is_deterministic_and_bounded() {
    let bounds = InputBounds::default();
    let model = reference_model();

    let first = simulate(&model, 11.5, 1.0, 2.0, 0.0, &bounds);
    let second = simulate(&model, 11.5, 1.0, 2.0, 0.0, &bounds);
    assert_eq!(first, second);
    assert_eq!(first.screen_hours, 12.0);

    let over = simulate(&model, 1.0, 3.5, 0.0, 2.0, &bounds);
    assert_eq!(over.exercise_hours, 4.0);
}

#[test]
fn engine_matches_free_functions() {
    let engine = ScoreEngine::from_model(steep_model(), EngineConfig::default()).unwrap();
    let model = steep_model();

    for (s, e) in grid() {
        assert_eq!(engine.score(s, e), score(&model, s, e, &BandThresholds::STRICT));
        assert_eq!(engine.prepare_features(s, e), prepare_features(&model, s, e));
        assert_eq!(
            engine.estimate_required_exercise_delta(s, e, 80.0),
            estimate_required_exercise_delta(&model, s, e, 80.0)
        );
    }
}
