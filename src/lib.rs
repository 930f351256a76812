//! Synheart MindScore - On-device scoring engine for daily habit inputs
//!
//! MindScore maps two habit inputs (daily screen time, daily exercise) onto whatever
//! features a pre-trained model declares, evaluates the model, and turns the output into
//! a bounded score: feature canonicalization → model evaluation → clamping →
//! severity band → (optional) adjustment, what-if and inverse estimate.
//!
//! ## Modules
//!
//! - **Features**: Canonicalize inputs into the model's declared feature layout
//! - **Scoring**: Clamp model output, assign severity bands, apply adjustments
//! - **Simulate**: What-if evaluation with perturbed, bounded inputs
//! - **Inverse**: Exercise delta needed to reach a target score on linear models

pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod features;
pub mod inverse;
pub mod model;
pub mod scoring;
pub mod simulate;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{ContextAdjustment, EngineConfig, InputDefaults};
pub use engine::{assess_to_json, ScoreEngine};
pub use error::ScoreError;
pub use features::{prepare_features, FeatureLayout, FeatureSemantic, FeatureVector};
pub use inverse::{
    estimate_required_exercise_delta, inverse_availability, solve_required_exercise_delta,
    InverseUnavailable,
};
pub use model::{LinearInspectable, LinearRegression, Predictable};
pub use scoring::{
    apply_adjustment, score, score_features, AdjustedScore, BandThresholds, ScoreOutcome,
    SeverityBand,
};
pub use simulate::{simulate, InputBounds, InputRange, WhatIfOutcome};
pub use types::{Assessment, AssessmentPayload, AssessmentRequest};

/// MindScore version embedded in all payloads
pub const MINDSCORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for payloads
pub const PRODUCER_NAME: &str = "synheart-mindscore";
