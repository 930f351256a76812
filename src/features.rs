//! Feature canonicalization
//!
//! Maps the two habit inputs (screen hours, exercise hours) onto whatever feature
//! names and order a model declares. Each declared name is resolved once against a
//! closed set of semantics; the resulting layout is then reused for every evaluation.

use crate::model::Predictable;
use serde::{Deserialize, Serialize};

/// Feature names assumed when a model does not declare its own
pub const FALLBACK_FEATURE_NAMES: [&str; 2] = ["Screen_Time_Hours", "Exercise_Minutes"];

/// Minutes per hour, the scale between `exercise_minutes` and the exercise input
pub const MINUTES_PER_HOUR: f64 = 60.0;

/// Meaning of a declared feature name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSemantic {
    ScreenTimeHours,
    ExerciseHours,
    ExerciseMinutes,
    /// Unrecognized feature, always fed a neutral 0.0
    Unknown,
}

impl FeatureSemantic {
    /// Resolve a declared feature name.
    ///
    /// Matching is case-insensitive and treats spaces and hyphens as underscores,
    /// so `Screen_Time_Hours`, `screen time hours` and `SCREEN-TIME-HOURS` agree.
    pub fn from_name(name: &str) -> Self {
        let key: String = name
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match key.as_str() {
            "screen_time_hours" => Self::ScreenTimeHours,
            "exercise_hours" => Self::ExerciseHours,
            "exercise_minutes" => Self::ExerciseMinutes,
            _ => Self::Unknown,
        }
    }

    /// Value of this feature for the given inputs
    pub fn value(self, screen_hours: f64, exercise_hours: f64) -> f64 {
        match self {
            Self::ScreenTimeHours => screen_hours,
            Self::ExerciseHours => exercise_hours,
            Self::ExerciseMinutes => exercise_hours * MINUTES_PER_HOUR,
            Self::Unknown => 0.0,
        }
    }

    /// Factor converting one unit of this feature into hours of exercise
    pub fn units_per_hour(self) -> Option<f64> {
        match self {
            Self::ExerciseHours => Some(1.0),
            Self::ExerciseMinutes => Some(MINUTES_PER_HOUR),
            _ => None,
        }
    }
}

/// One declared feature slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSlot {
    pub name: String,
    pub semantic: FeatureSemantic,
}

/// Ordered feature slots for a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureLayout {
    slots: Vec<FeatureSlot>,
    /// True when the model declared no usable names and the fallback pair applies
    fallback: bool,
}

impl FeatureLayout {
    /// Build a layout from declared names, falling back when absent or empty
    pub fn from_declared(names: Option<&[String]>) -> Self {
        match names {
            Some(names) if !names.is_empty() => Self {
                slots: names
                    .iter()
                    .map(|name| FeatureSlot {
                        name: name.clone(),
                        semantic: FeatureSemantic::from_name(name),
                    })
                    .collect(),
                fallback: false,
            },
            _ => Self::fallback(),
        }
    }

    /// Layout for the two-name fallback
    pub fn fallback() -> Self {
        Self {
            slots: FALLBACK_FEATURE_NAMES
                .iter()
                .map(|name| FeatureSlot {
                    name: (*name).to_string(),
                    semantic: FeatureSemantic::from_name(name),
                })
                .collect(),
            fallback: true,
        }
    }

    /// Layout for the features a model declares
    pub fn for_model<M: Predictable + ?Sized>(model: &M) -> Self {
        Self::from_declared(model.feature_names())
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Number of slots no recognized semantic could be assigned to
    pub fn unknown_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.semantic == FeatureSemantic::Unknown)
            .count()
    }

    /// Fill the layout with values for the given inputs
    pub fn resolve(&self, screen_hours: f64, exercise_hours: f64) -> FeatureVector {
        FeatureVector {
            entries: self
                .slots
                .iter()
                .map(|slot| {
                    (
                        slot.name.clone(),
                        slot.semantic.value(screen_hours, exercise_hours),
                    )
                })
                .collect(),
        }
    }
}

/// Ordered mapping from feature name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    /// Build a vector from explicit entries, order preserved
    pub fn from_entries(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    /// Look up a value by exact feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Positional values, in declared order
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the feature vector a model expects for the given inputs.
///
/// Keys and order equal the model's declared names, or [`FALLBACK_FEATURE_NAMES`]
/// when the model declares none. Inputs are not range-checked.
pub fn prepare_features<M: Predictable + ?Sized>(
    model: &M,
    screen_hours: f64,
    exercise_hours: f64,
) -> FeatureVector {
    FeatureLayout::for_model(model).resolve(screen_hours, exercise_hours)
}
