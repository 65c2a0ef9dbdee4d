//! Audio feature schema.
//!
//! This module is the single place that knows which audio dimensions exist, in which order
//! they are laid out, and how a raw value coming from the outside world is brought into the
//! [0, 1] range that the ranking code works with. Everything else indexes vectors through
//! [`Feature`], so the order can not drift between the catalog, the interpreter and the
//! distance computation.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Number of recognized audio dimensions.
pub const FEATURE_COUNT: usize = 6;

/// Upper bound of the raw tempo scale, in BPM.
pub const MAX_TEMPO_BPM: f32 = 250.0;

/// Upper bound of the raw popularity scale.
pub const MAX_POPULARITY: f32 = 100.0;

/// A recognized audio dimension.
///
/// The discriminant is the position of the dimension inside every vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Acousticness = 0,
    Danceability = 1,
    Energy = 2,
    Tempo = 3,
    Valence = 4,
    Popularity = 5,
}

/// Canonical dimension order.
pub const FEATURE_ORDER: [Feature; FEATURE_COUNT] = [
    Feature::Acousticness,
    Feature::Danceability,
    Feature::Energy,
    Feature::Tempo,
    Feature::Valence,
    Feature::Popularity,
];

impl Feature {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::Acousticness => "acousticness",
            Feature::Danceability => "danceability",
            Feature::Energy => "energy",
            Feature::Tempo => "tempo",
            Feature::Valence => "valence",
            Feature::Popularity => "popularity",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        FEATURE_ORDER
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Declared maximum of the raw scale for bounded-range dimensions.
    ///
    /// Returns `None` for dimensions that are already expressed in [0, 1].
    pub fn max_raw_value(self) -> Option<f32> {
        match self {
            Feature::Tempo => Some(MAX_TEMPO_BPM),
            Feature::Popularity => Some(MAX_POPULARITY),
            _ => None,
        }
    }

    /// Brings a raw value into [0, 1].
    ///
    /// Bounded-range dimensions are clipped to `[0, max]` and divided by `max`, the others
    /// are clipped only. Non-finite input normalizes to 0.
    pub fn normalize(self, raw: f32) -> f32 {
        if !raw.is_finite() {
            return 0.0;
        }
        match self.max_raw_value() {
            Some(max) => raw.clamp(0.0, max) / max,
            None => raw.clamp(0.0, 1.0),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn clip_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn serialize_named<S: Serializer>(values: &[f32; FEATURE_COUNT], s: S) -> Result<S::Ok, S::Error> {
    let mut map = s.serialize_map(Some(FEATURE_COUNT))?;
    for feature in FEATURE_ORDER {
        map.serialize_entry(feature.name(), &values[feature.index()])?;
    }
    map.end()
}

/// A normalized target or track vector, one value in [0, 1] per dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    /// Normalizes raw values (tempo in BPM, popularity 0..100, the rest 0..1).
    pub fn from_raw(raw: [f32; FEATURE_COUNT]) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for feature in FEATURE_ORDER {
            values[feature.index()] = feature.normalize(raw[feature.index()]);
        }
        Self(values)
    }

    /// Wraps values that are already on the unit scale, clipping strays.
    pub fn from_normalized(values: [f32; FEATURE_COUNT]) -> Self {
        Self(values.map(clip_unit))
    }

    pub fn get(&self, feature: Feature) -> f32 {
        self.0[feature.index()]
    }

    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.0
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        serialize_named(&self.0, s)
    }
}

/// Per-dimension importance, each in [0, 1].
///
/// 0 ignores a dimension, 1 asks for the closest possible match. Weights do not need to
/// sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureWeights([f32; FEATURE_COUNT]);

impl FeatureWeights {
    pub fn new(values: [f32; FEATURE_COUNT]) -> Self {
        Self(values.map(clip_unit))
    }

    pub fn uniform(weight: f32) -> Self {
        Self::new([weight; FEATURE_COUNT])
    }

    pub fn zeros() -> Self {
        Self([0.0; FEATURE_COUNT])
    }

    pub fn get(&self, feature: Feature) -> f32 {
        self.0[feature.index()]
    }

    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.0
    }

    pub fn is_all_zero(&self) -> bool {
        self.0.iter().all(|w| *w == 0.0)
    }
}

impl Serialize for FeatureWeights {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        serialize_named(&self.0, s)
    }
}

/// Normalized features where some dimensions may be unknown.
///
/// External services do not always report every dimension (popularity in particular).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartialFeatures([Option<f32>; FEATURE_COUNT]);

impl PartialFeatures {
    /// Normalizes whichever raw values are present.
    pub fn from_raw(raw: [Option<f32>; FEATURE_COUNT]) -> Self {
        let mut values = [None; FEATURE_COUNT];
        for feature in FEATURE_ORDER {
            values[feature.index()] = raw[feature.index()].map(|v| feature.normalize(v));
        }
        Self(values)
    }

    pub fn get(&self, feature: Feature) -> Option<f32> {
        self.0[feature.index()]
    }

    pub fn values(&self) -> &[Option<f32>; FEATURE_COUNT] {
        &self.0
    }

    pub fn missing(&self) -> Vec<Feature> {
        FEATURE_ORDER
            .iter()
            .copied()
            .filter(|f| self.0[f.index()].is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }
}

impl From<FeatureVector> for PartialFeatures {
    fn from(vector: FeatureVector) -> Self {
        Self(vector.0.map(Some))
    }
}
