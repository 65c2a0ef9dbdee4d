//! What the LLM is asked to produce, and the typed query it becomes.

use crate::features::{Feature, FeatureVector, FeatureWeights, FEATURE_COUNT, FEATURE_ORDER};
use crate::seeds::SeedReference;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_FEATURE_WEIGHT: f32 = 0.5;

/// Lower bound the prompt asks the model to respect for popularity targets.
pub const SUGGESTED_MIN_POPULARITY: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SchemaViolation(pub String);

/// Target values on their raw scales (tempo in BPM, popularity 0..100).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioFeatureTargets {
    pub acousticness: Option<f32>,
    pub danceability: Option<f32>,
    pub energy: Option<f32>,
    pub tempo: Option<f32>,
    pub valence: Option<f32>,
    pub popularity: Option<f32>,
}

impl AudioFeatureTargets {
    pub fn as_array(&self) -> [Option<f32>; FEATURE_COUNT] {
        [
            self.acousticness,
            self.danceability,
            self.energy,
            self.tempo,
            self.valence,
            self.popularity,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightParams {
    pub acousticness_weight: f32,
    pub danceability_weight: f32,
    pub energy_weight: f32,
    pub tempo_weight: f32,
    pub valence_weight: f32,
    pub popularity_weight: f32,
}

impl Default for WeightParams {
    fn default() -> Self {
        Self {
            acousticness_weight: DEFAULT_FEATURE_WEIGHT,
            danceability_weight: DEFAULT_FEATURE_WEIGHT,
            energy_weight: DEFAULT_FEATURE_WEIGHT,
            tempo_weight: DEFAULT_FEATURE_WEIGHT,
            valence_weight: DEFAULT_FEATURE_WEIGHT,
            popularity_weight: DEFAULT_FEATURE_WEIGHT,
        }
    }
}

impl WeightParams {
    pub fn as_array(&self) -> [f32; FEATURE_COUNT] {
        [
            self.acousticness_weight,
            self.danceability_weight,
            self.energy_weight,
            self.tempo_weight,
            self.valence_weight,
            self.popularity_weight,
        ]
    }
}

/// The JSON object the interpreter expects back from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretedParams {
    pub target_features: AudioFeatureTargets,
    #[serde(default)]
    pub feature_weights: WeightParams,
    #[serde(default)]
    pub seeds: Vec<SeedReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl InterpretedParams {
    /// Rejects values outside their declared ranges. `require_seeds` is set when the
    /// answer feeds the recommendation service, which needs at least one seed.
    pub fn validate(&self, require_seeds: bool) -> Result<(), SchemaViolation> {
        for (feature, value) in FEATURE_ORDER.iter().zip(self.target_features.as_array()) {
            let Some(value) = value else { continue };
            let max = feature.max_raw_value().unwrap_or(1.0);
            if !value.is_finite() || !(0.0..=max).contains(&value) {
                return Err(SchemaViolation(format!(
                    "target {} = {} outside [0, {}]",
                    feature, value, max
                )));
            }
        }

        for (feature, weight) in FEATURE_ORDER.iter().zip(self.feature_weights.as_array()) {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(SchemaViolation(format!(
                    "{}_weight = {} outside [0, 1]",
                    feature, weight
                )));
            }
        }

        if require_seeds && self.seeds.is_empty() {
            return Err(SchemaViolation("no seed tracks given".to_string()));
        }
        Ok(())
    }

    /// Normalizes targets and zeroes the weight of every dimension without a target.
    /// Seeds past `max_seeds` are dropped.
    pub fn into_query(self, max_seeds: usize) -> InterpretedQuery {
        let raw_targets = self.target_features.as_array();
        let mut weights = self.feature_weights.as_array();
        for (weight, target) in weights.iter_mut().zip(raw_targets) {
            if target.is_none() {
                *weight = 0.0;
            }
        }

        let mut seeds = self.seeds;
        seeds.truncate(max_seeds);

        InterpretedQuery {
            target: FeatureVector::from_raw(raw_targets.map(|v| v.unwrap_or(0.0))),
            weights: FeatureWeights::new(weights),
            raw_targets,
            seeds,
            reasoning: self.reasoning,
        }
    }
}

/// A validated interpretation, already on the unit scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpretedQuery {
    pub target: FeatureVector,
    pub weights: FeatureWeights,
    /// Targets as the model gave them; the recommendation service takes raw scales.
    #[serde(skip)]
    pub raw_targets: [Option<f32>; FEATURE_COUNT],
    pub seeds: Vec<SeedReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl InterpretedQuery {
    /// A query with every target present, mostly for tests and the CLI.
    pub fn from_targets(raw: [f32; FEATURE_COUNT], weights: FeatureWeights) -> Self {
        Self {
            target: FeatureVector::from_raw(raw),
            weights,
            raw_targets: raw.map(Some),
            seeds: Vec::new(),
            reasoning: None,
        }
    }

    pub fn raw_target(&self, feature: Feature) -> Option<f32> {
        self.raw_targets[feature.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> InterpretedParams {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_weights_default_to_half() {
        let params = parse(r#"{"target_features": {"energy": 0.9}}"#);
        assert_eq!(params.feature_weights, WeightParams::default());
        assert_eq!(params.feature_weights.as_array(), [0.5; FEATURE_COUNT]);

        let params = parse(r#"{"target_features": {}, "feature_weights": {"tempo_weight": 1.0}}"#);
        assert_eq!(params.feature_weights.tempo_weight, 1.0);
        assert_eq!(params.feature_weights.energy_weight, 0.5);
    }

    #[test]
    fn test_missing_target_gets_zero_weight() {
        let params = parse(
            r#"{"target_features": {"acousticness": 0.9, "tempo": 125},
                "feature_weights": {"acousticness_weight": 1.0, "energy_weight": 0.8}}"#,
        );
        let query = params.into_query(5);

        assert_eq!(query.weights.get(Feature::Acousticness), 1.0);
        assert_eq!(query.weights.get(Feature::Energy), 0.0);
        assert_eq!(query.weights.get(Feature::Tempo), 0.5);
        assert_eq!(query.target.get(Feature::Tempo), 0.5);
        assert_eq!(query.target.get(Feature::Energy), 0.0);
        assert_eq!(query.raw_target(Feature::Tempo), Some(125.0));
        assert_eq!(query.raw_target(Feature::Valence), None);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let tempo = parse(r#"{"target_features": {"tempo": 300}}"#);
        let err = tempo.validate(false).unwrap_err();
        assert!(err.0.contains("tempo"), "{}", err);

        let energy = parse(r#"{"target_features": {"energy": -0.1}}"#);
        assert!(energy.validate(false).is_err());

        let weight = parse(r#"{"target_features": {}, "feature_weights": {"valence_weight": 2}}"#);
        assert!(weight.validate(false).unwrap_err().0.contains("valence_weight"));

        let popularity = parse(r#"{"target_features": {"popularity": 100}}"#);
        assert!(popularity.validate(false).is_ok());
    }

    #[test]
    fn test_seeds_required_only_when_asked() {
        let params = parse(r#"{"target_features": {"energy": 0.2}}"#);
        assert!(params.validate(false).is_ok());
        assert!(params.validate(true).is_err());

        let seeded = parse(
            r#"{"target_features": {"energy": 0.2},
                "seeds": [{"track_name": "Holocene", "artist_name": "Bon Iver"}]}"#,
        );
        assert!(seeded.validate(true).is_ok());
    }

    #[test]
    fn test_seeds_over_cap_are_truncated() {
        let params = InterpretedParams {
            target_features: AudioFeatureTargets::default(),
            feature_weights: WeightParams::default(),
            seeds: (0..7).map(|i| SeedReference::new(format!("t{}", i), "a")).collect(),
            reasoning: None,
        };
        let query = params.into_query(5);
        assert_eq!(query.seeds.len(), 5);
        assert_eq!(query.seeds[4].track_name, "t4");
    }

    #[test]
    fn test_missing_target_features_is_a_parse_error() {
        assert!(serde_json::from_str::<InterpretedParams>(r#"{"seeds": []}"#).is_err());
    }
}
