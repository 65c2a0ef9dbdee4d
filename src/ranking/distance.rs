use crate::features::{FeatureVector, FeatureWeights, FEATURE_COUNT};

/// Weighted squared Euclidean distance between a track and the target.
///
/// `score = Σ w[i] * (f[i] - t[i])²`, no square root. Dimensions yielding `None` contribute
/// nothing, which is the same as giving them weight 0 for this track only.
pub fn weighted_squared_distance<I>(values: I, target: &FeatureVector, weights: &FeatureWeights) -> f32
where
    I: IntoIterator<Item = Option<f32>>,
{
    values
        .into_iter()
        .zip(target.as_array().iter().zip(weights.as_array().iter()))
        .filter_map(|(value, (t, w))| value.map(|v| w * (v - t) * (v - t)))
        .fold(0.0, |acc, term| acc + term)
}

/// Score of one row of a row-major feature matrix.
pub fn score_row(row: &[f32], target: &FeatureVector, weights: &FeatureWeights) -> f32 {
    debug_assert_eq!(row.len(), FEATURE_COUNT);
    weighted_squared_distance(row.iter().copied().map(Some), target, weights)
}
