//! Ordering of classification scores into a presentable top list.

use std::cmp::Ordering;

use crate::models::seasoning::{ClassificationScore, RankedResult};

/// Sorts scores by probability, highest first, and keeps the top three.
///
/// The sort is stable: ties keep the order the classifier produced them in,
/// so the same model output always yields the same ranking.
pub fn rank(scores: &[ClassificationScore]) -> RankedResult {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
    });
    RankedResult::new(sorted)
}

/// Converts a probability in `[0, 1]` to a display percentage, rounding
/// halves away from zero (0.425 becomes 43, not 42).
pub fn percentage_of(probability: f64) -> u8 {
    (probability * 100.0).round().clamp(0.0, 100.0) as u8
}
