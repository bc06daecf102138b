//! Recognition parameters.
//!
//! Everything the engine and template loader need to agree on lives here so
//! the composition root can hand one value to both.

use serde::{Deserialize, Serialize};

use crate::Color;

/// Per-method weights of the composite score.
///
/// The weights are expected to sum to `1.0`. A method that cannot be computed
/// for a pair contributes zero and its weight is not redistributed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodWeights {
    /// Zero-mean normalized cross-correlation on grayscale.
    pub correlation: f32,
    /// Plain normalized cross-correlation on grayscale.
    pub cross_correlation: f32,
    /// Zero-mean normalized cross-correlation on histogram-equalized grayscale.
    pub equalized_correlation: f32,
    /// Color histogram intersection.
    pub histogram: f32,
    /// Fraction of probe keypoints with a confident descriptor match.
    pub features: f32,
}

impl Default for MethodWeights {
    fn default() -> Self {
        Self {
            correlation: 0.25,
            cross_correlation: 0.15,
            equalized_correlation: 0.30,
            histogram: 0.15,
            features: 0.15,
        }
    }
}

impl MethodWeights {
    pub fn total(&self) -> f32 {
        self.correlation + self.cross_correlation + self.equalized_correlation + self.histogram + self.features
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Side length of the square every template and probe is normalized to.
    pub icon_size: u32,

    pub weights: MethodWeights,

    /// Histogram bins per color channel.
    pub histogram_bins: u32,

    /// Maximum number of keypoint descriptors kept per image.
    pub descriptor_budget: usize,

    /// FAST-9 corner threshold.
    pub fast_threshold: u8,

    /// Transparent template pixels are composited onto this color.
    pub background: Color,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            icon_size: 160,
            weights: MethodWeights::default(),
            histogram_bins: 32,
            descriptor_budget: 500,
            fast_threshold: 20,
            background: Color::BLACK,
        }
    }
}
