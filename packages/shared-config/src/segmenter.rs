//! Era segmentation tuning configuration

use crate::{parse_env, ConfigResult};

/// Similarity threshold below which a week boundary is declared
const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;

/// Gap (in days) between consecutive weeks that always forces a boundary
const DEFAULT_MAX_GAP_DAYS: i64 = 28;

/// Minimum era length, in weeks, to survive the significance filter
const DEFAULT_MIN_WEEKS: i64 = 2;

/// Minimum era listening time, in milliseconds, to survive the significance filter
const DEFAULT_MIN_MS: i64 = 3_600_000;

/// Tunable thresholds for the era segmenter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmenterConfig {
    /// Jaccard similarity below which consecutive weeks split into separate eras
    pub similarity_threshold: f64,
    /// Gap, in days, between consecutive weeks that always forces a boundary
    pub max_gap_days: i64,
    /// Minimum era duration, in weeks, to survive the significance filter
    pub min_weeks: i64,
    /// Minimum era listening time, in milliseconds, to survive the significance filter
    pub min_ms: i64,
}

impl SegmenterConfig {
    /// Load segmenter thresholds from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            similarity_threshold: parse_env(
                "SEGMENTER_SIMILARITY_THRESHOLD",
                DEFAULT_SIMILARITY_THRESHOLD,
            )?,
            max_gap_days: parse_env("SEGMENTER_MAX_GAP_DAYS", DEFAULT_MAX_GAP_DAYS)?,
            min_weeks: parse_env("SEGMENTER_MIN_WEEKS", DEFAULT_MIN_WEEKS)?,
            min_ms: parse_env("SEGMENTER_MIN_MS", DEFAULT_MIN_MS)?,
        })
    }
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_gap_days: DEFAULT_MAX_GAP_DAYS,
            min_weeks: DEFAULT_MIN_WEEKS,
            min_ms: DEFAULT_MIN_MS,
        }
    }
}
