//! Detection run configuration.
//!
//! Threshold and timing constants are environment-specific, so they live
//! in named fields instead of inline constants. Loading from a file is
//! left to the embedding application; everything here (de)serializes with
//! serde.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Full configuration for one detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Projector output width in pixels.
    pub screen_width: u32,
    /// Projector output height in pixels.
    pub screen_height: u32,
    /// Probed portion of the projector image.
    pub region: RegionConfig,
    /// Step between probed sample points; one pixel per stride-by-stride
    /// block is probed.
    pub stride: u32,
    pub timing: TimingConfig,
    pub thresholds: ThresholdConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            screen_width: 1280,
            screen_height: 800,
            region: RegionConfig::default(),
            stride: 10,
            timing: TimingConfig::default(),
            thresholds: ThresholdConfig::default(),
        }
    }
}

/// Portion of the projector image probed by one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    pub width: u32,
    pub height: u32,
    /// Region origin inside the projector image, horizontal.
    pub offset_i: u32,
    /// Region origin inside the projector image, vertical.
    pub offset_j: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            offset_i: 0,
            offset_j: 0,
        }
    }
}

/// Hardware settle delays between display and capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Settle before each baseline capture.
    pub baseline_settle: Duration,
    /// Settle before each pattern capture; the projected light needs the
    /// full delay to stabilize before the capture is usable.
    pub pattern_settle: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            baseline_settle: Duration::from_millis(50),
            pattern_settle: Duration::from_millis(500),
        }
    }
}

/// Classification thresholds in the camera's 8-bit luminance range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Lower bound applied to the bright baseline; keeps the per-pixel
    /// normalization away from division by zero.
    pub bright_floor: f32,
    /// Minimum bright-over-dark contrast for a camera pixel to count as
    /// inside the illuminated footprint.
    pub min_contrast: f32,
    /// Normalized brightness above which a pixel is classified as lit.
    pub lit_fraction: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            bright_floor: 1.0,
            min_contrast: 40.0,
            lit_fraction: 0.4,
        }
    }
}
