//! Acquisition state machine: drives the projector/camera pair through the
//! baseline and pattern frames and accumulates per-pixel observations.

use thiserror::Error;

use crate::codec::{BalancedCode, CodecError, PatternSequence, SampleGrid};
use crate::config::DetectionConfig;
use crate::frame::Frame;
use crate::hardware::{Camera, HardwareError, Projector};

use super::accumulator::ObservationAccumulator;
use super::resolver::{CorrespondenceMap, CorrespondenceResolver};

/// Fatal acquisition failures. Decode misses and an empty footprint mask
/// are normal outcomes and never surface here.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

/// Progress of a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionState {
    Idle,
    BaselineDark,
    BaselineBright,
    Decoding { frame: u32 },
    Done,
}

impl std::fmt::Display for DetectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionState::Idle => write!(f, "Idle"),
            DetectionState::BaselineDark => write!(f, "Dark Baseline"),
            DetectionState::BaselineBright => write!(f, "Bright Baseline"),
            DetectionState::Decoding { frame } => write!(f, "Pattern {}", frame),
            DetectionState::Done => write!(f, "Done"),
        }
    }
}

/// One structured-light acquisition run over a single projector region.
pub struct DetectionSession {
    config: DetectionConfig,
    grid: SampleGrid,
    code: BalancedCode,
    state: DetectionState,
}

impl DetectionSession {
    /// Builds the sample grid for the configured region and sizes the code
    /// book to label every sample point.
    pub fn new(config: DetectionConfig) -> Result<Self, DetectionError> {
        let grid = SampleGrid::new(config.region.width, config.region.height, config.stride);
        let code = BalancedCode::with_capacity(grid.len())?;
        log::info!(
            "Detection session: {} sample points, {} pattern frames",
            grid.len(),
            code.word_length()
        );
        Ok(Self {
            config,
            grid,
            code,
            state: DetectionState::Idle,
        })
    }

    pub fn state(&self) -> DetectionState {
        self.state
    }

    pub fn grid(&self) -> &SampleGrid {
        &self.grid
    }

    pub fn code(&self) -> &BalancedCode {
        &self.code
    }

    /// Number of temporal pattern frames this run will project.
    pub fn frame_count(&self) -> u32 {
        self.code.word_length()
    }

    /// Run the full acquisition and resolve the correspondence map.
    ///
    /// Blocks on every display and capture call; pattern frame t+1 is
    /// never shown before frame t has settled, been captured and been
    /// classified. Any hardware failure aborts the run without retrying; a
    /// partial bit-set cannot be told apart from a pixel that was never
    /// lit, so there is no partial-frame recovery.
    pub fn detect(
        &mut self,
        projector: &mut dyn Projector,
        camera: &mut dyn Camera,
    ) -> Result<CorrespondenceMap, DetectionError> {
        let screen = Frame::dark(self.config.screen_width, self.config.screen_height);
        let origin = (self.config.region.offset_i, self.config.region.offset_j);
        let thresholds = self.config.thresholds.clone();

        self.state = DetectionState::BaselineDark;
        log::debug!("State: {}", self.state);
        projector.show(&screen)?;
        projector.wait(self.config.timing.baseline_settle);
        let dark = capture_luminance(camera, None)?;

        self.state = DetectionState::BaselineBright;
        log::debug!("State: {}", self.state);
        let mut bright_screen = screen.clone();
        bright_screen.blit(&self.grid.sample_positions_mask(), origin.0, origin.1);
        projector.show(&bright_screen)?;
        projector.wait(self.config.timing.baseline_settle);
        let bright_capture = capture_luminance(camera, Some(&dark))?;

        let mut bright = Vec::with_capacity(dark.data().len());
        let mut footprint = Vec::with_capacity(dark.data().len());
        for (&captured, &dark_px) in bright_capture.data().iter().zip(dark.data()) {
            let level = (captured - dark_px).max(thresholds.bright_floor);
            footprint.push(level > thresholds.min_contrast);
            bright.push(level);
        }

        let visible = footprint.iter().filter(|&&inside| inside).count();
        if visible == 0 {
            // no camera pixel sees the probed region; skip, not an error
            log::warn!("No camera pixels above contrast threshold, skipping detection run");
            self.state = DetectionState::Done;
            return Ok(CorrespondenceMap::default());
        }
        log::debug!("{} camera pixels inside the illuminated footprint", visible);

        let mut accumulator = ObservationAccumulator::new(dark.width(), dark.height());
        let patterns = PatternSequence::new(&self.grid, &self.code);

        for (t, pattern) in patterns.frames().enumerate() {
            let t = t as u32;
            self.state = DetectionState::Decoding { frame: t };
            log::debug!("State: {}", self.state);

            let mut pattern_screen = screen.clone();
            pattern_screen.blit(&pattern, origin.0, origin.1);
            projector.show(&pattern_screen)?;
            projector.wait(self.config.timing.pattern_settle);
            let captured = capture_luminance(camera, Some(&dark))?;

            let mut lit = 0usize;
            let width = captured.width() as usize;
            for (index, ((&level, &dark_px), (&bright_px, &inside))) in captured
                .data()
                .iter()
                .zip(dark.data())
                .zip(bright.iter().zip(footprint.iter()))
                .enumerate()
            {
                if inside && (level - dark_px) / bright_px > thresholds.lit_fraction {
                    accumulator.record((index % width) as u32, (index / width) as u32, t);
                    lit += 1;
                }
            }
            log::debug!("Pattern {}: {} lit pixels", t, lit);
        }

        self.state = DetectionState::Done;
        let resolver = CorrespondenceResolver::new(&self.grid, &self.code, origin);
        Ok(resolver.resolve(&accumulator))
    }
}

/// Capture one snapshot and average it to luminance. `reference` pins the
/// camera geometry for the rest of the run: temporal decode needs every
/// frame's pixels aligned.
fn capture_luminance(
    camera: &mut dyn Camera,
    reference: Option<&Frame>,
) -> Result<Frame, DetectionError> {
    let snapshot = camera.take_snapshot()?;
    let luminance = snapshot.luminance();
    if let Some(reference) = reference {
        if luminance.width() != reference.width() || luminance.height() != reference.height() {
            return Err(HardwareError::Capture(format!(
                "camera geometry changed mid-run: {}x{} then {}x{}",
                reference.width(),
                reference.height(),
                luminance.width(),
                luminance.height()
            ))
            .into());
        }
    }
    Ok(luminance)
}
