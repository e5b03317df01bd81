//! Capability seams for the external camera and projector collaborators.
//!
//! Hardware adapters live outside the crate; the acquisition loop relies
//! only on these traits and treats any collaborator failure as fatal for
//! the current run.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

use crate::frame::Frame;

/// Collaborator failure. The physical settle state is unknown afterwards,
/// so the enclosing acquisition run aborts without retrying.
#[derive(Debug, Clone, Error)]
pub enum HardwareError {
    #[error("camera capture failed: {0}")]
    Capture(String),
    #[error("display output failed: {0}")]
    Display(String),
}

/// Raw still frame from the camera: interleaved 8-bit samples, one or more
/// channels per pixel.
#[derive(Debug, Clone)]
pub struct Snapshot {
    width: u32,
    height: u32,
    channels: u32,
    data: Bytes,
}

impl Snapshot {
    pub fn new(width: u32, height: u32, channels: u32, data: Bytes) -> Self {
        assert!(channels > 0, "snapshot needs at least one channel");
        assert_eq!(
            data.len(),
            width as usize * height as usize * channels as usize,
            "snapshot buffer does not match {width}x{height}x{channels}"
        );
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Channel-averaged luminance image in the camera's 8-bit range.
    pub fn luminance(&self) -> Frame {
        let channels = self.channels as usize;
        let pixels = self.width as usize * self.height as usize;
        let mut data = Vec::with_capacity(pixels);
        for pixel in 0..pixels {
            let samples = &self.data[pixel * channels..(pixel + 1) * channels];
            let sum: u32 = samples.iter().map(|&s| s as u32).sum();
            data.push(sum as f32 / channels as f32);
        }
        Frame::from_raw(self.width, self.height, data)
    }
}

/// Still camera observing the projection surface.
pub trait Camera {
    /// Take a single still frame. Failure is fatal to the current run.
    fn take_snapshot(&mut self) -> Result<Snapshot, HardwareError>;
}

/// Full-screen projector output.
pub trait Projector {
    /// Present a full-screen frame.
    fn show(&mut self, frame: &Frame) -> Result<(), HardwareError>;

    /// Block for the requested settle time. No acknowledgement of physical
    /// settling beyond the fixed delay is assumed.
    fn wait(&mut self, settle: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_averages_channels() {
        let snapshot = Snapshot::new(2, 1, 3, Bytes::from(vec![10, 20, 30, 255, 255, 255]));
        let luminance = snapshot.luminance();
        assert_eq!(luminance.get(0, 0), 20.0);
        assert_eq!(luminance.get(1, 0), 255.0);
    }

    #[test]
    fn single_channel_passes_through() {
        let snapshot = Snapshot::new(2, 2, 1, Bytes::from(vec![0, 64, 128, 192]));
        let luminance = snapshot.luminance();
        assert_eq!(luminance.get(0, 0), 0.0);
        assert_eq!(luminance.get(1, 1), 192.0);
    }
}
