//! Structured-light correspondence detection for projection correction.
//!
//! Labels a strided grid of projector sample points with a balanced
//! combinatorial binary code, projects one binary frame per code bit, and
//! decodes which frames lit up each camera pixel to recover
//! projector-to-camera correspondences:
//! - Balanced code book and temporal pattern generation
//! - Synchronized display/capture acquisition with dark/bright baseline
//!   normalization
//! - Median-robust aggregation into correspondence records
//! - Camera/projector capability seams for hardware adapters

pub mod codec;
pub mod config;
pub mod detection;
pub mod export;
pub mod frame;
pub mod hardware;
