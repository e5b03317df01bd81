//! Persistence for correspondence maps and debug frames.
//!
//! The correspondence records are a local, offline hand-off to the
//! stitching and regression stages; there is no wire protocol.

use std::io;
use std::path::Path;

use crate::detection::CorrespondenceMap;
use crate::frame::Frame;

/// Writes correspondence data for the downstream consumers.
pub struct CorrespondenceExporter;

impl CorrespondenceExporter {
    /// Human-readable JSON dump.
    pub fn export_json(map: &CorrespondenceMap, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(map)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        std::fs::write(path, json)
    }

    /// Compact binary dump: bincode, lz4-compressed with a prepended size.
    pub fn export_binary(map: &CorrespondenceMap, path: &Path) -> io::Result<()> {
        let encoded =
            bincode::serialize(map).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let compressed = lz4_flex::compress_prepend_size(&encoded);

        std::fs::write(path, compressed)?;
        log::info!(
            "Wrote {} correspondence records to {}",
            map.len(),
            path.display()
        );
        Ok(())
    }

    /// Binary {0,1} frame (pattern or sample mask) as an 8-bit grayscale
    /// PNG for offline inspection.
    pub fn export_frame_png(frame: &Frame, path: &Path) -> io::Result<()> {
        let img = image::GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
            image::Luma([(frame.get(x, y) * 255.0).clamp(0.0, 255.0) as u8])
        });

        img.save(path)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}

/// Load a binary dump written by [`CorrespondenceExporter::export_binary`].
pub fn load_binary(path: &Path) -> io::Result<CorrespondenceMap> {
    let compressed = std::fs::read(path)?;
    let encoded = lz4_flex::decompress_size_prepended(&compressed)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    bincode::deserialize(&encoded).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SampleGrid;
    use crate::detection::{CorrespondenceRecord, ResolveStats};

    fn sample_map() -> CorrespondenceMap {
        CorrespondenceMap {
            records: vec![
                CorrespondenceRecord {
                    camera_x: 12.0,
                    camera_y: 10.0,
                    projector_i: 5,
                    projector_j: 5,
                },
                CorrespondenceRecord {
                    camera_x: 101.5,
                    camera_y: 33.0,
                    projector_i: 15,
                    projector_j: 5,
                },
            ],
            stats: ResolveStats {
                accepted: 5,
                discarded: 2,
            },
        }
    }

    #[test]
    fn binary_round_trip() {
        let map = sample_map();
        let path = std::env::temp_dir().join("projcorr_binary_round_trip.corr");

        CorrespondenceExporter::export_binary(&map, &path).unwrap();
        let loaded = load_binary(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.records, map.records);
        assert_eq!(loaded.stats, map.stats);
    }

    #[test]
    fn json_round_trip() {
        let map = sample_map();
        let path = std::env::temp_dir().join("projcorr_json_round_trip.json");

        CorrespondenceExporter::export_json(&map, &path).unwrap();
        let loaded: CorrespondenceMap =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.records, map.records);
        assert_eq!(loaded.stats, map.stats);
    }

    #[test]
    fn frame_png_export() {
        let mask = SampleGrid::new(8, 6, 4).sample_positions_mask();
        let path = std::env::temp_dir().join("projcorr_mask_export.png");

        CorrespondenceExporter::export_frame_png(&mask, &path).unwrap();
        let img = image::open(&path).unwrap().to_luma8();
        std::fs::remove_file(&path).ok();

        assert_eq!(img.dimensions(), (8, 6));
        assert_eq!(img.get_pixel(0, 0).0[0], 255);
        assert_eq!(img.get_pixel(4, 4).0[0], 255);
        assert_eq!(img.get_pixel(1, 0).0[0], 0);
    }
}
