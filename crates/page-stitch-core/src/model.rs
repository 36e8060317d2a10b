use crate::config::OutputFormat;
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Aspect-ratio band around 1.0 treated as square. The planner's strategy
/// selection is sensitive to this value at orientation boundaries, so it is
/// a fixed policy constant rather than anything configurable.
pub const SQUARE_TOLERANCE: f64 = 0.08;

/// Orientation of an image derived from its pixel dimensions.
/// Derived, never stored; recomputing is a dimension-only comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
    Square,
}

impl Orientation {
    /// Classify pixel dimensions. Let r = width / height: within
    /// [`SQUARE_TOLERANCE`] of 1.0 is square, below is portrait, above is
    /// landscape. Invariant under uniform scaling. Callers reject zero
    /// dimensions before classification.
    pub fn of(width: u32, height: u32) -> Self {
        let r = width as f64 / height as f64;
        if (r - 1.0).abs() <= SQUARE_TOLERANCE {
            Orientation::Square
        } else if r < 1.0 {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

/// Direction along which two images are concatenated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl FromStr for Axis {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "h" | "horizontal" | "horiz" => Ok(Self::Horizontal),
            "v" | "vertical" | "vert" => Ok(Self::Vertical),
            _ => Err(()),
        }
    }
}

/// In-memory page image to stitch (key + decoded raster).
/// The key is the source identifier (file path or page index) and flows
/// into the composite's provenance.
pub struct PageImage {
    pub key: String,
    pub image: DynamicImage,
}

/// Final composite: the stitched raster, the encoded byte stream, and the
/// source keys in composed spatial order (left-to-right, top-to-bottom).
/// Downstream labeling reads `provenance` to map composite regions back to
/// originating pages.
pub struct Composite {
    pub image: RgbaImage,
    pub provenance: Vec<String>,
    pub encoded: Vec<u8>,
    pub format: OutputFormat,
    pub stats: StitchStats,
}

/// Size statistics for one optimized composite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StitchStats {
    /// Output dimensions after downscaling.
    pub width: u32,
    pub height: u32,
    /// Naive uncompressed size at output dimensions (RGB, 3 bytes/px).
    pub raw_bytes: u64,
    /// Encoded file size.
    pub encoded_bytes: u64,
    /// 1 - encoded / raw. Negative if encoding inflated the data.
    pub compression_ratio: f64,
}

impl StitchStats {
    pub fn new(width: u32, height: u32, encoded_bytes: u64) -> Self {
        let raw_bytes = (width as u64) * (height as u64) * 3;
        let compression_ratio = if raw_bytes > 0 {
            1.0 - encoded_bytes as f64 / raw_bytes as f64
        } else {
            0.0
        };
        Self {
            width,
            height,
            raw_bytes,
            encoded_bytes,
            compression_ratio,
        }
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Size: {}x{}, Encoded: {} bytes, Raw: {} bytes, Compression: {:.2}%",
            self.width,
            self.height,
            self.encoded_bytes,
            self.raw_bytes,
            self.compression_ratio * 100.0,
        )
    }
}
