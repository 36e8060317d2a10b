use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output encoding formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless; compression level trades CPU for size, pixels unchanged.
    Png,
    /// Lossy; lower quality means smaller files and more visible artifacts.
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(()),
        }
    }
}

/// PNG compression levels (same pixels, smaller file at higher levels).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    Default,
    Best,
}

impl FromStr for PngCompression {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "default" => Ok(Self::Default),
            "best" => Ok(Self::Best),
            _ => Err(()),
        }
    }
}

/// Size/quality trade-off applied to a finished composite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationSpec {
    /// Multiplier in (0, 1] applied to both dimensions before encoding.
    #[serde(default = "default_downscale")]
    pub downscale: f32,
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    #[serde(default = "default_png_compression")]
    pub png_compression: PngCompression,
    /// JPEG quality (1..=100). Ignored for PNG output.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for OptimizationSpec {
    fn default() -> Self {
        Self {
            downscale: default_downscale(),
            format: default_format(),
            png_compression: default_png_compression(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl OptimizationSpec {
    /// Validates the spec parameters.
    ///
    /// Returns an error if the downscale factor is outside (0, 1] or the
    /// JPEG quality is outside 1..=100.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::StitchError;

        if !self.downscale.is_finite() || self.downscale <= 0.0 || self.downscale > 1.0 {
            return Err(StitchError::InvalidDownscale(self.downscale));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(StitchError::InvalidConfig(format!(
                "jpeg_quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }

    /// Create a fluent builder for `OptimizationSpec`.
    pub fn builder() -> OptimizationSpecBuilder {
        OptimizationSpecBuilder::new()
    }
}

fn default_downscale() -> f32 {
    1.0
}
fn default_format() -> OutputFormat {
    OutputFormat::Png
}
fn default_png_compression() -> PngCompression {
    PngCompression::Default
}
fn default_jpeg_quality() -> u8 {
    85
}

/// Builder for `OptimizationSpec` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct OptimizationSpecBuilder {
    spec: OptimizationSpec,
}

impl OptimizationSpecBuilder {
    pub fn new() -> Self {
        Self {
            spec: OptimizationSpec::default(),
        }
    }
    pub fn downscale(mut self, v: f32) -> Self {
        self.spec.downscale = v;
        self
    }
    pub fn format(mut self, v: OutputFormat) -> Self {
        self.spec.format = v;
        self
    }
    pub fn png_compression(mut self, v: PngCompression) -> Self {
        self.spec.png_compression = v;
        self
    }
    pub fn jpeg_quality(mut self, v: u8) -> Self {
        self.spec.jpeg_quality = v;
        self
    }
    pub fn build(self) -> OptimizationSpec {
        self.spec
    }
}
