use crate::config::{OptimizationSpec, OutputFormat, PngCompression};
use crate::error::{Result, StitchError};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{self, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage, imageops};
use tracing::debug;

/// Resized composite plus its encoded byte stream.
pub struct Optimized {
    pub image: RgbaImage,
    pub encoded: Vec<u8>,
}

/// Apply the size/quality trade-off: downscale (Lanczos3) when the factor
/// is below 1.0, then encode per the spec's format. Returns the encoded
/// bytes alongside the raster so callers can report compression ratios.
/// Encoding failures are fatal for the composite and surfaced as-is.
pub fn optimize(image: RgbaImage, spec: &OptimizationSpec) -> Result<Optimized> {
    spec.validate()?;
    let image = downscale(image, spec.downscale);
    let encoded = encode(&image, spec)?;
    debug!(
        width = image.width(),
        height = image.height(),
        bytes = encoded.len(),
        "optimized composite"
    );
    Ok(Optimized { image, encoded })
}

/// Resize to (round(w*f), round(h*f)). A factor of 1.0 is a no-op and
/// reproduces the input dimensions exactly.
fn downscale(image: RgbaImage, factor: f32) -> RgbaImage {
    if factor >= 1.0 {
        return image;
    }
    let w = ((image.width() as f32 * factor).round() as u32).max(1);
    let h = ((image.height() as f32 * factor).round() as u32).max(1);
    imageops::resize(&image, w, h, imageops::FilterType::Lanczos3)
}

/// Encode to the spec's format without touching pixel dimensions.
pub fn encode(image: &RgbaImage, spec: &OptimizationSpec) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match spec.format {
        OutputFormat::Png => {
            let compression = match spec.png_compression {
                PngCompression::Fast => png::CompressionType::Fast,
                PngCompression::Default => png::CompressionType::Default,
                PngCompression::Best => png::CompressionType::Best,
            };
            let encoder =
                PngEncoder::new_with_quality(&mut buf, compression, png::FilterType::Adaptive);
            encoder
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(|e| StitchError::Encode(format!("png: {e}")))?;
        }
        OutputFormat::Jpeg => {
            // JPEG carries no alpha; the canvas background is already opaque.
            let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut buf, spec.jpeg_quality);
            encoder
                .encode(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(|e| StitchError::Encode(format!("jpeg q{}: {e}", spec.jpeg_quality)))?;
        }
    }
    Ok(buf)
}
