//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the normalizer needs:
//! identify (header-only dimension + format probe) and resample (decode,
//! shrink, re-encode in the source format).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust, built on
//! the `image` crate.

use super::params::ResampleParams;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    /// Bytes are not a supported raster image, or carry no usable dimensions.
    #[error("Decode failed: {0}")]
    Decode(String),
    /// Valid input that could not be resized or re-encoded.
    #[error("Resample failed: {0}")]
    Resample(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Encoded formats the normalizer accepts and writes back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Jpeg,
    Png,
    Tiff,
    WebP,
}

impl Format {
    pub fn content_type(self) -> &'static str {
        match self {
            Format::Jpeg => "image/jpeg",
            Format::Png => "image/png",
            Format::Tiff => "image/tiff",
            Format::WebP => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Jpeg => "jpg",
            Format::Png => "png",
            Format::Tiff => "tif",
            Format::WebP => "webp",
        }
    }

    /// Reverse of [`content_type`](Self::content_type).
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Format::Jpeg),
            "image/png" => Some(Format::Png),
            "image/tiff" => Some(Format::Tiff),
            "image/webp" => Some(Format::WebP),
            _ => None,
        }
    }

    /// Match a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Format::Jpeg),
            "png" => Some(Format::Png),
            "tif" | "tiff" => Some(Format::Tiff),
            "webp" => Some(Format::WebP),
            _ => None,
        }
    }
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identified {
    pub dimensions: Dimensions,
    pub format: Format,
}

/// Result of a resample operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resampled {
    pub buffer: Vec<u8>,
    /// Actual output size, which may differ from the request by rounding.
    pub dimensions: Dimensions,
}

/// Trait for image processing backends.
///
/// Backends are shared across rayon workers, hence `Sync`.
pub trait ImageBackend: Sync {
    /// Read dimensions and format without decoding pixels.
    fn identify(&self, bytes: &[u8]) -> Result<Identified, ImagingError>;

    /// Shrink the image to fit inside `params.width × params.height` and
    /// re-encode it in its source format.
    fn resample(&self, bytes: &[u8], params: &ResampleParams) -> Result<Resampled, ImagingError>;
}
