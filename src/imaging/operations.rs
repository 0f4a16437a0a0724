//! High-level image operations.
//!
//! [`normalize`] combines the pure calculations with backend execution:
//! identify → select preset → plan the fit → resample only when the plan
//! says so. It is all-or-nothing per image: either a complete
//! [`NormalizationResult`] comes back or an error does.

use super::backend::{Dimensions, Format, ImageBackend, ImagingError};
use super::calculations::{Preset, fit_scale, select_preset};
use super::params::{Quality, ResampleParams};
use super::rust_backend::RustBackend;
use serde::Serialize;
use tracing::{debug, info};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// Knobs for [`normalize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    /// Encoding quality used when a resample produces lossy output.
    pub quality: Quality,
}

/// Output of a normalization call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationResult {
    #[serde(skip)]
    pub buffer: Vec<u8>,
    pub source_width: u32,
    pub source_height: u32,
    pub width: u32,
    pub height: u32,
    pub resized: bool,
    /// Bucket chosen for the *source* aspect ratio, even on pass-through.
    pub preset: Preset,
    pub preset_label: &'static str,
    pub format: Format,
    pub content_type: &'static str,
}

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, bytes: &[u8]) -> Result<(u32, u32)> {
    let id = backend.identify(bytes)?;
    Ok((id.dimensions.width, id.dimensions.height))
}

/// Normalize `bytes` onto the nearest canonical preset.
///
/// Images that already fit their preset come back byte-identical with
/// `resized = false`. Anything larger is shrunk to fit, keeping aspect ratio,
/// and re-encoded in its source format.
pub fn normalize(
    backend: &impl ImageBackend,
    bytes: &[u8],
    options: &NormalizeOptions,
) -> Result<NormalizationResult> {
    let id = backend.identify(bytes)?;
    let Dimensions { width, height } = id.dimensions;
    if width == 0 || height == 0 {
        return Err(ImagingError::Decode(format!(
            "Image reports empty dimensions {width}x{height}"
        )));
    }

    let preset = select_preset(width, height);
    let target = preset.geometry();
    let plan = fit_scale(width, height, target);
    debug!(
        width,
        height,
        %preset,
        plan_width = plan.width,
        plan_height = plan.height,
        needs_resize = plan.needs_resize,
        "planned normalization"
    );

    if !plan.needs_resize {
        return Ok(NormalizationResult {
            buffer: bytes.to_vec(),
            source_width: width,
            source_height: height,
            width,
            height,
            resized: false,
            preset,
            preset_label: preset.label(),
            format: id.format,
            content_type: id.format.content_type(),
        });
    }

    let out = backend.resample(
        bytes,
        &ResampleParams {
            width: plan.width,
            height: plan.height,
            quality: options.quality,
        },
    )?;

    let Dimensions {
        width: out_w,
        height: out_h,
    } = out.dimensions;
    if out_w == 0 || out_h == 0 || !target.contains(out_w, out_h) {
        return Err(ImagingError::Resample(format!(
            "Backend produced {out_w}x{out_h}, outside {target}"
        )));
    }

    info!(
        width,
        height,
        out_width = out_w,
        out_height = out_h,
        preset = preset.label(),
        bytes = out.buffer.len(),
        "resampled image"
    );

    Ok(NormalizationResult {
        buffer: out.buffer,
        source_width: width,
        source_height: height,
        width: out_w,
        height: out_h,
        resized: true,
        preset,
        preset_label: preset.label(),
        format: id.format,
        content_type: id.format.content_type(),
    })
}

/// [`normalize`] with the pure-Rust backend and default options.
pub fn normalize_bytes(bytes: &[u8]) -> Result<NormalizationResult> {
    normalize(&RustBackend::new(), bytes, &NormalizeOptions::default())
}
