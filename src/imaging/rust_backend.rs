//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format sniffing | `image::ImageReader::with_guessed_format` (magic bytes) |
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `DynamicImage::resize` with `Lanczos3`, fit-inside |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at configured quality |
//! | Encode → PNG / TIFF / WebP | `DynamicImage::write_to` (WebP is lossless) |

use super::backend::{Dimensions, Format, Identified, ImageBackend, ImagingError, Resampled};
use super::params::{Quality, ResampleParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn to_format(format: ImageFormat) -> Option<Format> {
    match format {
        ImageFormat::Jpeg => Some(Format::Jpeg),
        ImageFormat::Png => Some(Format::Png),
        ImageFormat::Tiff => Some(Format::Tiff),
        ImageFormat::WebP => Some(Format::WebP),
        _ => None,
    }
}

fn to_image_format(format: Format) -> ImageFormat {
    match format {
        Format::Jpeg => ImageFormat::Jpeg,
        Format::Png => ImageFormat::Png,
        Format::Tiff => ImageFormat::Tiff,
        Format::WebP => ImageFormat::WebP,
    }
}

/// Open a reader over in-memory bytes with the format sniffed from magic bytes.
fn open(bytes: &[u8]) -> Result<(ImageReader<Cursor<&[u8]>>, Format), ImagingError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImagingError::Decode(format!("Failed to read image header: {e}")))?;
    let format = reader
        .format()
        .and_then(to_format)
        .ok_or_else(|| ImagingError::Decode("Unrecognized or unsupported image format".into()))?;
    Ok((reader, format))
}

/// Encode `img` in `format`. JPEG drops alpha; WebP only takes 8-bit RGB(A).
fn encode(img: &DynamicImage, format: Format, quality: Quality) -> Result<Vec<u8>, ImagingError> {
    let mut buffer = Cursor::new(Vec::new());

    let written = match format {
        Format::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.value() as u8);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
        Format::WebP => {
            let img = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            img.write_to(&mut buffer, ImageFormat::WebP)
        }
        Format::Png | Format::Tiff => img.write_to(&mut buffer, to_image_format(format)),
    };

    written.map_err(|e| {
        ImagingError::Resample(format!("{} encode failed: {e}", format.extension()))
    })?;
    Ok(buffer.into_inner())
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<Identified, ImagingError> {
        let (reader, format) = open(bytes)?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ImagingError::Decode(format!("Failed to read dimensions: {e}")))?;
        if width == 0 || height == 0 {
            return Err(ImagingError::Decode(format!(
                "Image reports empty dimensions {width}x{height}"
            )));
        }
        Ok(Identified {
            dimensions: Dimensions { width, height },
            format,
        })
    }

    fn resample(&self, bytes: &[u8], params: &ResampleParams) -> Result<Resampled, ImagingError> {
        let (reader, format) = open(bytes)?;
        let img = reader
            .decode()
            .map_err(|e| ImagingError::Decode(format!("Failed to decode image: {e}")))?;

        // `resize` fits inside the box and keeps aspect ratio, so a bad request
        // can shrink but never stretch the image.
        let resized = img.resize(params.width, params.height, FilterType::Lanczos3);
        let dimensions = Dimensions {
            width: resized.width(),
            height: resized.height(),
        };
        let buffer = encode(&resized, format, params.quality)?;

        Ok(Resampled { buffer, dimensions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{encode_fixture, jpeg_fixture, png_fixture};

    fn params(width: u32, height: u32) -> ResampleParams {
        ResampleParams {
            width,
            height,
            quality: Quality::default(),
        }
    }

    #[test]
    fn supported_extensions_cover_all_candidates() {
        let exts = supported_input_extensions();
        for ext in ["jpg", "jpeg", "png", "tif", "tiff", "webp"] {
            assert!(exts.contains(&ext), "missing {ext}");
        }
    }

    #[test]
    fn identify_png() {
        let bytes = png_fixture(320, 200);
        let id = RustBackend::new().identify(&bytes).unwrap();
        assert_eq!(id.dimensions, Dimensions { width: 320, height: 200 });
        assert_eq!(id.format, Format::Png);
    }

    #[test]
    fn identify_jpeg() {
        let bytes = jpeg_fixture(64, 48);
        let id = RustBackend::new().identify(&bytes).unwrap();
        assert_eq!(id.dimensions, Dimensions { width: 64, height: 48 });
        assert_eq!(id.format, Format::Jpeg);
    }

    #[test]
    fn identify_rejects_garbage() {
        let result = RustBackend::new().identify(b"definitely not an image");
        assert!(matches!(result, Err(ImagingError::Decode(_))));
    }

    #[test]
    fn identify_rejects_empty_input() {
        let result = RustBackend::new().identify(&[]);
        assert!(matches!(result, Err(ImagingError::Decode(_))));
    }

    #[test]
    fn identify_rejects_truncated_png() {
        let bytes = png_fixture(100, 100);
        let result = RustBackend::new().identify(&bytes[..12]);
        assert!(matches!(result, Err(ImagingError::Decode(_))));
    }

    #[test]
    fn resample_png_keeps_format() {
        let bytes = png_fixture(400, 200);
        let backend = RustBackend::new();
        let out = backend.resample(&bytes, &params(200, 100)).unwrap();

        assert_eq!(out.dimensions, Dimensions { width: 200, height: 100 });
        let id = backend.identify(&out.buffer).unwrap();
        assert_eq!(id.format, Format::Png);
        assert_eq!(id.dimensions, out.dimensions);
    }

    #[test]
    fn resample_jpeg_keeps_format() {
        let bytes = jpeg_fixture(300, 300);
        let backend = RustBackend::new();
        let out = backend.resample(&bytes, &params(150, 150)).unwrap();

        let id = backend.identify(&out.buffer).unwrap();
        assert_eq!(id.format, Format::Jpeg);
        assert_eq!(id.dimensions, Dimensions { width: 150, height: 150 });
    }

    #[test]
    fn resample_never_stretches_past_source_aspect() {
        // A mismatched box: the image still fits inside, aspect intact
        let bytes = png_fixture(400, 200);
        let out = RustBackend::new()
            .resample(&bytes, &params(100, 100))
            .unwrap();
        assert_eq!(out.dimensions, Dimensions { width: 100, height: 50 });
    }

    #[test]
    fn resample_webp_round_trip() {
        let bytes = encode_fixture(120, 60, ImageFormat::WebP);
        let backend = RustBackend::new();
        let out = backend.resample(&bytes, &params(60, 30)).unwrap();
        let id = backend.identify(&out.buffer).unwrap();
        assert_eq!(id.format, Format::WebP);
        assert_eq!(id.dimensions, Dimensions { width: 60, height: 30 });
    }
}
