//! Shared test utilities for the imgnorm test suite.
//!
//! Fixtures are generated in memory rather than read from disk, so any size
//! and format combination a test needs is one call away.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let bytes = png_fixture(2048, 1024);
//! let fetcher = StaticFetcher::new().with("https://img.test/a.png", bytes);
//! ```

use crate::fetch::{FetchError, Fetcher};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::collections::HashMap;
use std::io::Cursor;

// =========================================================================
// Image fixtures
// =========================================================================

/// A deterministic RGB gradient of the given size.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

/// Encode a gradient fixture in `format`.
pub fn encode_fixture(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buffer, format)
        .unwrap_or_else(|e| panic!("failed to encode {format:?} fixture: {e}"));
    buffer.into_inner()
}

pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    encode_fixture(width, height, ImageFormat::Png)
}

pub fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
    encode_fixture(width, height, ImageFormat::Jpeg)
}

// =========================================================================
// Capability fakes
// =========================================================================

/// In-memory [`Fetcher`]: known URLs return their bytes, anything else is a 404.
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), bytes);
        self
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                message: "Not Found".to_string(),
            })
    }
}
