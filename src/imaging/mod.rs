//! Image normalization in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Preset selection** | [`select_preset`] (pure) |
//! | **Fit planning** | [`fit_scale`] (pure) |
//! | **Resample** | Lanczos3 + re-encode in the source format |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for preset and dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`normalize`], combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{Dimensions, Format, ImageBackend, ImagingError};
pub use calculations::{
    FitPlan, Geometry, LANDSCAPE_ABOVE, PORTRAIT_BELOW, PRESETS, Preset, PresetSpec, fit_scale,
    select_preset,
};
pub use operations::{
    NormalizationResult, NormalizeOptions, get_dimensions, normalize, normalize_bytes,
};
pub use params::{Quality, ResampleParams};
pub use rust_backend::{RustBackend, supported_input_extensions};
