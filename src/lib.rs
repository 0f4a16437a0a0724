//! # imgnorm
//!
//! Normalizes arbitrary images onto three canonical output geometries so
//! downstream consumers (upload pipelines, boards, model inputs) only ever
//! see a handful of predictable sizes.
//!
//! # Architecture
//!
//! ```text
//! Fetcher ──► bytes ──► identify ──► select_preset ──► fit_scale ──► resample? ──► Store
//!   (I/O)               (backend)       (pure)           (pure)      (backend)      (I/O)
//! ```
//!
//! The decision logic (which preset, what size, whether to resize at all)
//! is two pure functions. Everything that touches pixels sits behind the
//! [`imaging::ImageBackend`] trait; everything that touches the network or
//! disk sits behind the [`fetch::Fetcher`] and [`store::Store`] traits. Each
//! seam has an in-memory fake in the test suite.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Preset table, selector, fit scaler, backend trait, `normalize` |
//! | [`fetch`] | `Fetcher` capability + blocking HTTP implementation |
//! | [`store`] | `Store` capability + content-addressed directory implementation |
//! | [`pipeline`] | Parallel batch driver: source → normalize → store, per-item results |
//! | [`config`] | `imgnorm.toml` loading, defaults, merging, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Three Fixed Presets
//!
//! | Preset | Box | Aspect (w/h) |
//! |---|---|---|
//! | portrait | 896×1152 | < 0.9 |
//! | square | 1024×1024 | 0.9 ..= 1.1 |
//! | landscape | 1152×896 | > 1.1 |
//!
//! The presets are policy, not configuration. They live in one frozen table
//! ([`imaging::PRESETS`]) that both the selector and the human-readable label
//! read, so the two can never disagree.
//!
//! ## Fit Inside, Never Enlarge
//!
//! An image that already fits its preset is returned byte-for-byte. Only
//! oversized images are resampled (Lanczos3), and the output is re-encoded in
//! the source format. Rounded dimensions are clamped to the preset box so a
//! float rounding error can never overshoot it by a pixel.
//!
//! ## All-or-Nothing per Image
//!
//! [`imaging::normalize`] either returns a complete result or a typed error.
//! Batch-level partial failure ("43 of 50 normalized") is handled one level
//! up, in [`pipeline::PipelineReport`].

pub mod config;
pub mod fetch;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
