//! Pure calculation functions for preset selection and fit scaling.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Presets
//!
//! Three canonical geometries, held in one frozen table ([`PRESETS`]) so the
//! selector, the geometry lookup and the display label all read the same
//! source of truth:
//!
//! | Preset | Geometry | Chosen when `width / height` is |
//! |---|---|---|
//! | portrait | 896×1152 | `< 0.9` |
//! | square | 1024×1024 | `0.9 ..= 1.1` |
//! | landscape | 1152×896 | `> 1.1` |
//!
//! The band around 1.0 keeps near-square images square instead of flipping
//! between portrait and landscape on a pixel of cropping noise.

use serde::Serialize;
use std::fmt;

/// Ratios strictly below this classify as portrait.
pub const PORTRAIT_BELOW: f64 = 0.9;

/// Ratios strictly above this classify as landscape.
pub const LANDSCAPE_ABOVE: f64 = 1.1;

/// A target bounding box in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether `(width, height)` fits inside this box without scaling.
    pub fn contains(self, width: u32, height: u32) -> bool {
        width <= self.width && height <= self.height
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One of the three canonical output buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Square,
    Portrait,
    Landscape,
}

/// A row of the preset table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetSpec {
    pub preset: Preset,
    pub name: &'static str,
    /// Always `"{width}x{height}"` of `geometry`.
    pub label: &'static str,
    pub geometry: Geometry,
}

/// The preset table. Fixed configuration, never mutated at runtime.
pub static PRESETS: [PresetSpec; 3] = [
    PresetSpec {
        preset: Preset::Square,
        name: "square",
        label: "1024x1024",
        geometry: Geometry::new(1024, 1024),
    },
    PresetSpec {
        preset: Preset::Portrait,
        name: "portrait",
        label: "896x1152",
        geometry: Geometry::new(896, 1152),
    },
    PresetSpec {
        preset: Preset::Landscape,
        name: "landscape",
        label: "1152x896",
        geometry: Geometry::new(1152, 896),
    },
];

impl Preset {
    pub fn spec(self) -> &'static PresetSpec {
        match self {
            Preset::Square => &PRESETS[0],
            Preset::Portrait => &PRESETS[1],
            Preset::Landscape => &PRESETS[2],
        }
    }

    pub fn geometry(self) -> Geometry {
        self.spec().geometry
    }

    /// Display label, e.g. `"896x1152"`.
    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify an image by aspect ratio.
///
/// Both dimensions must be positive; callers reject zero-sized images before
/// getting here.
///
/// # Examples
/// ```
/// # use imgnorm::imaging::{Preset, select_preset};
/// assert_eq!(select_preset(899, 1000), Preset::Portrait);
/// assert_eq!(select_preset(900, 1000), Preset::Square);
/// assert_eq!(select_preset(1101, 1000), Preset::Landscape);
/// ```
pub fn select_preset(width: u32, height: u32) -> Preset {
    debug_assert!(width > 0 && height > 0, "dimensions must be positive");
    let ratio = width as f64 / height as f64;

    if ratio < PORTRAIT_BELOW {
        Preset::Portrait
    } else if ratio > LANDSCAPE_ABOVE {
        Preset::Landscape
    } else {
        Preset::Square
    }
}

/// Output of [`fit_scale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitPlan {
    pub width: u32,
    pub height: u32,
    pub needs_resize: bool,
}

/// Fit `(src_w, src_h)` inside `target`, preserving aspect ratio, never enlarging.
///
/// When the source already fits, the plan is the source size with
/// `needs_resize = false`. Otherwise the binding axis determines the scale and
/// both sides are rounded half away from zero (`f64::round`), then clamped to
/// `1..=target` so float noise can't push a side one pixel past the bound and
/// extreme ratios can't collapse a side to zero.
///
/// # Examples
/// ```
/// # use imgnorm::imaging::{Preset, fit_scale};
/// let plan = fit_scale(3000, 1500, Preset::Landscape.geometry());
/// assert_eq!((plan.width, plan.height, plan.needs_resize), (1152, 576, true));
/// ```
pub fn fit_scale(src_w: u32, src_h: u32, target: Geometry) -> FitPlan {
    if target.contains(src_w, src_h) {
        return FitPlan {
            width: src_w,
            height: src_h,
            needs_resize: false,
        };
    }

    let rw = target.width as f64 / src_w as f64;
    let rh = target.height as f64 / src_h as f64;
    let scale = rw.min(rh);

    let width = ((src_w as f64 * scale).round() as u32).clamp(1, target.width);
    let height = ((src_h as f64 * scale).round() as u32).clamp(1, target.height);

    FitPlan {
        width,
        height,
        needs_resize: true,
    }
}
