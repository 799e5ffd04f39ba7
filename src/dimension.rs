//! Target raster size resolution.
//!
//! Precedence for each axis is: explicit request, then process defaults,
//! then the intrinsic size of the decoded source. When the aspect ratio is
//! locked and exactly one axis was requested, the other axis is derived
//! from the intrinsic ratio.

use serde::{Deserialize, Serialize};

/// Intrinsic size used per axis when the source reports zero on that axis.
pub const FALLBACK_SIZE: (u32, u32) = (800, 600);

/// Width/height request with an aspect-ratio lock.
///
/// `maintain_aspect_ratio` is tri-state: only an explicit `false` disables
/// the lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub maintain_aspect_ratio: Option<bool>,
}

impl DimensionConfig {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            width,
            height,
            maintain_aspect_ratio: None,
        }
    }

    pub fn with_aspect_lock(mut self, lock: bool) -> Self {
        self.maintain_aspect_ratio = Some(lock);
        self
    }

    /// Width if set to a positive value.
    pub fn width(&self) -> Option<u32> {
        self.width.filter(|w| *w > 0)
    }

    /// Height if set to a positive value.
    pub fn height(&self) -> Option<u32> {
        self.height.filter(|h| *h > 0)
    }

    pub fn keeps_aspect_ratio(&self) -> bool {
        self.maintain_aspect_ratio != Some(false)
    }

    /// Overwrite fields that `partial` supplies, leave the rest untouched.
    pub fn merge(&mut self, partial: &DimensionConfig) {
        if partial.width.is_some() {
            self.width = partial.width;
        }
        if partial.height.is_some() {
            self.height = partial.height;
        }
        if partial.maintain_aspect_ratio.is_some() {
            self.maintain_aspect_ratio = partial.maintain_aspect_ratio;
        }
    }

    /// Defaults the process starts with: 800px wide, ratio locked.
    pub fn initial_defaults() -> Self {
        Self {
            width: Some(800),
            height: None,
            maintain_aspect_ratio: Some(true),
        }
    }
}

/// Final raster size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Resolve the output size for a source of the given intrinsic size.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn resolve(
    intrinsic_width: u32,
    intrinsic_height: u32,
    requested: &DimensionConfig,
    defaults: &DimensionConfig,
) -> Size {
    let (intrinsic_width, intrinsic_height) = intrinsic_or_fallback(intrinsic_width, intrinsic_height);
    let aspect = f64::from(intrinsic_width) / f64::from(intrinsic_height);

    let mut width = requested
        .width()
        .or_else(|| defaults.width())
        .unwrap_or(intrinsic_width);
    let mut height = requested
        .height()
        .or_else(|| defaults.height())
        .unwrap_or(intrinsic_height);

    if requested.keeps_aspect_ratio() {
        match (requested.width(), requested.height()) {
            (Some(_), None) => height = round_half_up(f64::from(width) / aspect),
            (None, Some(_)) => width = round_half_up(f64::from(height) * aspect),
            _ => {}
        }
    }

    Size::new(width.max(1), height.max(1))
}

/// Replace each zero axis with its fallback, keeping the other axis.
pub fn intrinsic_or_fallback(width: u32, height: u32) -> (u32, u32) {
    let width = if width == 0 { FALLBACK_SIZE.0 } else { width };
    let height = if height == 0 { FALLBACK_SIZE.1 } else { height };
    (width, height)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_half_up(value: f64) -> u32 {
    (value + 0.5).floor().clamp(0.0, f64::from(u32::MAX)) as u32
}
