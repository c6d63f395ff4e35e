use crate::foundation::error::{WavyteError, WavyteResult};

pub use kurbo::{Point, Vec2};

/// Monotonic 0-based frame counter of the virtual clock.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> WavyteResult<Self> {
        let fps = Self { num, den };
        fps.validate()?;
        Ok(fps)
    }

    pub(crate) fn validate(self) -> WavyteResult<()> {
        if self.den == 0 {
            return Err(WavyteError::validation("Fps den must be > 0"));
        }
        if self.num == 0 {
            return Err(WavyteError::validation("Fps num must be > 0"));
        }
        Ok(())
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds; this is the fixed step the bake loop advances by.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Number of whole frames covering `secs`, rounded to nearest.
    pub fn frames_for_secs_round(self, secs: f64) -> u64 {
        if !secs.is_finite() {
            return 0;
        }
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 60, den: 1 }
    }
}

/// Stable scene entity identifier, allocated sequentially per bake.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of an offscreen render buffer requested by a script.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct RenderBufferId(pub u32);

/// Opaque handle to an externally managed resource (image, font, mesh, ...).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ResourceKey(pub String);

/// 3D vector used by 3D entities and handles.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Straight-alpha RGBA color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque red, used for error overlays.
    pub const RED: Self = Self::new(1.0, 0.2, 0.2, 1.0);

    /// Create a color from components.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Half-open validity window `[start, end)` in seconds of virtual time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeWindow {
    /// Inclusive start time.
    pub start: f64,
    /// Exclusive end time.
    pub end: f64,
}

impl TimeWindow {
    /// Return `true` when `t` is inside `[start, end)`.
    pub fn contains(self, t: f64) -> bool {
        self.start <= t && t < self.end
    }

    /// Window length in seconds.
    pub fn duration(self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
