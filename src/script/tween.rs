use crate::foundation::core::EntityId;
use crate::foundation::error::WavyteResult;
use crate::script::api::ScriptApi;

/// Easing curves for frame-stepped tweens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation.
    #[default]
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in/out.
    InOutCubic,
    /// Hermite smoothstep.
    SmoothStep,
}

impl Ease {
    /// Map normalized progress `t` (clamped to `[0, 1]`).
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }

    /// Interpolate between `from` and `to`. `t >= 1` yields exactly `to`.
    pub fn interpolate(self, from: f64, to: f64, t: f64) -> f64 {
        if t >= 1.0 {
            return to;
        }
        from + (to - from) * self.apply(t)
    }
}

/// Animate a numeric property from `from` to `to` over `duration` seconds, one edit per frame.
///
/// The first edit happens immediately; the last one sets exactly `to` on the first frame at or
/// past `duration`. A non-positive duration sets `to` without suspending.
pub async fn tween_number(
    api: &ScriptApi,
    id: EntityId,
    property: &str,
    from: f64,
    to: f64,
    duration: f64,
    ease: Ease,
) -> WavyteResult<()> {
    if duration.is_nan() || duration <= 0.0 {
        return api.set_property(id, property, to);
    }
    api.set_property(id, property, from)?;
    let mut elapsed = 0.0;
    while elapsed < duration {
        api.wait_next_frame().await;
        elapsed += api.frame_delta()?;
        let value = ease.interpolate(from, to, elapsed / duration);
        api.set_property(id, property, value)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/script/tween.rs"]
mod tests;
