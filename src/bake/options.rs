use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::audio::mix::MAX_CHANNELS;
use crate::foundation::core::Fps;
use crate::foundation::error::{WavyteError, WavyteResult};

/// Options controlling one bake.
///
/// Missing JSON fields fall back to [`BakeOpts::default`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BakeOpts {
    /// Fixed simulation rate; the bake advances by `1 / fps` per frame.
    pub fps: Fps,
    /// Simulation budget in seconds. Scripts still running past it are cut off.
    pub max_length_secs: f64,
    /// Output audio sample rate.
    pub sample_rate: u32,
    /// Output audio channel count.
    pub channels: u16,
}

impl Default for BakeOpts {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            max_length_secs: 600.0,
            sample_rate: 44_100,
            channels: 2,
        }
    }
}

impl BakeOpts {
    /// Parse options from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> WavyteResult<Self> {
        let opts: Self = serde_json::from_reader(r)
            .map_err(|e| WavyteError::serde(format!("parse bake options JSON: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Parse options from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> WavyteResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            WavyteError::validation(format!("open bake options '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every field for a usable value.
    pub fn validate(&self) -> WavyteResult<()> {
        self.fps.validate()?;
        if !self.max_length_secs.is_finite() || self.max_length_secs < 0.0 {
            return Err(WavyteError::validation(format!(
                "max_length_secs must be finite and >= 0 (got {})",
                self.max_length_secs
            )));
        }
        if self.sample_rate == 0 {
            return Err(WavyteError::validation("sample_rate must be > 0"));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(WavyteError::validation(format!(
                "channels must be in 1..={MAX_CHANNELS} (got {})",
                self.channels
            )));
        }
        Ok(())
    }

    /// Number of frames the budget allows: `round(max_length_secs * fps)`.
    pub fn frame_budget(&self) -> u64 {
        self.fps.frames_for_secs_round(self.max_length_secs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/options.rs"]
mod tests;
