use crate::foundation::error::{WavyteError, WavyteResult};
use crate::record::command::{Command, CommandKind};

/// Upper bound on mixer channels.
pub const MAX_CHANNELS: u16 = 8;

/// Decoded 16-bit PCM clip triggered by `PlaySound` commands.
#[derive(Clone, Debug, PartialEq)]
pub struct SoundSample {
    /// Diagnostic name (file name, generator, ...).
    pub name: String,
    /// Sample rate the PCM was decoded at.
    pub sample_rate: u32,
    channels: Vec<Vec<i16>>,
}

impl SoundSample {
    /// Build a sample from planar channel data. All channels must have the same length.
    pub fn new(
        name: impl Into<String>,
        sample_rate: u32,
        channels: Vec<Vec<i16>>,
    ) -> WavyteResult<Self> {
        if sample_rate == 0 {
            return Err(WavyteError::validation("sound sample rate must be > 0"));
        }
        let Some(first) = channels.first() else {
            return Err(WavyteError::validation(
                "sound sample needs at least one channel",
            ));
        };
        if channels.iter().any(|c| c.len() != first.len()) {
            return Err(WavyteError::validation(
                "sound sample channels must have equal length",
            ));
        }
        Ok(Self {
            name: name.into(),
            sample_rate,
            channels,
        })
    }

    /// Build a single-channel sample.
    pub fn mono(name: impl Into<String>, sample_rate: u32, pcm: Vec<i16>) -> WavyteResult<Self> {
        Self::new(name, sample_rate, vec![pcm])
    }

    /// Generate a mono sine tone. Used by demos and tests.
    pub fn sine(
        name: impl Into<String>,
        sample_rate: u32,
        freq_hz: f64,
        duration_secs: f64,
        amplitude: i16,
    ) -> WavyteResult<Self> {
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(WavyteError::validation("tone duration must be finite and >= 0"));
        }
        let len = (f64::from(sample_rate) * duration_secs).round() as usize;
        let step = std::f64::consts::TAU * freq_hz / f64::from(sample_rate.max(1));
        let pcm = (0..len)
            .map(|i| ((i as f64 * step).sin() * f64::from(amplitude)).round() as i16)
            .collect();
        Self::mono(name, sample_rate, pcm)
    }

    /// Number of sample frames.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Return `true` if the sample has no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// PCM of channel `ch`; channels beyond the sample's own reuse its last channel.
    pub fn channel(&self, ch: usize) -> &[i16] {
        let last = self.channels.len().saturating_sub(1);
        self.channels.get(ch.min(last)).map_or(&[][..], Vec::as_slice)
    }
}

/// Fixed-length, planar 16-bit output track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundTrack {
    /// Output sample rate.
    pub sample_rate: u32,
    channels: Vec<Vec<i16>>,
}

impl SoundTrack {
    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Return `true` if the track holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// PCM of channel `ch`.
    pub fn channel(&self, ch: usize) -> Option<&[i16]> {
        self.channels.get(ch).map(Vec::as_slice)
    }

    /// Track length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / f64::from(self.sample_rate)
    }

    /// Interleave channels frame by frame, the layout encoders consume.
    pub fn interleaved(&self) -> Vec<i16> {
        let mut out = Vec::with_capacity(self.len() * self.channel_count());
        for i in 0..self.len() {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }
}

/// Allocate a zero-filled track of `round(sample_rate * duration_secs)` samples per channel.
pub fn create_track(
    sample_rate: u32,
    channel_count: u16,
    duration_secs: f64,
) -> WavyteResult<SoundTrack> {
    if sample_rate == 0 {
        return Err(WavyteError::validation("track sample rate must be > 0"));
    }
    if channel_count == 0 || channel_count > MAX_CHANNELS {
        return Err(WavyteError::validation(format!(
            "track channel count must be in 1..={MAX_CHANNELS} (got {channel_count})"
        )));
    }
    if !duration_secs.is_finite() || duration_secs < 0.0 {
        return Err(WavyteError::validation(format!(
            "track duration must be finite and >= 0 (got {duration_secs})"
        )));
    }
    let len = (f64::from(sample_rate) * duration_secs).round() as usize;
    Ok(SoundTrack {
        sample_rate,
        channels: vec![vec![0i16; len]; usize::from(channel_count)],
    })
}

/// Add `sample` scaled by `volume` into `track` starting at `start_time` seconds.
///
/// Only the overlap with the track is mixed; each output sample saturates to the `i16` range.
/// Samples recorded at a different rate are mixed sample-for-sample without resampling.
pub fn mix_sample(track: &mut SoundTrack, sample: &SoundSample, start_time: f64, volume: f32) {
    let len = track.len() as i64;
    if !start_time.is_finite() {
        return;
    }
    let start = (start_time * f64::from(track.sample_rate)).round() as i64;
    if start >= len || sample.is_empty() {
        return;
    }
    if sample.sample_rate != track.sample_rate {
        tracing::warn!(
            sample = %sample.name,
            sample_rate = sample.sample_rate,
            track_rate = track.sample_rate,
            "sound sample rate differs from track rate; playing without resampling"
        );
    }

    let begin = start.max(0);
    let end = len.min(start + sample.len() as i64);
    let gain = f64::from(volume);
    for (ch, out) in track.channels.iter_mut().enumerate() {
        let src = sample.channel(ch);
        for i in begin..end {
            let s = src[(i - start) as usize];
            let add = (gain * f64::from(s)).round() as i64;
            let dst = &mut out[i as usize];
            *dst = (i64::from(*dst) + add).clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16;
        }
    }
}

/// Mix every `PlaySound` command into `track` in log order.
pub fn mix_sound_commands<'a>(
    track: &mut SoundTrack,
    commands: impl IntoIterator<Item = &'a Command>,
) -> usize {
    let mut mixed = 0;
    for cmd in commands {
        if let CommandKind::PlaySound { sample, volume } = &cmd.kind {
            mix_sample(track, sample, cmd.time, *volume);
            mixed += 1;
        }
    }
    mixed
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
