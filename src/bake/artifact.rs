use std::collections::BTreeMap;

use crate::audio::mix::SoundTrack;
use crate::bake::fingerprint::{ArtifactFingerprint, fingerprint_parts};
use crate::foundation::core::Fps;
use crate::record::command::Command;
use crate::record::handle::{Handle2D, Handle3D};
use crate::script::fault::ScriptFault;

/// How a bake ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BakeOutcome {
    /// The root behavior ran to completion.
    Completed,
    /// The frame budget ran out before the root behavior finished.
    BudgetExceeded,
    /// The behavior faulted and the builtin error behavior was baked in its place.
    Recovered,
}

/// Output of a bake: a replayable command log plus the mixed soundtrack.
#[derive(Clone, Debug)]
pub struct BakedArtifact {
    /// Recorded commands, terminated by `End`.
    pub commands: Vec<Command>,
    /// Rate the bake was simulated at.
    pub fps: Fps,
    /// 2D editor handles.
    pub handles_2d: Vec<Handle2D>,
    /// 3D editor handles.
    pub handles_3d: Vec<Handle3D>,
    /// Mixed audio covering `[0, end time]`.
    pub sound_track: SoundTrack,
    /// How the bake ended.
    pub outcome: BakeOutcome,
    /// Number of frames advanced.
    pub frames: u64,
    /// Script fault that triggered the fallback, if any.
    pub fault: Option<ScriptFault>,
}

impl BakedArtifact {
    /// Return `true` if the user behavior faulted.
    pub fn has_error(&self) -> bool {
        self.fault.is_some()
    }

    /// Message of the fault, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.fault.as_ref().map(|f| f.message.as_str())
    }

    /// Diagnostic trace of the fault, if any.
    pub fn stack_trace(&self) -> Option<&str> {
        self.fault.as_ref().and_then(|f| f.stack_trace.as_deref())
    }

    /// Time carried by the terminal `End` command.
    pub fn end_time(&self) -> f64 {
        self.commands.last().map_or(0.0, |c| c.time)
    }

    /// Stable digest of commands, handles, frame rate and audio.
    pub fn fingerprint(&self) -> ArtifactFingerprint {
        fingerprint_parts(
            self.fps,
            &self.commands,
            &self.handles_2d,
            &self.handles_3d,
            &self.sound_track,
        )
    }

    /// Compact, serializable overview of the artifact.
    pub fn summary(&self) -> BakeSummary {
        let mut command_counts = BTreeMap::new();
        for cmd in &self.commands {
            *command_counts.entry(cmd.kind.name()).or_insert(0) += 1;
        }
        BakeSummary {
            outcome: self.outcome,
            frames: self.frames,
            end_time: self.end_time(),
            commands: self.commands.len(),
            command_counts,
            handles: self.handles_2d.len() + self.handles_3d.len(),
            audio_samples: self.sound_track.len(),
            audio_secs: self.sound_track.duration_secs(),
            fingerprint: self.fingerprint().to_string(),
            fault: self.fault.clone(),
        }
    }
}

/// JSON-friendly overview produced by [`BakedArtifact::summary`].
#[derive(Clone, Debug, serde::Serialize)]
pub struct BakeSummary {
    /// How the bake ended.
    pub outcome: BakeOutcome,
    /// Frames advanced.
    pub frames: u64,
    /// Time of the `End` command.
    pub end_time: f64,
    /// Total command count, `End` included.
    pub commands: usize,
    /// Command count per command name.
    pub command_counts: BTreeMap<&'static str, usize>,
    /// Total editor handles.
    pub handles: usize,
    /// Audio samples per channel.
    pub audio_samples: usize,
    /// Audio length in seconds.
    pub audio_secs: f64,
    /// Hex artifact fingerprint.
    pub fingerprint: String,
    /// Fault that triggered the fallback.
    pub fault: Option<ScriptFault>,
}
