//! Deterministic off-line baking of scripted animations.
//!
//! A [`Behavior`] is an async script that edits a scene and suspends on explicit waits. The
//! [`Baker`] drives it against a virtual clock at a fixed frame rate, records every mutation
//! into a replayable command log and mixes triggered sounds into a 16-bit soundtrack:
//!
//! - Build [`BakeOpts`] (frame rate, time budget, audio format)
//! - Create a [`Baker`] and call [`Baker::bake`]
//! - Replay or inspect the [`BakedArtifact`]
//!
//! Baking is single-threaded and bit-for-bit reproducible: the same behavior and options always
//! produce the same [`ArtifactFingerprint`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Fixed-point audio mixing.
pub mod audio;
/// Bake orchestration.
pub mod bake;
/// Command log recording.
pub mod record;
/// Scene model.
pub mod scene;
/// Virtual clock and cooperative scheduler.
pub mod schedule;
/// Script authoring surface.
pub mod script;

pub use crate::foundation::core::{
    EntityId, Fps, FrameIndex, Point, RenderBufferId, ResourceKey, Rgba, TimeWindow, Vec2, Vec3,
};
pub use crate::foundation::error::{WavyteError, WavyteResult};

pub use crate::audio::mix::{SoundSample, SoundTrack, create_track, mix_sample};
pub use crate::bake::artifact::{BakeOutcome, BakeSummary, BakedArtifact};
pub use crate::bake::baker::{BakePhase, Baker};
pub use crate::bake::fingerprint::ArtifactFingerprint;
pub use crate::bake::options::BakeOpts;
pub use crate::record::command::{Command, CommandKind, EntityKind, EntitySnapshot, PropertyValue};
pub use crate::record::handle::{Handle2D, Handle3D, HandleKey};
pub use crate::record::recorder::{MutationRecorder, RecordedLog};
pub use crate::scene::model::Scene;
pub use crate::scene::view::SceneView;
pub use crate::schedule::clock::VirtualClock;
pub use crate::schedule::executor::{Scheduler, SchedulerHandle, TaskStatus};
pub use crate::schedule::wait::Wait;
pub use crate::script::api::{AbsorbTarget, ScriptApi};
pub use crate::script::behavior::{Behavior, ScriptFuture, ScriptResult};
pub use crate::script::builtin::{EmptyBehavior, ErrorBehavior};
pub use crate::script::fault::ScriptFault;
pub use crate::script::tween::{Ease, tween_number};
