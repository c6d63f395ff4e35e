//! Bake orchestration: run a behavior to completion and package the command log and audio.

/// Baked output types.
pub mod artifact;
/// The orchestrator state machine.
pub mod baker;
/// Stable artifact digest.
pub mod fingerprint;
/// Bake options.
pub mod options;
