//! Script authoring surface: behaviors, the mutation API, fault capture and tweening.

/// Mutation and timing API handed to behaviors.
pub mod api;
/// The `Behavior` trait.
pub mod behavior;
/// Builtin fallback behaviors.
pub mod builtin;
/// Captured script faults.
pub mod fault;
/// Frame-stepped tweens.
pub mod tween;
