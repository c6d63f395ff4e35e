//! Scene model mutated by scripts during a bake.

/// Entities, property bags and scene-level rules.
pub mod model;
/// Read-only scene access for behaviors.
pub mod view;
