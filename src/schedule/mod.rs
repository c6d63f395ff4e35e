//! Virtual clock and the cooperative scheduler that drives script continuations.
//!
//! Time only moves when the orchestrator advances a frame. Every continuation that becomes due
//! during an advance, including ones made due by other continuations resuming, runs before the
//! advance returns.

/// Virtual time, frame counter and pending waits.
pub mod clock;
/// Task executor and the script-facing scheduler handle.
pub mod executor;
/// Awaitable wait handles.
pub mod wait;
