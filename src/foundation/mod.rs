//! Shared primitives and the crate error type.

/// Identifiers, frame rate and small value types.
pub mod core;
/// Error taxonomy.
pub mod error;
