//! Deterministic 16-bit PCM mixing of recorded sound triggers.

/// Track allocation and saturating mix.
pub mod mix;
