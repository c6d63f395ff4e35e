//! Command log: recorded scene mutations and editor handles.

/// Command and property value types.
pub mod command;
/// Editor handle windows.
pub mod handle;
/// Append-only recorder with recording boundaries.
pub mod recorder;
