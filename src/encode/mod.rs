//! Encoder processes.
//!
//! Frames are opaque encoded stills; nothing here decodes them.

/// Encoder command-line construction.
pub mod command;
/// `ffmpeg` process backend.
pub mod ffmpeg;
/// One-shot encoder availability probe.
pub mod probe;
/// Sink and backend traits plus the in-memory implementations.
pub mod sink;
