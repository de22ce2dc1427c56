//! Recording session state.
//!
//! [`params`] turns a raw `start` payload into an immutable descriptor; [`controller`] owns the
//! one live session and its encoder.

/// Session state machine and frame handshake.
pub mod controller;
/// Start payload validation and even-size normalization.
pub mod params;
