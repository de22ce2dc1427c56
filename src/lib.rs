//! framecast records rendered frames sent by a remote producer into `ffmpeg`.
//!
//! One session at a time: a `start` event launches the encoder, each `frame` event is written to
//! its stdin, and `request-next-frame` is sent back only once the write was accepted, so the
//! producer can never run ahead of the encoder. `finish` closes the pipe.
#![forbid(unsafe_code)]

mod foundation;

/// Process-wide recorder configuration.
pub mod config;
/// Encoder processes, probe and sinks.
pub mod encode;
/// Inbound events, outbound notifications and frame payload decoding.
pub mod protocol;
/// Event dispatch between a transport and the session controller.
pub mod router;
/// Recording session parameters and state machine.
pub mod session;
/// JSON-lines event transport.
pub mod transport;

pub use crate::config::RecorderConfig;
pub use crate::encode::ffmpeg::{FfmpegBackend, FfmpegSink};
pub use crate::encode::probe::Capability;
pub use crate::encode::sink::{
    EncoderBackend, EncoderExit, ExitReport, FrameSink, InMemoryBackend, InMemorySink,
    RecordedSession,
};
pub use crate::foundation::error::{FramecastError, FramecastResult};
pub use crate::protocol::{FramePayload, InboundEvent, Notification, Notifier};
pub use crate::router::{EventChannel, EventRouter, RawEvent};
pub use crate::session::controller::{Outcome, Phase, SessionController};
pub use crate::session::params::{Dimensions, OutputFormat, SessionDescriptor, StartRequest};
pub use crate::transport::JsonLinesChannel;
