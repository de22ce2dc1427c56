//! Named events exchanged with the frame producer.
//!
//! The core only sees `(name, payload)` pairs; how they cross the wire is up to the
//! [`EventChannel`](crate::router::EventChannel) implementation.

use crate::foundation::error::{FramecastError, FramecastResult};
use crate::session::params::StartRequest;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;

pub const START: &str = "start";
pub const FRAME: &str = "frame";
pub const FINISH: &str = "finish";

pub const WARNING: &str = "warning";
pub const LOG: &str = "log";
pub const REQUEST_NEXT_FRAME: &str = "request-next-frame";

/// Payload of a `frame` event.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FramePayload {
    /// Data URL (`data:image/png;base64,....`) of one encoded still.
    pub image_data: String,
}

impl FramePayload {
    pub fn decode(&self) -> FramecastResult<Vec<u8>> {
        decode_image_data(&self.image_data)
    }
}

/// Session-control event sent by the producer.
#[derive(Clone, Debug)]
pub enum InboundEvent {
    Start(StartRequest),
    Frame(FramePayload),
    Finish,
}

impl InboundEvent {
    /// Parse a named event. Unknown names yield `Ok(None)`.
    pub fn from_parts(name: &str, data: Value) -> FramecastResult<Option<Self>> {
        let event = match name {
            START => Self::Start(serde_json::from_value(data).map_err(|e| {
                FramecastError::validation(format!("malformed start payload: {e}"))
            })?),
            FRAME => Self::Frame(serde_json::from_value(data).map_err(|e| {
                FramecastError::protocol(format!("malformed frame payload: {e}"))
            })?),
            FINISH => Self::Finish,
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Start(_) => START,
            Self::Frame(_) => FRAME,
            Self::Finish => FINISH,
        }
    }
}

/// Notification sent back to the producer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Warning(String),
    Log(String),
    /// The only flow-control signal: the producer may send exactly one more frame.
    RequestNextFrame,
}

impl Notification {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Warning(_) => WARNING,
            Self::Log(_) => LOG,
            Self::RequestNextFrame => REQUEST_NEXT_FRAME,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Self::Warning(message) | Self::Log(message) => {
                serde_json::json!({ "message": message })
            }
            Self::RequestNextFrame => serde_json::json!({}),
        }
    }
}

/// Receiver of outbound notifications.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

impl Notifier for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Extract the image bytes from a data URL: everything after the first comma, base64-decoded.
///
/// A string without a comma is treated as bare base64.
pub fn decode_image_data(image_data: &str) -> FramecastResult<Vec<u8>> {
    let encoded = image_data
        .split_once(',')
        .map_or(image_data, |(_, rest)| rest);
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| FramecastError::protocol(format!("frame is not valid base64: {e}")))?;
    if bytes.is_empty() {
        return Err(FramecastError::protocol("frame payload is empty"));
    }
    Ok(bytes)
}

#[cfg(test)]
#[path = "../tests/unit/protocol.rs"]
mod tests;
