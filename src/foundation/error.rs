/// Convenience result type used across framecast.
pub type FramecastResult<T> = Result<T, FramecastError>;

/// Top-level framecast error type.
///
/// None of these are fatal to the host process. The session controller turns them into
/// `warning`/`log` notifications at the event boundary.
#[derive(thiserror::Error, Debug)]
pub enum FramecastError {
    /// A start payload or configuration value was rejected.
    #[error("invalid parameters: {0}")]
    Validation(String),

    /// The encoder binary could not be invoked when probed.
    #[error("encoder unavailable: {0}")]
    Unavailable(String),

    /// The encoder process could not be launched.
    #[error("spawn failed: {0}")]
    Spawn(String),

    /// Frame bytes could not be delivered to the encoder.
    #[error("write failed: {0}")]
    Write(String),

    /// An inbound event could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// A start arrived while another session still owns the encoder.
    #[error("a recording session is already active")]
    SessionAlreadyActive,

    /// Any other error, usually IO with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramecastError {
    /// Build a [`FramecastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FramecastError::Unavailable`] value.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Build a [`FramecastError::Spawn`] value.
    pub fn spawn(msg: impl Into<String>) -> Self {
        Self::Spawn(msg.into())
    }

    /// Build a [`FramecastError::Write`] value.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Build a [`FramecastError::Protocol`] value.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Build a [`FramecastError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for FramecastError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
