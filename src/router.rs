use crate::encode::sink::{EncoderBackend, ExitReport};
use crate::foundation::error::{FramecastError, FramecastResult};
use crate::protocol::{InboundEvent, Notification, START};
use crate::session::controller::{Outcome, Phase, SessionController};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One named event as it crosses the wire.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RawEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Bidirectional transport for named events.
pub trait EventChannel {
    /// Next inbound event, or `None` once the peer has gone away.
    fn recv(&mut self) -> FramecastResult<Option<RawEvent>>;
    fn send(&mut self, name: &str, data: Value) -> FramecastResult<()>;
}

/// Dispatches inbound events to the [`SessionController`] and forwards its notifications.
pub struct EventRouter<B, C> {
    controller: SessionController<B>,
    channel: C,
    outbox: Vec<Notification>,
}

impl<B: EncoderBackend, C: EventChannel> EventRouter<B, C> {
    pub fn new(controller: SessionController<B>, channel: C) -> Self {
        Self {
            controller,
            channel,
            outbox: Vec::new(),
        }
    }

    pub fn controller(&self) -> &SessionController<B> {
        &self.controller
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Probe the encoder, then serve events until the channel closes.
    ///
    /// On close, an active session is finished and all encoders are awaited so their artifacts
    /// are complete when this returns.
    pub fn run(&mut self) -> FramecastResult<Vec<ExitReport>> {
        self.controller.probe(&mut self.outbox);
        self.flush()?;

        while let Some(raw) = self.channel.recv()? {
            self.dispatch(raw)?;
        }

        tracing::info!("event channel closed, shutting down");
        let reports = self.controller.shutdown(&mut self.outbox);
        self.flush()?;
        reports
    }

    /// Handle one raw event and forward the resulting notifications.
    pub fn dispatch(&mut self, raw: RawEvent) -> FramecastResult<Option<Outcome>> {
        let outcome = match InboundEvent::from_parts(&raw.event, raw.data) {
            Ok(Some(event)) => Some(self.controller.handle(event, &mut self.outbox)),
            Ok(None) => {
                tracing::debug!(event = %raw.event, "ignoring unknown event");
                None
            }
            Err(e) if raw.event == START && self.controller.phase() == Phase::Streaming => {
                // Same as any start during a live session: refused without a notification.
                tracing::warn!(error = %e, "malformed start ignored, a session is already active");
                Some(Outcome::Rejected(FramecastError::SessionAlreadyActive))
            }
            Err(e) if raw.event == START => {
                // A malformed start is still a start: report it like any invalid parameters.
                let message = format!("cannot start recording: {e}");
                tracing::warn!("{message}");
                self.outbox.push(Notification::Warning(message));
                Some(Outcome::Rejected(e))
            }
            Err(e) => {
                tracing::warn!(event = %raw.event, error = %e, "dropping malformed event");
                None
            }
        };
        self.flush()?;
        Ok(outcome)
    }

    fn flush(&mut self) -> FramecastResult<()> {
        for notification in self.outbox.drain(..) {
            self.channel
                .send(notification.name(), notification.payload())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/router.rs"]
mod tests;
