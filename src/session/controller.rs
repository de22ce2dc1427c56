use crate::config::RecorderConfig;
use crate::encode::probe::Capability;
use crate::encode::sink::{EncoderBackend, EncoderExit, ExitReport, FrameSink};
use crate::foundation::error::{FramecastError, FramecastResult};
use crate::protocol::{FramePayload, InboundEvent, Notification, Notifier};
use crate::session::params::{SessionDescriptor, StartRequest, normalize};
use std::path::PathBuf;
use std::time::Instant;

/// Lifecycle phase of the recorder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No encoder; only `start` does anything.
    Idle,
    /// An encoder is running and accepting frames.
    Streaming,
    /// Input is being closed. Only observable from inside `finish`.
    Finishing,
    /// The probe failed. Absorbing until process restart.
    Unavailable,
}

/// What an inbound event did.
#[derive(Debug)]
pub enum Outcome {
    Started,
    FrameWritten { frames_recorded: u64 },
    /// The frame was dropped and no next frame was requested.
    FrameFailed(FramecastError),
    Finished { artifact: PathBuf, frames: u64 },
    /// Stray event for the current phase; nothing changed.
    Ignored,
    /// `start` was refused; nothing changed.
    Rejected(FramecastError),
}

struct ActiveSession {
    descriptor: SessionDescriptor,
    sink: Box<dyn FrameSink>,
    started_at: Instant,
}

/// Owns the single recording session and enforces the frame handshake.
///
/// Every event runs to completion, including the blocking pipe write, before the next one is
/// handled. `request-next-frame` is emitted only after a write was accepted.
pub struct SessionController<B> {
    cfg: RecorderConfig,
    backend: B,
    capability: Capability,
    phase: Phase,
    frames_recorded: u64,
    pending_crop_warning: Option<String>,
    active: Option<ActiveSession>,
    exits: Vec<EncoderExit>,
}

impl<B: EncoderBackend> SessionController<B> {
    pub fn new(cfg: RecorderConfig, backend: B) -> Self {
        Self {
            cfg,
            backend,
            capability: Capability::Unchecked,
            phase: Phase::Idle,
            frames_recorded: 0,
            pending_crop_warning: None,
            active: None,
            exits: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    pub fn frames_recorded(&self) -> u64 {
        self.frames_recorded
    }

    pub fn descriptor(&self) -> Option<&SessionDescriptor> {
        self.active.as_ref().map(|a| &a.descriptor)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Probe the encoder once. Later calls return the cached result.
    ///
    /// On failure a single warning is broadcast and the controller becomes `Unavailable`.
    pub fn probe(&mut self, out: &mut dyn Notifier) -> &Capability {
        if self.capability == Capability::Unchecked {
            self.capability = self.backend.probe();
            if let Capability::Unavailable { detail } = &self.capability {
                self.phase = Phase::Unavailable;
                let message = format!("ffmpeg is not available, recording is disabled: {detail}");
                warning(out, message);
            }
        }
        &self.capability
    }

    #[tracing::instrument(level = "debug", skip_all, fields(event = event.name(), phase = ?self.phase))]
    pub fn handle(&mut self, event: InboundEvent, out: &mut dyn Notifier) -> Outcome {
        match event {
            InboundEvent::Start(raw) => self.start(&raw, out),
            InboundEvent::Frame(payload) => self.frame(&payload, out),
            InboundEvent::Finish => self.finish(out),
        }
    }

    pub fn start(&mut self, raw: &StartRequest, out: &mut dyn Notifier) -> Outcome {
        self.probe(out);
        if let Capability::Unavailable { detail } = &self.capability {
            let err = FramecastError::unavailable(detail.clone());
            warning(out, format!("cannot start recording: {err}"));
            return Outcome::Rejected(err);
        }
        if self.phase != Phase::Idle {
            // Never replace a live encoder; the producer has to finish first.
            tracing::warn!(output = %raw.output_name, "start ignored, a session is already active");
            return Outcome::Rejected(FramecastError::SessionAlreadyActive);
        }

        let descriptor = match normalize(raw, &self.cfg) {
            Ok(d) => d,
            Err(e) => {
                warning(out, format!("cannot start recording: {e}"));
                return Outcome::Rejected(e);
            }
        };
        let sink = match self.backend.spawn(&descriptor) {
            Ok(sink) => sink,
            Err(e) => {
                warning(out, format!("cannot start recording: {e}"));
                return Outcome::Rejected(e);
            }
        };

        self.exits.retain(|exit| !exit.is_finished());
        self.frames_recorded = 0;
        self.pending_crop_warning = descriptor.crop_warning();
        tracing::info!(
            output = %descriptor.output_path().display(),
            width = descriptor.effective().width,
            height = descriptor.effective().height,
            fps = descriptor.frame_rate(),
            "session started"
        );
        self.active = Some(ActiveSession {
            descriptor,
            sink,
            started_at: Instant::now(),
        });
        self.phase = Phase::Streaming;
        log(out, "streaming started");
        Outcome::Started
    }

    pub fn frame(&mut self, payload: &FramePayload, out: &mut dyn Notifier) -> Outcome {
        if self.phase != Phase::Streaming {
            tracing::debug!(phase = ?self.phase, "stray frame ignored");
            return Outcome::Ignored;
        }
        let Some(active) = self.active.as_mut() else {
            return Outcome::Ignored;
        };

        let written = payload
            .decode()
            .and_then(|bytes| active.sink.push_frame(&bytes));
        if let Err(e) = written {
            // Withholding the next request stalls the producer instead of feeding a broken pipe.
            tracing::error!(
                error = %e,
                frames_recorded = self.frames_recorded,
                "frame was not delivered to the encoder"
            );
            return Outcome::FrameFailed(e);
        }

        self.frames_recorded += 1;
        let total = active.descriptor.total_frames_label();
        out.notify(Notification::RequestNextFrame);
        log(
            out,
            format!("recorded frame {} of {total}", self.frames_recorded),
        );
        Outcome::FrameWritten {
            frames_recorded: self.frames_recorded,
        }
    }

    pub fn finish(&mut self, out: &mut dyn Notifier) -> Outcome {
        if self.phase != Phase::Streaming {
            tracing::debug!(phase = ?self.phase, "stray finish ignored");
            return Outcome::Ignored;
        }
        let Some(mut active) = self.active.take() else {
            self.phase = Phase::Idle;
            return Outcome::Ignored;
        };

        self.phase = Phase::Finishing;
        let frames = self.frames_recorded;
        let closed = active.sink.end();
        self.frames_recorded = 0;
        self.phase = Phase::Idle;

        match closed {
            Ok(exit) => {
                self.exits.push(exit);
                tracing::info!(
                    frames,
                    elapsed_ms = active.started_at.elapsed().as_millis() as u64,
                    "session finished"
                );
                log(
                    out,
                    format!("{} recording complete", active.descriptor.artifact_label()),
                );
            }
            Err(e) => warning(out, format!("encoder did not shut down cleanly: {e}")),
        }
        if let Some(message) = self.pending_crop_warning.take() {
            warning(out, message);
        }

        Outcome::Finished {
            artifact: active.descriptor.output_path().to_path_buf(),
            frames,
        }
    }

    /// Finish any active session and wait for every encoder to exit.
    pub fn shutdown(&mut self, out: &mut dyn Notifier) -> FramecastResult<Vec<ExitReport>> {
        if self.phase == Phase::Streaming {
            self.finish(out);
        }
        // Wait on every exit before surfacing the first failure.
        let results: Vec<_> = self.exits.drain(..).map(EncoderExit::wait).collect();
        results.into_iter().collect()
    }
}

fn log(out: &mut dyn Notifier, message: impl Into<String>) {
    let message = message.into();
    tracing::info!("{message}");
    out.notify(Notification::Log(message));
}

fn warning(out: &mut dyn Notifier, message: impl Into<String>) {
    let message = message.into();
    tracing::warn!("{message}");
    out.notify(Notification::Warning(message));
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
