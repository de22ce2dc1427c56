use crate::encode::probe::Capability;
use crate::foundation::error::{FramecastError, FramecastResult};
use crate::session::params::SessionDescriptor;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

/// How an encoder process ended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExitReport {
    pub success: bool,
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    /// Last diagnostic lines the encoder printed.
    pub stderr_tail: Vec<String>,
}

enum ExitInner {
    Done(FramecastResult<ExitReport>),
    Pending(JoinHandle<FramecastResult<ExitReport>>),
}

/// Exit status of an encoder whose input has been closed.
///
/// Returned immediately by [`FrameSink::end`]; the encoder may still be flushing. Call
/// [`EncoderExit::wait`] to block until it is done.
pub struct EncoderExit {
    inner: ExitInner,
}

impl EncoderExit {
    pub fn completed(report: ExitReport) -> Self {
        Self {
            inner: ExitInner::Done(Ok(report)),
        }
    }

    pub(crate) fn pending(handle: JoinHandle<FramecastResult<ExitReport>>) -> Self {
        Self {
            inner: ExitInner::Pending(handle),
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.inner {
            ExitInner::Done(_) => true,
            ExitInner::Pending(h) => h.is_finished(),
        }
    }

    pub fn wait(self) -> FramecastResult<ExitReport> {
        match self.inner {
            ExitInner::Done(r) => r,
            ExitInner::Pending(h) => h
                .join()
                .map_err(|_| FramecastError::spawn("encoder reaper thread panicked"))?,
        }
    }
}

impl std::fmt::Debug for EncoderExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderExit")
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Input side of one running encoder.
pub trait FrameSink: Send {
    /// Deliver one encoded image. Returns once the bytes have been accepted.
    fn push_frame(&mut self, frame: &[u8]) -> FramecastResult<()>;
    /// Close the input. The sink must not be used afterwards.
    fn end(&mut self) -> FramecastResult<EncoderExit>;
}

/// Source of encoder processes.
pub trait EncoderBackend {
    /// One-shot availability check.
    fn probe(&self) -> Capability;
    /// Launch an encoder for `descriptor`, creating output directories as needed.
    fn spawn(&self, descriptor: &SessionDescriptor) -> FramecastResult<Box<dyn FrameSink>>;
}

/// What an [`InMemoryBackend`] saw for one session.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedSession {
    pub descriptor: SessionDescriptor,
    pub frames: Vec<Vec<u8>>,
    pub ended: bool,
}

/// Backend that keeps frames in memory, for tests and dry runs.
#[derive(Clone, Debug)]
pub struct InMemoryBackend {
    capability: Capability,
    fail_spawn: bool,
    fail_writes_after: Option<usize>,
    sessions: Arc<Mutex<Vec<RecordedSession>>>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            capability: Capability::Available {
                version: "in-memory".to_string(),
            },
            fail_spawn: false,
            fail_writes_after: None,
            sessions: Arc::default(),
        }
    }

    /// Backend whose probe reports `detail` as the failure.
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            capability: Capability::Unavailable {
                detail: detail.into(),
            },
            ..Self::new()
        }
    }

    pub fn with_spawn_failure(mut self) -> Self {
        self.fail_spawn = true;
        self
    }

    /// Reject every write after the first `n` accepted frames of a session.
    pub fn with_write_failure_after(mut self, n: usize) -> Self {
        self.fail_writes_after = Some(n);
        self
    }

    /// Snapshot of every session spawned so far.
    pub fn sessions(&self) -> Vec<RecordedSession> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EncoderBackend for InMemoryBackend {
    fn probe(&self) -> Capability {
        self.capability.clone()
    }

    fn spawn(&self, descriptor: &SessionDescriptor) -> FramecastResult<Box<dyn FrameSink>> {
        if self.fail_spawn {
            return Err(FramecastError::spawn("in-memory backend configured to fail"));
        }
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.push(RecordedSession {
            descriptor: descriptor.clone(),
            frames: Vec::new(),
            ended: false,
        });
        Ok(Box::new(InMemorySink {
            index: sessions.len() - 1,
            sessions: Arc::clone(&self.sessions),
            fail_writes_after: self.fail_writes_after,
            ended: false,
        }))
    }
}

/// Sink half of [`InMemoryBackend`].
#[derive(Debug)]
pub struct InMemorySink {
    index: usize,
    sessions: Arc<Mutex<Vec<RecordedSession>>>,
    fail_writes_after: Option<usize>,
    ended: bool,
}

impl FrameSink for InMemorySink {
    fn push_frame(&mut self, frame: &[u8]) -> FramecastResult<()> {
        if self.ended {
            return Err(FramecastError::write("in-memory sink is already finalized"));
        }
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let session = &mut sessions[self.index];
        if let Some(limit) = self.fail_writes_after
            && session.frames.len() >= limit
        {
            return Err(FramecastError::write("broken pipe (simulated)"));
        }
        session.frames.push(frame.to_vec());
        Ok(())
    }

    fn end(&mut self) -> FramecastResult<EncoderExit> {
        self.ended = true;
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions[self.index].ended = true;
        Ok(EncoderExit::completed(ExitReport {
            success: true,
            code: Some(0),
            stderr_tail: Vec::new(),
        }))
    }
}
