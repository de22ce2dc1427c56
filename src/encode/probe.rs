use crate::foundation::error::{FramecastError, FramecastResult};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Whether the encoder binary can be invoked.
///
/// Determined once per process; a restart is required to re-probe.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Capability {
    #[default]
    Unchecked,
    /// First line of the encoder's version banner.
    Available { version: String },
    /// Why the probe failed.
    Unavailable { detail: String },
}

impl Capability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Run `<ffmpeg> -version` and classify the result.
///
/// A missing binary, a non-zero exit and a run longer than `timeout` all map to
/// [`Capability::Unavailable`].
pub fn probe(ffmpeg: &Path, timeout: Duration) -> Capability {
    match run_version(ffmpeg, timeout) {
        Ok(version) => {
            tracing::info!(%version, "encoder available");
            Capability::Available { version }
        }
        Err(e) => {
            tracing::warn!(error = %e, "encoder probe failed");
            Capability::Unavailable {
                detail: e.to_string(),
            }
        }
    }
}

fn run_version(ffmpeg: &Path, timeout: Duration) -> FramecastResult<String> {
    let mut child = Command::new(ffmpeg)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            FramecastError::unavailable(format!(
                "failed to launch '{}' (is it installed and on PATH?): {e}",
                ffmpeg.display()
            ))
        })?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| FramecastError::unavailable("failed to open probe stdout (unexpected)"))?;
    let reader = std::thread::spawn(move || {
        let mut bytes = Vec::new();
        stdout.read_to_end(&mut bytes).map(|_| bytes)
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(FramecastError::unavailable(format!(
                    "'{} -version' did not finish within {} ms",
                    ffmpeg.display(),
                    timeout.as_millis()
                )));
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                return Err(FramecastError::unavailable(format!(
                    "failed to wait for '{}': {e}",
                    ffmpeg.display()
                )));
            }
        }
    };

    if !status.success() {
        return Err(FramecastError::unavailable(format!(
            "'{} -version' exited with status {status}",
            ffmpeg.display()
        )));
    }

    let bytes = reader
        .join()
        .map_err(|_| FramecastError::unavailable("probe stdout reader panicked"))?
        .map_err(|e| FramecastError::unavailable(format!("probe stdout read failed: {e}")))?;
    let banner = String::from_utf8_lossy(&bytes);
    Ok(banner.lines().next().unwrap_or_default().trim().to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/probe.rs"]
mod tests;
