use crate::config::RecorderConfig;
use crate::encode::command::{display_args, encoder_args, encoder_command};
use crate::encode::probe::{self, Capability};
use crate::encode::sink::{EncoderBackend, EncoderExit, ExitReport, FrameSink};
use crate::foundation::error::{FramecastError, FramecastResult};
use crate::session::params::{OutputFormat, SessionDescriptor};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStderr, ChildStdin};
use std::thread::JoinHandle;

const STDERR_TAIL_LINES: usize = 20;

/// Backend that launches the system `ffmpeg` once per session.
#[derive(Clone, Debug)]
pub struct FfmpegBackend {
    cfg: RecorderConfig,
}

impl FfmpegBackend {
    pub fn new(cfg: RecorderConfig) -> Self {
        Self { cfg }
    }
}

impl EncoderBackend for FfmpegBackend {
    fn probe(&self) -> Capability {
        probe::probe(&self.cfg.ffmpeg_path, self.cfg.probe_timeout())
    }

    fn spawn(&self, descriptor: &SessionDescriptor) -> FramecastResult<Box<dyn FrameSink>> {
        match descriptor.format() {
            OutputFormat::Video => ensure_parent_dir(descriptor.output_path())?,
            OutputFormat::ImageSequence => ensure_dir(descriptor.output_path())?,
        }

        let args = encoder_args(descriptor, &self.cfg);
        tracing::info!(
            command = %display_args(&self.cfg.ffmpeg_path, &args),
            "spawning encoder"
        );

        let mut child = encoder_command(descriptor, &self.cfg).spawn().map_err(|e| {
            FramecastError::spawn(format!(
                "failed to spawn '{}' (is it installed and on PATH?): {e}",
                self.cfg.ffmpeg_path.display()
            ))
        })?;

        let stdin = child.stdin.take();
        let stderr = child.stderr.take();
        let (Some(stdin), Some(stderr)) = (stdin, stderr) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(FramecastError::spawn(
                "failed to open encoder stdin/stderr (unexpected)",
            ));
        };

        Ok(Box::new(FfmpegSink {
            label: descriptor.artifact_label(),
            child: Some(child),
            stdin: Some(stdin),
            stderr_drain: Some(spawn_stderr_drain(stderr)),
        }))
    }
}

/// Input pipe of one running `ffmpeg` process.
///
/// The stderr drain thread lives exactly as long as the process: started at spawn, joined by
/// the reaper after the process exits.
pub struct FfmpegSink {
    label: String,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<Vec<String>>>,
}

impl FrameSink for FfmpegSink {
    fn push_frame(&mut self, frame: &[u8]) -> FramecastResult<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(FramecastError::write("encoder input is already closed"));
        };
        stdin
            .write_all(frame)
            .and_then(|()| stdin.flush())
            .map_err(|e| FramecastError::write(format!("failed to write frame to ffmpeg stdin: {e}")))
    }

    fn end(&mut self) -> FramecastResult<EncoderExit> {
        drop(self.stdin.take());
        let child = self
            .child
            .take()
            .ok_or_else(|| FramecastError::write("encoder already finished"))?;
        let drain = self.stderr_drain.take();
        let label = self.label.clone();

        let reaper = std::thread::Builder::new()
            .name("framecast-reaper".to_string())
            .spawn(move || reap(child, drain, &label))
            .map_err(|e| FramecastError::Other(anyhow::Error::new(e)))?;
        Ok(EncoderExit::pending(reaper))
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // An abandoned sink still closes the pipe and reaps the child in the background.
        if self.child.is_some() {
            let _ = self.end();
        }
    }
}

fn spawn_stderr_drain(stderr: ChildStderr) -> JoinHandle<Vec<String>> {
    std::thread::spawn(move || {
        let mut reader = BufReader::new(stderr);
        let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    tracing::debug!(target: "framecast::encoder", "{line}");
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "encoder stderr read failed");
                    break;
                }
            }
        }
        tail.into_iter().collect()
    })
}

fn reap(
    mut child: Child,
    drain: Option<JoinHandle<Vec<String>>>,
    label: &str,
) -> FramecastResult<ExitReport> {
    let status = child.wait().map_err(|e| {
        FramecastError::Other(anyhow::anyhow!("failed to wait for ffmpeg to finish: {e}"))
    })?;
    let stderr_tail = match drain {
        Some(handle) => handle
            .join()
            .map_err(|_| FramecastError::Other(anyhow::anyhow!("ffmpeg stderr drain thread panicked")))?,
        None => Vec::new(),
    };

    if status.success() {
        tracing::info!(artifact = label, "encoder finished");
    } else {
        tracing::warn!(
            artifact = label,
            %status,
            stderr = %stderr_tail.join("\n"),
            "encoder exited with failure"
        );
    }

    Ok(ExitReport {
        success: status.success(),
        code: status.code(),
        stderr_tail,
    })
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> FramecastResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Ensure `dir` exists, creating intermediate directories.
pub fn ensure_dir(dir: &Path) -> FramecastResult<()> {
    use anyhow::Context as _;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
