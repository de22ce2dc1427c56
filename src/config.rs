use crate::foundation::error::{FramecastError, FramecastResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default zero-padding width for image-sequence file names.
pub const DEFAULT_SEQUENCE_PADDING: u32 = 5;

/// Process-wide recorder configuration.
///
/// Every field has a default, so a partial JSON file (or none at all) is valid input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecorderConfig {
    /// Directory that receives all session artifacts.
    pub out_dir: PathBuf,
    /// Encoder binary, looked up on `PATH` when not absolute.
    pub ffmpeg_path: PathBuf,
    /// Extension of the muxed artifact in video mode.
    pub video_extension: String,
    /// Extension of each still in image-sequence mode.
    pub image_extension: String,
    /// Digit width of image-sequence frame numbers.
    pub sequence_padding: u32,
    /// H.264 constant rate factor.
    pub crf: u8,
    /// H.264 encoder preset.
    pub preset: String,
    /// Upper bound on the availability probe.
    pub probe_timeout_ms: u64,
    /// Replace existing artifacts instead of refusing to start.
    pub overwrite: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("recordings"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            video_extension: "mp4".to_string(),
            image_extension: "png".to_string(),
            sequence_padding: DEFAULT_SEQUENCE_PADDING,
            crf: 18,
            preset: "slow".to_string(),
            probe_timeout_ms: 5_000,
            overwrite: true,
        }
    }
}

impl RecorderConfig {
    /// Read a JSON config file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> FramecastResult<Self> {
        use anyhow::Context as _;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> FramecastResult<()> {
        if self.ffmpeg_path.as_os_str().is_empty() {
            return Err(FramecastError::validation("ffmpegPath must not be empty"));
        }
        if self.video_extension.is_empty() || self.image_extension.is_empty() {
            return Err(FramecastError::validation(
                "output extensions must not be empty",
            ));
        }
        if self.sequence_padding == 0 {
            return Err(FramecastError::validation(
                "sequencePadding must be positive",
            ));
        }
        if self.crf > 51 {
            return Err(FramecastError::validation("crf must be within 0..=51"));
        }
        if self.probe_timeout_ms == 0 {
            return Err(FramecastError::validation(
                "probeTimeoutMs must be non-zero",
            ));
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    pub fn with_ffmpeg_path(mut self, ffmpeg_path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = ffmpeg_path.into();
        self
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
