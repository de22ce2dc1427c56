use crate::config::RecorderConfig;
use crate::foundation::error::{FramecastError, FramecastResult};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Output variant of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One muxed video file.
    Video,
    /// One numbered still per frame inside a per-session directory.
    ImageSequence,
}

impl FromStr for OutputFormat {
    type Err = FramecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "image-sequence" | "imageSequence" => Ok(Self::ImageSequence),
            other => Err(FramecastError::validation(format!(
                "unknown output format '{other}' (expected 'video' or 'image-sequence')"
            ))),
        }
    }
}

/// Width/height pair in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Round each axis down to the nearest even value.
    ///
    /// Never rounds up: trimming happens on the last row/column only, so the crop stays inside
    /// the producer's canvas.
    pub fn even_floor(self) -> Self {
        Self {
            width: self.width & !1,
            height: self.height & !1,
        }
    }
}

/// Raw `start` payload as sent by the producer.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub output_name: String,
    pub format: String,
    pub frame_rate: f64,
    #[serde(default)]
    pub expected_frame_count: Option<u64>,
    pub width: i64,
    pub height: i64,
}

/// Immutable, validated parameters of one recording session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionDescriptor {
    output_name: String,
    format: OutputFormat,
    requested: Dimensions,
    effective: Dimensions,
    frame_rate: f64,
    expected_frame_count: Option<u64>,
    sequence_padding: u32,
    extension: String,
    output_path: PathBuf,
}

impl SessionDescriptor {
    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn requested(&self) -> Dimensions {
        self.requested
    }

    pub fn effective(&self) -> Dimensions {
        self.effective
    }

    pub fn was_cropped(&self) -> bool {
        self.effective != self.requested
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// `None` when the producer did not announce a total (or announced zero).
    pub fn expected_frame_count(&self) -> Option<u64> {
        self.expected_frame_count
    }

    pub fn sequence_padding(&self) -> u32 {
        self.sequence_padding
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Video file in video mode, per-session directory in image-sequence mode.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// `printf`-style pattern for numbered stills, e.g. `clip/%05d.png`.
    pub fn frame_pattern(&self) -> Option<PathBuf> {
        match self.format {
            OutputFormat::Video => None,
            OutputFormat::ImageSequence => Some(self.output_path.join(format!(
                "%0{}d.{}",
                self.sequence_padding, self.extension
            ))),
        }
    }

    /// Short artifact name used in producer-facing messages.
    pub fn artifact_label(&self) -> String {
        match self.format {
            OutputFormat::Video => format!("{}.{}", self.output_name, self.extension),
            OutputFormat::ImageSequence => format!("{}/", self.output_name),
        }
    }

    pub fn total_frames_label(&self) -> String {
        match self.expected_frame_count {
            Some(n) => n.to_string(),
            None => "Infinity".to_string(),
        }
    }

    /// Message held until finish when the requested size was not even.
    pub fn crop_warning(&self) -> Option<String> {
        self.was_cropped().then(|| {
            format!(
                "output dimensions cropped to be multiples of 2: [{}, {}]",
                self.effective.width, self.effective.height
            )
        })
    }
}

/// Validate a raw start payload against the recorder configuration.
///
/// Nothing is created or spawned here. With `overwrite` off, the output path is checked for an
/// existing artifact.
pub fn normalize(raw: &StartRequest, cfg: &RecorderConfig) -> FramecastResult<SessionDescriptor> {
    let format: OutputFormat = raw.format.parse()?;
    validate_output_name(&raw.output_name)?;

    let width = positive_dimension("width", raw.width)?;
    let height = positive_dimension("height", raw.height)?;
    if !raw.frame_rate.is_finite() || raw.frame_rate <= 0.0 {
        return Err(FramecastError::validation(format!(
            "frameRate must be positive, got {}",
            raw.frame_rate
        )));
    }
    if cfg.sequence_padding == 0 {
        return Err(FramecastError::validation(
            "sequencePadding must be positive",
        ));
    }

    let requested = Dimensions::new(width, height);
    let effective = requested.even_floor();
    if effective.width == 0 || effective.height == 0 {
        return Err(FramecastError::validation(format!(
            "dimensions {width}x{height} leave nothing after rounding down to even"
        )));
    }

    let (extension, output_path) = match format {
        OutputFormat::Video => {
            let ext = cfg.video_extension.clone();
            let path = cfg.out_dir.join(format!("{}.{}", raw.output_name, ext));
            (ext, path)
        }
        OutputFormat::ImageSequence => (
            cfg.image_extension.clone(),
            cfg.out_dir.join(&raw.output_name),
        ),
    };

    if !cfg.overwrite && output_path.exists() {
        return Err(FramecastError::validation(format!(
            "output '{}' already exists",
            output_path.display()
        )));
    }

    Ok(SessionDescriptor {
        output_name: raw.output_name.clone(),
        format,
        requested,
        effective,
        frame_rate: raw.frame_rate,
        expected_frame_count: raw.expected_frame_count.filter(|&n| n > 0),
        sequence_padding: cfg.sequence_padding,
        extension,
        output_path,
    })
}

fn positive_dimension(axis: &str, value: i64) -> FramecastResult<u32> {
    if value <= 0 {
        return Err(FramecastError::validation(format!(
            "{axis} must be positive, got {value}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| FramecastError::validation(format!("{axis} is too large: {value}")))
}

fn validate_output_name(name: &str) -> FramecastResult<()> {
    if name.trim().is_empty() {
        return Err(FramecastError::validation("outputName must not be empty"));
    }
    let path = Path::new(name);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(FramecastError::validation(format!(
            "outputName '{name}' must be a relative path inside the output directory"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/params.rs"]
mod tests;
