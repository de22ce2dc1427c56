use crate::config::RecorderConfig;
use crate::session::params::{OutputFormat, SessionDescriptor};
use std::ffi::OsString;
use std::process::{Command, Stdio};

/// Encoder arguments for one session.
///
/// Input: self-delimited still images on stdin at the session frame rate. A crop to the effective
/// (even) size anchored at the origin runs before the output stage.
pub fn encoder_args(desc: &SessionDescriptor, cfg: &RecorderConfig) -> Vec<OsString> {
    let effective = desc.effective();
    let mut args: Vec<OsString> = Vec::new();
    let overwrite = if cfg.overwrite { "-y" } else { "-n" };
    push_all(&mut args, [overwrite, "-hide_banner", "-loglevel", "error"]);

    push_all(&mut args, ["-f", "image2pipe", "-framerate"]);
    args.push(format_rate(desc.frame_rate()).into());
    push_all(&mut args, ["-i", "pipe:0", "-vf"]);
    args.push(format!("crop={}:{}:0:0", effective.width, effective.height).into());

    match desc.format() {
        OutputFormat::Video => {
            // H.264 + yuv420p with the moov atom up front for broad playback compatibility.
            push_all(&mut args, ["-an", "-c:v", "libx264", "-preset"]);
            args.push(cfg.preset.clone().into());
            args.push("-crf".into());
            args.push(cfg.crf.to_string().into());
            push_all(&mut args, ["-pix_fmt", "yuv420p", "-movflags", "+faststart"]);
            args.push(desc.output_path().as_os_str().to_owned());
        }
        OutputFormat::ImageSequence => {
            push_all(&mut args, ["-start_number", "0"]);
            if let Some(pattern) = desc.frame_pattern() {
                args.push(pattern.into_os_string());
            }
        }
    }
    args
}

fn push_all<const N: usize>(args: &mut Vec<OsString>, items: [&str; N]) {
    args.extend(items.into_iter().map(OsString::from));
}

/// Ready-to-spawn encoder command with stdin/stderr piped.
pub fn encoder_command(desc: &SessionDescriptor, cfg: &RecorderConfig) -> Command {
    let mut cmd = Command::new(&cfg.ffmpeg_path);
    cmd.args(encoder_args(desc, cfg))
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    cmd
}

/// Render an argument vector for logs and `framecast plan`.
pub fn display_args(program: &std::path::Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|a| {
            let s = a.to_string_lossy();
            if s.is_empty() || s.contains(char::is_whitespace) {
                format!("'{s}'")
            } else {
                s.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_rate(rate: f64) -> String {
    // `Display` for f64 already drops a trailing `.0`.
    format!("{rate}")
}

#[cfg(test)]
#[path = "../../tests/unit/encode/command.rs"]
mod tests;
