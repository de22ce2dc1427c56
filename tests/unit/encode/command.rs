use super::*;
use crate::session::params::{StartRequest, normalize};
use std::path::Path;

fn descriptor(format: &str, width: i64, height: i64, rate: f64) -> SessionDescriptor {
    let raw = StartRequest {
        output_name: "clip".to_string(),
        format: format.to_string(),
        frame_rate: rate,
        expected_frame_count: None,
        width,
        height,
    };
    normalize(&raw, &RecorderConfig::default().with_out_dir("out")).unwrap()
}

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

#[test]
fn video_args_crop_to_effective_size() {
    let cfg = RecorderConfig::default();
    let args = strings(&encoder_args(&descriptor("video", 641, 480, 30.0), &cfg));
    assert_eq!(
        args,
        [
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "image2pipe",
            "-framerate",
            "30",
            "-i",
            "pipe:0",
            "-vf",
            "crop=640:480:0:0",
            "-an",
            "-c:v",
            "libx264",
            "-preset",
            "slow",
            "-crf",
            "18",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
            "out/clip.mp4",
        ]
    );
}

#[test]
fn image_sequence_args_write_numbered_stills() {
    let cfg = RecorderConfig::default();
    let args = strings(&encoder_args(
        &descriptor("image-sequence", 1280, 720, 29.97),
        &cfg,
    ));
    assert!(args.contains(&"29.97".to_string()));
    assert!(args.contains(&"crop=1280:720:0:0".to_string()));
    assert!(!args.contains(&"libx264".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("out/clip/%05d.png"));
}

#[test]
fn no_overwrite_uses_dash_n() {
    let cfg = RecorderConfig {
        overwrite: false,
        ..RecorderConfig::default()
    };
    let args = strings(&encoder_args(&descriptor("video", 640, 480, 24.0), &cfg));
    assert_eq!(args[0], "-n");
}

#[test]
fn args_are_deterministic() {
    let cfg = RecorderConfig::default();
    let d = descriptor("video", 1919, 1079, 60.0);
    assert_eq!(encoder_args(&d, &cfg), encoder_args(&d, &cfg));
}

#[test]
fn display_quotes_whitespace() {
    let args = vec![OsString::from("-i"), OsString::from("my clip.mp4")];
    assert_eq!(
        display_args(Path::new("ffmpeg"), &args),
        "ffmpeg -i 'my clip.mp4'"
    );
}
