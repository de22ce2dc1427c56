use super::*;
use crate::session::params::{StartRequest, normalize};

fn descriptor(cfg: &RecorderConfig, format: &str) -> SessionDescriptor {
    let raw = StartRequest {
        output_name: "clip".to_string(),
        format: format.to_string(),
        frame_rate: 30.0,
        expected_frame_count: None,
        width: 64,
        height: 64,
    };
    normalize(&raw, cfg).unwrap()
}

#[test]
fn ensure_parent_dir_creates_missing_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("a").join("b").join("clip.mp4");
    ensure_parent_dir(&target).unwrap();
    assert!(dir.path().join("a").join("b").is_dir());
    assert!(!target.exists());
}

#[test]
fn ensure_parent_dir_accepts_bare_file_name() {
    ensure_parent_dir(Path::new("clip.mp4")).unwrap();
}

#[test]
fn spawn_with_missing_binary_reports_spawn_failure() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = RecorderConfig::default()
        .with_out_dir(dir.path().join("renders"))
        .with_ffmpeg_path("framecast-definitely-not-an-encoder");
    let backend = FfmpegBackend::new(cfg.clone());

    let err = backend
        .spawn(&descriptor(&cfg, "image-sequence"))
        .err()
        .unwrap();
    assert!(matches!(err, FramecastError::Spawn(_)));
    // Directories are prepared before the launch attempt.
    assert!(dir.path().join("renders").join("clip").is_dir());
}

#[test]
fn probe_with_missing_binary_is_unavailable() {
    let cfg = RecorderConfig::default().with_ffmpeg_path("framecast-definitely-not-an-encoder");
    assert!(FfmpegBackend::new(cfg).probe().is_unavailable());
}
