use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FramecastError::validation("x")
            .to_string()
            .contains("invalid parameters:")
    );
    assert!(
        FramecastError::unavailable("x")
            .to_string()
            .contains("encoder unavailable:")
    );
    assert!(
        FramecastError::spawn("x")
            .to_string()
            .contains("spawn failed:")
    );
    assert!(
        FramecastError::write("x")
            .to_string()
            .contains("write failed:")
    );
    assert!(
        FramecastError::protocol("x")
            .to_string()
            .contains("protocol error:")
    );
    assert!(
        FramecastError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FramecastError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_convert_to_serde() {
    let err: FramecastError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, FramecastError::Serde(_)));
}
