use super::*;

#[test]
fn decodes_bytes_after_first_comma() {
    // "PNG" in base64; the header must not be decoded.
    let bytes = decode_image_data("data:image/png;base64,UE5H").unwrap();
    assert_eq!(bytes, b"PNG");
}

#[test]
fn bare_base64_is_accepted() {
    assert_eq!(decode_image_data("UE5H").unwrap(), b"PNG");
}

#[test]
fn invalid_or_empty_frames_are_rejected() {
    assert!(decode_image_data("data:image/png;base64,***").is_err());
    assert!(decode_image_data("data:image/png;base64,").is_err());
}

#[test]
fn parses_known_events() {
    let start = InboundEvent::from_parts(
        START,
        serde_json::json!({
            "outputName": "clip",
            "format": "video",
            "frameRate": 30,
            "width": 641,
            "height": 480
        }),
    )
    .unwrap();
    assert!(matches!(start, Some(InboundEvent::Start(ref s)) if s.width == 641));

    let frame = InboundEvent::from_parts(
        FRAME,
        serde_json::json!({ "imageData": "data:image/png;base64,UE5H" }),
    )
    .unwrap();
    assert!(matches!(frame, Some(InboundEvent::Frame(_))));

    let finish = InboundEvent::from_parts(FINISH, serde_json::json!({})).unwrap();
    assert!(matches!(finish, Some(InboundEvent::Finish)));
}

#[test]
fn unknown_events_are_none() {
    assert!(
        InboundEvent::from_parts("connected", Value::Null)
            .unwrap()
            .is_none()
    );
}

#[test]
fn malformed_start_is_invalid_parameters() {
    let err = InboundEvent::from_parts(START, serde_json::json!({ "width": 10 })).unwrap_err();
    assert!(matches!(err, FramecastError::Validation(_)));
}

#[test]
fn notification_payloads() {
    assert_eq!(
        Notification::Log("hi".into()).payload(),
        serde_json::json!({ "message": "hi" })
    );
    assert_eq!(
        Notification::RequestNextFrame.payload(),
        serde_json::json!({})
    );
    assert_eq!(Notification::RequestNextFrame.name(), "request-next-frame");
}
