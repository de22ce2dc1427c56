use super::*;

#[test]
fn missing_binary_is_unavailable() {
    let cap = probe(
        Path::new("framecast-definitely-not-an-encoder"),
        Duration::from_secs(1),
    );
    match cap {
        Capability::Unavailable { detail } => assert!(detail.contains("failed to launch")),
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[test]
fn default_is_unchecked() {
    let cap = Capability::default();
    assert_eq!(cap, Capability::Unchecked);
    assert!(!cap.is_available());
    assert!(!cap.is_unavailable());
}
