use super::*;
use crate::config::RecorderConfig;
use crate::encode::sink::InMemoryBackend;
use std::collections::VecDeque;

#[derive(Default)]
struct ScriptedChannel {
    inbound: VecDeque<RawEvent>,
    sent: Vec<(String, Value)>,
}

impl ScriptedChannel {
    fn with(events: Vec<(&str, Value)>) -> Self {
        Self {
            inbound: events
                .into_iter()
                .map(|(event, data)| RawEvent {
                    event: event.to_string(),
                    data,
                })
                .collect(),
            sent: Vec::new(),
        }
    }

    fn names(&self) -> Vec<&str> {
        self.sent.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl EventChannel for ScriptedChannel {
    fn recv(&mut self) -> FramecastResult<Option<RawEvent>> {
        Ok(self.inbound.pop_front())
    }

    fn send(&mut self, name: &str, data: Value) -> FramecastResult<()> {
        self.sent.push((name.to_string(), data));
        Ok(())
    }
}

fn start_payload() -> Value {
    serde_json::json!({
        "outputName": "clip",
        "format": "video",
        "frameRate": 30,
        "width": 640,
        "height": 480
    })
}

fn frame_payload() -> Value {
    serde_json::json!({ "imageData": "data:image/png;base64,UE5H" })
}

#[test]
fn run_serves_until_close_and_finalizes() {
    let backend = InMemoryBackend::new();
    let channel = ScriptedChannel::with(vec![
        ("start", start_payload()),
        ("frame", frame_payload()),
        ("frame", frame_payload()),
    ]);
    let mut router = EventRouter::new(
        SessionController::new(RecorderConfig::default(), backend.clone()),
        channel,
    );

    let reports = router.run().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(router.controller().phase(), Phase::Idle);
    assert_eq!(
        router.channel().names(),
        [
            "log",
            "request-next-frame",
            "log",
            "request-next-frame",
            "log",
            "log",
        ]
    );
    assert_eq!(backend.sessions()[0].frames.len(), 2);
    assert!(backend.sessions()[0].ended);
}

#[test]
fn probe_failure_is_broadcast_before_any_event() {
    let channel = ScriptedChannel::with(vec![("start", start_payload())]);
    let mut router = EventRouter::new(
        SessionController::new(
            RecorderConfig::default(),
            InMemoryBackend::unavailable("ffmpeg: not found"),
        ),
        channel,
    );
    router.run().unwrap();
    assert_eq!(router.channel().names(), ["warning", "warning"]);
}

#[test]
fn malformed_start_becomes_warning() {
    let mut router = EventRouter::new(
        SessionController::new(RecorderConfig::default(), InMemoryBackend::new()),
        ScriptedChannel::default(),
    );
    let outcome = router
        .dispatch(RawEvent {
            event: "start".to_string(),
            data: serde_json::json!({ "outputName": "clip" }),
        })
        .unwrap();
    assert!(matches!(outcome, Some(Outcome::Rejected(_))));
    assert_eq!(router.channel().names(), ["warning"]);
    assert_eq!(router.controller().phase(), Phase::Idle);
}

#[test]
fn unknown_and_malformed_events_are_dropped() {
    let mut router = EventRouter::new(
        SessionController::new(RecorderConfig::default(), InMemoryBackend::new()),
        ScriptedChannel::default(),
    );
    let unknown = router
        .dispatch(RawEvent {
            event: "hello".to_string(),
            data: Value::Null,
        })
        .unwrap();
    assert!(unknown.is_none());

    let malformed = router
        .dispatch(RawEvent {
            event: "frame".to_string(),
            data: serde_json::json!({ "nope": 1 }),
        })
        .unwrap();
    assert!(malformed.is_none());
    assert!(router.channel().sent.is_empty());
}

#[test]
fn malformed_start_while_streaming_is_silent() {
    let backend = InMemoryBackend::new();
    let mut router = EventRouter::new(
        SessionController::new(RecorderConfig::default(), backend.clone()),
        ScriptedChannel::default(),
    );
    router
        .dispatch(RawEvent {
            event: "start".to_string(),
            data: start_payload(),
        })
        .unwrap();
    let sent_before = router.channel().sent.len();

    let outcome = router
        .dispatch(RawEvent {
            event: "start".to_string(),
            data: serde_json::json!({ "outputName": "x" }),
        })
        .unwrap();
    assert!(matches!(
        outcome,
        Some(Outcome::Rejected(FramecastError::SessionAlreadyActive))
    ));
    assert_eq!(router.channel().sent.len(), sent_before);
    assert_eq!(router.controller().phase(), Phase::Streaming);
    assert_eq!(backend.sessions().len(), 1);
}
