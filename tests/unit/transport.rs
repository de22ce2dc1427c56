use super::*;
use std::io::Cursor;

#[test]
fn reads_events_and_skips_noise() {
    let input = concat!(
        "{\"event\":\"start\",\"data\":{\"width\":2}}\n",
        "\n",
        "not json\n",
        "{\"event\":\"finish\"}\n",
    );
    let mut ch = JsonLinesChannel::new(Cursor::new(input), Vec::new());

    let first = ch.recv().unwrap().unwrap();
    assert_eq!(first.event, "start");
    assert_eq!(first.data, serde_json::json!({ "width": 2 }));

    let second = ch.recv().unwrap().unwrap();
    assert_eq!(second.event, "finish");
    assert_eq!(second.data, Value::Null);

    assert!(ch.recv().unwrap().is_none());
}

#[test]
fn writes_one_line_per_event() {
    let mut ch = JsonLinesChannel::new(Cursor::new(""), Vec::new());
    ch.send("log", serde_json::json!({ "message": "streaming started" }))
        .unwrap();
    ch.send("request-next-frame", serde_json::json!({})).unwrap();

    let out = String::from_utf8(ch.into_writer()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        [
            r#"{"event":"log","data":{"message":"streaming started"}}"#,
            r#"{"event":"request-next-frame","data":{}}"#,
        ]
    );
}
