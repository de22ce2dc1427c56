use crate::foundation::error::FramecastResult;
use crate::router::{EventChannel, RawEvent};
use serde_json::Value;
use std::io::{BufRead, Write};

/// Newline-delimited JSON events: one `{"event": ..., "data": ...}` object per line.
///
/// Used over stdin/stdout by `framecast serve`, so a dev-server plugin can run the recorder as a
/// child process and relay its websocket messages line by line.
pub struct JsonLinesChannel<R, W> {
    reader: R,
    writer: W,
    line: String,
}

impl<R: BufRead, W: Write> JsonLinesChannel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> EventChannel for JsonLinesChannel<R, W> {
    fn recv(&mut self) -> FramecastResult<Option<RawEvent>> {
        use anyhow::Context as _;
        loop {
            self.line.clear();
            let n = self
                .reader
                .read_line(&mut self.line)
                .context("failed to read inbound event")?;
            if n == 0 {
                return Ok(None);
            }
            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawEvent>(text) {
                Ok(event) => return Ok(Some(event)),
                Err(e) => tracing::warn!(error = %e, "skipping malformed event line"),
            }
        }
    }

    fn send(&mut self, name: &str, data: Value) -> FramecastResult<()> {
        use anyhow::Context as _;
        let event = RawEvent {
            event: name.to_string(),
            data,
        };
        serde_json::to_writer(&mut self.writer, &event)?;
        self.writer
            .write_all(b"\n")
            .and_then(|()| self.writer.flush())
            .context("failed to write outbound event")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/transport.rs"]
mod tests;
