//! Minimal SSE consumer for assertions against `/sse` and GET `/mcp`.

use std::pin::Pin;

use futures::{Stream, StreamExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

pub struct EventStream {
    inner: Pin<Box<dyn Stream<Item = reqwest::Result<bytes::Bytes>> + Send>>,
    buf: String,
}

impl EventStream {
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            inner: Box::pin(response.bytes_stream()),
            buf: String::new(),
        }
    }

    /// Next real event; keep-alive comment blocks are skipped. `None` when
    /// the connection closed.
    pub async fn next_event(&mut self) -> Option<SseEvent> {
        loop {
            while let Some(end) = self.buf.find("\n\n") {
                let block: String = self.buf.drain(..end + 2).collect();
                if let Some(event) = parse_block(&block) {
                    return Some(event);
                }
            }
            let chunk = self.inner.next().await?.ok()?;
            self.buf.push_str(&String::from_utf8_lossy(&chunk));
        }
    }
}

fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event = "message".to_string();
    let mut data: Vec<String> = Vec::new();
    for line in block.lines() {
        if line.starts_with(':') {
            continue;
        }
        if let Some(v) = line.strip_prefix("event:") {
            event = v.trim().to_string();
        } else if let Some(v) = line.strip_prefix("data:") {
            data.push(v.strip_prefix(' ').unwrap_or(v).to_string());
        }
    }
    if data.is_empty() {
        return None;
    }
    Some(SseEvent {
        event,
        data: data.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_events() {
        let event = parse_block("event: endpoint\ndata: /messages?sessionId=abc\n\n").unwrap();
        assert_eq!(event.event, "endpoint");
        assert_eq!(event.data, "/messages?sessionId=abc");
    }

    #[test]
    fn defaults_event_name_to_message() {
        let event = parse_block("data: {\"ok\":true}\n\n").unwrap();
        assert_eq!(event.event, "message");
    }

    #[test]
    fn skips_keepalive_comment_blocks() {
        assert!(parse_block(": keep-alive\n\n").is_none());
    }
}
