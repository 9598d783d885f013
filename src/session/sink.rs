//! Transport side of a stream session.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::SinkClosed;

/// Encode one SSE frame: `data: <json>\n\n`.
///
/// Compact JSON never contains a raw newline, so the payload always fits on
/// a single `data:` line.
pub fn encode_event<T: Serialize>(payload: &T) -> Result<Bytes, serde_json::Error> {
    let mut buf = Vec::with_capacity(384);
    buf.extend_from_slice(b"data: ");
    serde_json::to_writer(&mut buf, payload)?;
    buf.extend_from_slice(b"\n\n");
    Ok(Bytes::from(buf))
}

/// Where a session writes its frames.
///
/// `send` returns once the frame has been handed to the transport for
/// immediate delivery; nothing is batched behind it.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Whether frames reach the client as soon as they are sent.
    fn supports_flush(&self) -> bool;

    /// Write and flush one frame.
    async fn send(&self, frame: Bytes) -> Result<(), SinkClosed>;

    /// Resolves when the client has gone away.
    async fn closed(&self);

    fn is_closed(&self) -> bool;
}

/// Sink backed by a bounded channel whose receiver is an HTTP response body.
///
/// Each frame becomes one body chunk, which the server writes and flushes as
/// soon as it is polled. Dropping the body (client disconnect) closes the
/// channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    fn supports_flush(&self) -> bool {
        true
    }

    async fn send(&self, frame: Bytes) -> Result<(), SinkClosed> {
        self.tx.send(frame).await.map_err(|_| SinkClosed)
    }

    async fn closed(&self) {
        self.tx.closed().await
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
