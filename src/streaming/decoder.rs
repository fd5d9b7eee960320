use bytes::BytesMut;

use crate::models::wire::StreamPayload;

/// Event lines must start with this prefix; everything else on the stream
/// (blank keep-alives, comments) is discarded.
pub const EVENT_PREFIX: &str = "data: ";

/// Sentinel event body signaling explicit end of stream, distinct from the
/// `done` flag inside a payload.
pub const TERMINATOR: &str = "[DONE]";

/// One decoded unit from the event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A structured event body
    Payload {
        content: Option<String>,
        done: bool,
    },
    /// The literal end-of-stream sentinel
    RawTerminator,
    /// Malformed event JSON; recovered, never fatal to the stream
    Unparseable,
}

impl Frame {
    pub fn payload(content: Option<&str>, done: bool) -> Self {
        Frame::Payload {
            content: content.map(str::to_string),
            done,
        }
    }
}

/// Stateful decoder from raw bytes to [`Frame`]s.
///
/// Bytes are buffered until a newline arrives, so lines (and multi-byte
/// UTF-8 sequences inside them) may be split across arbitrary chunk
/// boundaries. After [`TERMINATOR`] the decoder latches and yields
/// nothing further.
#[derive(Debug)]
pub struct SseDecoder {
    buffer: BytesMut,
    terminated: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            terminated: false,
        }
    }

    /// Whether the terminator sentinel has been seen.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Feed a chunk of bytes and extract all complete frames.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        if self.terminated {
            return Vec::new();
        }
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.split_to(pos + 1);
            // Drop the newline and any trailing carriage return
            let mut end = line.len() - 1;
            if end > 0 && line[end - 1] == b'\r' {
                end -= 1;
            }
            if self.decode_line(&line[..end], &mut frames) {
                break;
            }
        }
        frames
    }

    /// Flush a final unterminated line once the underlying stream is
    /// exhausted. Idempotent; safe to call more than once.
    pub fn finish(&mut self) -> Option<Frame> {
        if self.terminated || self.buffer.is_empty() {
            return None;
        }
        let line = self.buffer.split();
        let mut frames = Vec::new();
        self.decode_line(&line[..], &mut frames);
        frames.pop()
    }

    /// Decode one line. Returns true when the terminator was seen and
    /// decoding should stop.
    fn decode_line(&mut self, raw: &[u8], frames: &mut Vec<Frame>) -> bool {
        let line = String::from_utf8_lossy(raw);
        let Some(body) = line.strip_prefix(EVENT_PREFIX) else {
            // Not an event line: keep-alive, comment, or noise
            return false;
        };

        if body == TERMINATOR {
            tracing::debug!("Stream terminator received");
            self.terminated = true;
            self.buffer.clear();
            frames.push(Frame::RawTerminator);
            return true;
        }

        match serde_json::from_str::<StreamPayload>(body) {
            Ok(payload) => frames.push(Frame::Payload {
                content: payload.content,
                done: payload.done,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable event body, skipping");
                frames.push(Frame::Unparseable);
            }
        }
        false
    }

    /// Reset decoder state for reuse across submissions.
    pub fn reset(&mut self) {
        self.buffer.clear();
        if self.buffer.capacity() > 65536 {
            self.buffer = BytesMut::with_capacity(4096);
        }
        self.terminated = false;
    }
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}
