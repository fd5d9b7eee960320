use std::collections::VecDeque;

use futures::StreamExt;

use crate::backend::ByteStream;
use crate::error::Result;
use crate::streaming::decoder::{Frame, SseDecoder};

/// Lazy frame sequence over a byte stream.
///
/// Yields `Ok(Some(frame))` per decoded frame and `Ok(None)` once the
/// sequence ends, either after the raw terminator or after the underlying
/// stream is exhausted and the final partial line has been flushed. A
/// chunk-level transport error ends the sequence with `Err`; no further
/// reads are attempted.
pub struct FrameReader {
    stream: ByteStream,
    decoder: SseDecoder,
    pending: VecDeque<Frame>,
    exhausted: bool,
}

impl FrameReader {
    pub fn new(stream: ByteStream) -> Self {
        Self {
            stream,
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            exhausted: false,
        }
    }

    pub async fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Ok(Some(frame));
            }
            if self.exhausted || self.decoder.is_terminated() {
                return Ok(None);
            }

            match self.stream.next().await {
                Some(Ok(chunk)) => {
                    self.pending.extend(self.decoder.feed(&chunk));
                }
                Some(Err(e)) => {
                    self.exhausted = true;
                    return Err(e);
                }
                None => {
                    self.exhausted = true;
                    if let Some(frame) = self.decoder.finish() {
                        self.pending.push_back(frame);
                    }
                }
            }
        }
    }
}
