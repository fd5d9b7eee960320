use bytes::Bytes;
use futures::Stream;
use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::models::wire::ChatRequest;

/// Type alias for the streamed response body from a backend
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Type alias for the future returned by stream_chat
pub type StreamFuture = Pin<Box<dyn Future<Output = Result<ByteStream>> + Send>>;

/// Trait for assistant endpoints that stream answer bytes.
///
/// The orchestrator only depends on this seam, so tests drive it with
/// scripted streams instead of a live endpoint.
pub trait ChatBackend: Send + Sync {
    /// Send the conversation history and open the response stream.
    ///
    /// Errors here are fatal to the submission: the connection could not
    /// be opened (`Transport`) or the endpoint rejected the request
    /// (`Http`). Chunk-level errors are reported through the stream items.
    fn stream_chat(&self, request: ChatRequest) -> StreamFuture;

    /// Backend name for logging
    fn name(&self) -> &str;
}
