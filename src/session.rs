use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::backend::ChatBackend;
use crate::error::{ChatError, Result};
use crate::models::chat::Message;
use crate::models::wire::ChatRequest;
use crate::store::ConversationStore;
use crate::streaming::{AnswerReconciler, FrameReader};

/// Snapshot of observable session state for the UI layer.
///
/// Published through an `ArcSwap` so readers never block the
/// single-threaded submission loop; each mutation swaps in a fresh
/// snapshot.
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    /// Messages of the active conversation, in insertion order
    pub messages: Vec<Message>,
    /// Conversation list as (id, title) pairs, most recently updated first
    pub conversations: Vec<(String, String)>,
    pub active_id: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// The partially accumulated answer while a response streams in
    pub streaming_content: String,
}

/// Shared read handle for the observable session state.
pub type ViewHandle = Arc<ArcSwap<SessionView>>;

/// Submission orchestrator: resolves the target conversation, appends the
/// user message, wires the response body through the frame reader and the
/// answer reconciler, and commits the finalized answer.
///
/// Cooperative single-writer model: at most one submission in flight,
/// guarded by `is_loading`; the conversation set is mutated only here.
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    store: ConversationStore,
    user: String,
    view: ViewHandle,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>, store: ConversationStore, user: String) -> Self {
        let session = Self {
            backend,
            store,
            user,
            view: Arc::new(ArcSwap::from_pointee(SessionView::default())),
        };
        session.publish(false, None, "");
        session
    }

    /// Handle for lock-free reads of the observable state.
    pub fn observe(&self) -> ViewHandle {
        self.view.clone()
    }

    pub fn snapshot(&self) -> Arc<SessionView> {
        self.view.load_full()
    }

    /// Submit user input and drive the streamed response to completion.
    ///
    /// No-op for empty input or while a submission is already in flight.
    /// On success exactly one assistant message is committed; on transport
    /// or HTTP failure the error is surfaced in the view and history is
    /// left with only the user message appended.
    pub async fn submit(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        if self.snapshot().is_loading {
            warn!("Submission already in flight, ignoring input");
            return Ok(());
        }

        self.store.append_user(text)?;
        self.publish(true, None, "");

        let request = ChatRequest::from_history(self.store.active_messages(), self.user.clone());
        info!(backend = self.backend.name(), "Submitting chat request");

        let stream = match self.backend.stream_chat(request).await {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Failed to open response stream");
                self.publish(false, Some(e.to_string()), "");
                return Err(e);
            }
        };

        match self.consume(FrameReader::new(stream)).await {
            Ok(()) => {
                self.publish(false, None, "");
                Ok(())
            }
            Err(e) => {
                self.publish(false, Some(e.to_string()), "");
                Err(e)
            }
        }
    }

    /// Drive frames through the reconciler until a terminal transition.
    async fn consume(&mut self, mut reader: FrameReader) -> Result<()> {
        let mut reconciler = AnswerReconciler::new();

        loop {
            match reader.next_frame().await {
                Ok(Some(frame)) => {
                    if let Some(text) = reconciler.push(frame) {
                        self.store.commit_assistant(&text)?;
                        return Ok(());
                    }
                    if reconciler.is_terminal() {
                        // Finalized with nothing worth committing
                        return Ok(());
                    }
                    self.publish(true, None, reconciler.accumulated());
                }
                Ok(None) => {
                    if let Some(text) = reconciler.finish() {
                        self.store.commit_assistant(&text)?;
                    }
                    return Ok(());
                }
                Err(e) => {
                    reconciler.abort();
                    error!(error = %e, "Transport failure, discarding partial answer");
                    return Err(e);
                }
            }
        }
    }

    pub fn select_conversation(&mut self, id: &str) -> Result<()> {
        if self.snapshot().is_loading {
            return Err(ChatError::Storage(
                "Cannot switch conversations mid-stream".to_string(),
            ));
        }
        self.store.select(id);
        self.publish(false, None, "");
        Ok(())
    }

    pub fn start_new_chat(&mut self) {
        self.store.start_new();
        self.publish(false, None, "");
    }

    pub fn delete_conversation(&mut self, id: &str) -> Result<()> {
        self.store.delete(id)?;
        self.publish(false, None, "");
        Ok(())
    }

    fn publish(&self, is_loading: bool, error: Option<String>, streaming: &str) {
        self.view.store(Arc::new(SessionView {
            messages: self.store.active_messages().to_vec(),
            conversations: self
                .store
                .conversations()
                .iter()
                .map(|c| (c.id.clone(), c.title.clone()))
                .collect(),
            active_id: self.store.active_id().map(str::to_string),
            is_loading,
            error,
            streaming_content: streaming.to_string(),
        }));
    }
}
