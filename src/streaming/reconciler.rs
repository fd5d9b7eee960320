use crate::streaming::decoder::Frame;

/// Lifecycle of one streamed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Accumulating,
    Finalized,
    Aborted,
}

/// Reconciles streamed fragments into a single answer and converts exactly
/// one terminal event into a finalized text.
///
/// One instance per in-flight submission; never shared across requests.
/// Three finalization paths exist (`done` flag, raw terminator, stream
/// exhaustion via [`finish`](Self::finish)); all transition into the same
/// terminal phase, and frames arriving after it are ignored. The caller's
/// commit boundary carries the idempotency guard for paths firing back to
/// back.
#[derive(Debug)]
pub struct AnswerReconciler {
    accumulated: String,
    phase: Phase,
}

impl AnswerReconciler {
    pub fn new() -> Self {
        Self {
            accumulated: String::new(),
            phase: Phase::Accumulating,
        }
    }

    /// The answer accumulated so far; drives the streaming indicator.
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase != Phase::Accumulating
    }

    /// Process one frame. Returns the finalized text when this frame
    /// completed the answer with non-empty trimmed content.
    pub fn push(&mut self, frame: Frame) -> Option<String> {
        if self.is_terminal() {
            return None;
        }
        match frame {
            Frame::Payload { content, done } => {
                if let Some(text) = content.as_deref() {
                    self.reconcile(text);
                }
                if done {
                    // Prefer the final frame's own content when it carries any
                    let last = content.filter(|c| !c.is_empty());
                    return self.finalize(last);
                }
                None
            }
            Frame::RawTerminator => self.finalize(None),
            Frame::Unparseable => None,
        }
    }

    /// Fallback finalization for streams that end without an explicit
    /// terminal event.
    pub fn finish(&mut self) -> Option<String> {
        if self.is_terminal() {
            return None;
        }
        self.finalize(None)
    }

    /// Transport failure: discard the accumulator, commit nothing.
    pub fn abort(&mut self) {
        self.phase = Phase::Aborted;
        self.accumulated.clear();
    }

    /// Apply the reconciliation policy: a chunk at least as long as the
    /// accumulator, or one extending it, is a cumulative snapshot and
    /// replaces; anything else is an incremental delta and appends.
    ///
    /// Known approximation: a genuine delta that happens to be a prefix of
    /// the accumulator (or longer than it) is misread as a snapshot. The
    /// upstream contract does not say which mode it uses, so the mode is
    /// inferred per chunk.
    fn reconcile(&mut self, content: &str) {
        if content.len() >= self.accumulated.len() || content.starts_with(self.accumulated.as_str())
        {
            tracing::debug!(len = content.len(), "Snapshot chunk, replacing");
            self.accumulated = content.to_string();
        } else {
            tracing::debug!(len = content.len(), "Delta chunk, appending");
            self.accumulated.push_str(content);
        }
    }

    fn finalize(&mut self, last_content: Option<String>) -> Option<String> {
        self.phase = Phase::Finalized;
        let text = last_content.unwrap_or_else(|| std::mem::take(&mut self.accumulated));
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl Default for AnswerReconciler {
    fn default() -> Self {
        Self::new()
    }
}
