use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::{ChatError, Result};
use crate::models::chat::{Conversation, Message, Role, now_millis};

/// Persistence port for the conversation set. One opaque JSON blob,
/// loaded once at startup and replaced on every write.
pub trait Storage: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, data: &str) -> Result<()>;
}

/// File-backed storage under a fixed path.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Storage for FileStorage {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ChatError::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&self, data: &str) -> Result<()> {
        std::fs::write(&self.path, data).map_err(|e| {
            ChatError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    data: std::sync::Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.data.lock().unwrap().clone())
    }

    fn save(&self, data: &str) -> Result<()> {
        *self.data.lock().unwrap() = Some(data.to_string());
        Ok(())
    }
}

/// Owns the conversation set and the active selection. All mutations go
/// through here (single-writer discipline) and each one is persisted
/// before returning.
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active: Option<String>,
    storage: Box<dyn Storage>,
}

impl ConversationStore {
    /// Load the conversation set from storage. A missing or corrupt blob
    /// starts an empty set; the blob carries no version to migrate.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        let conversations = match storage.load() {
            Ok(Some(data)) => match serde_json::from_str::<Vec<Conversation>>(&data) {
                Ok(list) => list,
                Err(e) => {
                    warn!(error = %e, "Corrupt conversation blob, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load conversations, starting empty");
                Vec::new()
            }
        };
        info!(count = conversations.len(), "Loaded conversation set");

        Self {
            conversations,
            active: None,
            storage,
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&Conversation> {
        let id = self.active.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Messages of the active conversation, empty when none is selected.
    pub fn active_messages(&self) -> &[Message] {
        self.active().map(|c| c.messages.as_slice()).unwrap_or(&[])
    }

    /// Append the user's message, lazily creating (and selecting) a
    /// conversation titled after it when none is active.
    pub fn append_user(&mut self, text: &str) -> Result<()> {
        if self.active().is_none() {
            let conv = Conversation::new(text);
            debug!(id = %conv.id, title = %conv.title, "Created conversation");
            self.active = Some(conv.id.clone());
            self.conversations.insert(0, conv);
        }
        self.push_active(Message::user(text))
    }

    /// Commit the finalized assistant answer, at most once.
    ///
    /// The finalization paths (done flag, raw terminator, stream
    /// exhaustion) can fire back to back; when the last message is already
    /// an assistant message with identical trimmed content the append is
    /// skipped. Returns whether a message was appended.
    pub fn commit_assistant(&mut self, text: &str) -> Result<bool> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }
        if let Some(last) = self.active().and_then(|c| c.last_message())
            && last.role == Role::Assistant
            && last.content.trim() == trimmed
        {
            debug!("Duplicate finalization, skipping commit");
            return Ok(false);
        }
        self.push_active(Message::assistant(trimmed))?;
        info!(chars = trimmed.len(), "Committed assistant message");
        Ok(true)
    }

    /// Select an existing conversation. Unknown ids are ignored.
    pub fn select(&mut self, id: &str) {
        if self.conversations.iter().any(|c| c.id == id) {
            self.active = Some(id.to_string());
        } else {
            warn!(id, "Select for unknown conversation ignored");
        }
    }

    /// Deselect; the next submission starts a fresh conversation.
    pub fn start_new(&mut self) {
        self.active = None;
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.conversations.len() == before {
            return Ok(());
        }
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        self.persist()
    }

    fn push_active(&mut self, message: Message) -> Result<()> {
        let id = self
            .active
            .clone()
            .ok_or_else(|| ChatError::Storage("No active conversation".to_string()))?;
        let pos = self
            .conversations
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ChatError::Storage("Active conversation missing".to_string()))?;
        let mut conv = self.conversations.remove(pos);
        conv.push(message);
        conv.updated_at = conv.updated_at.max(now_millis());

        // Keep most recently updated first
        self.conversations.insert(0, conv);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let data = serde_json::to_string(&self.conversations)?;
        self.storage.save(&data)
    }
}
