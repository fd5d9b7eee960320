use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chatstream::backend::{ByteStream, ChatBackend, StreamFuture};
use chatstream::error::{ChatError, Result};
use chatstream::models::chat::Role;
use chatstream::session::ChatSession;
use chatstream::store::{ConversationStore, MemoryStorage};

#[derive(Clone, Copy)]
enum Item {
    Chunk(&'static str),
    TransportError,
}

/// Backend that replays one scripted response body per submission.
struct ScriptedBackend {
    responses: Mutex<VecDeque<Vec<Item>>>,
}

impl ScriptedBackend {
    fn new(responses: Vec<Vec<Item>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }

    fn single(items: Vec<Item>) -> Arc<Self> {
        Self::new(vec![items])
    }
}

impl ChatBackend for ScriptedBackend {
    fn stream_chat(&self, _request: chatstream::models::wire::ChatRequest) -> StreamFuture {
        let items = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left");

        Box::pin(async move {
            let chunks: Vec<Result<Bytes>> = items
                .into_iter()
                .map(|item| match item {
                    Item::Chunk(s) => Ok(Bytes::from_static(s.as_bytes())),
                    Item::TransportError => {
                        Err(ChatError::Transport("connection reset".to_string()))
                    }
                })
                .collect();
            Ok(Box::pin(futures::stream::iter(chunks)) as ByteStream)
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Backend whose open fails outright.
struct RejectingBackend;

impl ChatBackend for RejectingBackend {
    fn stream_chat(&self, _request: chatstream::models::wire::ChatRequest) -> StreamFuture {
        Box::pin(async {
            Err(ChatError::Http {
                status: 500,
                message: "model overloaded".to_string(),
            })
        })
    }

    fn name(&self) -> &str {
        "rejecting"
    }
}

fn session_with(backend: Arc<dyn ChatBackend>) -> ChatSession {
    let store = ConversationStore::new(Box::new(MemoryStorage::new()));
    ChatSession::new(backend, store, "test-user".to_string())
}

fn assistant_messages(session: &ChatSession) -> Vec<String> {
    session
        .snapshot()
        .messages
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .map(|m| m.content.clone())
        .collect()
}

#[tokio::test]
async fn test_submit_commits_one_message_done_path() {
    let backend = ScriptedBackend::single(vec![
        Item::Chunk("data: {\"content\":\"Hi\"}\n"),
        Item::Chunk("data: {\"content\":\"Hi there\",\"done\":true}\n"),
    ]);
    let mut session = session_with(backend);

    session.submit("Hello").await.unwrap();

    assert_eq!(assistant_messages(&session), vec!["Hi there"]);
    let view = session.snapshot();
    assert_eq!(view.messages.len(), 2);
    assert!(!view.is_loading);
    assert!(view.error.is_none());
    assert!(view.streaming_content.is_empty());
}

#[tokio::test]
async fn test_submit_commits_one_message_terminator_path() {
    let backend = ScriptedBackend::single(vec![
        Item::Chunk("data: {\"content\":\"Partial answer\"}\n"),
        Item::Chunk("data: [DONE]\n"),
    ]);
    let mut session = session_with(backend);

    session.submit("Hello").await.unwrap();
    assert_eq!(assistant_messages(&session), vec!["Partial answer"]);
}

#[tokio::test]
async fn test_submit_commits_one_message_exhaustion_path() {
    let backend = ScriptedBackend::single(vec![Item::Chunk(
        "data: {\"content\":\"Partial answer\"}\n",
    )]);
    let mut session = session_with(backend);

    session.submit("Hello").await.unwrap();
    assert_eq!(assistant_messages(&session), vec!["Partial answer"]);
}

#[tokio::test]
async fn test_done_followed_by_trailing_bytes_commits_once() {
    // Terminal event with payload still buffered behind it
    let backend = ScriptedBackend::single(vec![Item::Chunk(
        "data: {\"content\":\"answer\",\"done\":true}\ndata: {\"content\":\"late\"}\n",
    )]);
    let mut session = session_with(backend);

    session.submit("Hello").await.unwrap();
    assert_eq!(assistant_messages(&session), vec!["answer"]);
}

#[tokio::test]
async fn test_transport_failure_commits_nothing() {
    let backend = ScriptedBackend::single(vec![
        Item::Chunk("data: {\"content\":\"will be\"}\n"),
        Item::Chunk("data: {\"content\":\" discarded\"}\n"),
        Item::TransportError,
    ]);
    let mut session = session_with(backend);

    let result = session.submit("Hello").await;
    assert!(result.is_err());

    let view = session.snapshot();
    assert!(assistant_messages(&session).is_empty());
    // The user message stays; history is otherwise untouched
    assert_eq!(view.messages.len(), 1);
    assert_eq!(view.messages[0].role, Role::User);
    assert!(view.error.as_deref().unwrap().contains("connection reset"));
    assert!(!view.is_loading);
    assert!(view.streaming_content.is_empty());
}

#[tokio::test]
async fn test_http_error_surfaced() {
    let mut session = session_with(Arc::new(RejectingBackend));

    let result = session.submit("Hello").await;
    assert!(result.is_err());

    let view = session.snapshot();
    assert_eq!(view.messages.len(), 1);
    assert!(view.error.as_deref().unwrap().contains("model overloaded"));
    assert!(!view.is_loading);
}

#[tokio::test]
async fn test_empty_input_is_noop() {
    let mut session = session_with(ScriptedBackend::new(vec![]));

    session.submit("   ").await.unwrap();
    session.submit("").await.unwrap();

    let view = session.snapshot();
    assert!(view.messages.is_empty());
    assert!(view.conversations.is_empty());
}

#[tokio::test]
async fn test_whitespace_answer_commits_nothing() {
    let backend = ScriptedBackend::single(vec![
        Item::Chunk("data: {\"content\":\"   \"}\n"),
        Item::Chunk("data: [DONE]\n"),
    ]);
    let mut session = session_with(backend);

    session.submit("Hello").await.unwrap();
    assert!(assistant_messages(&session).is_empty());
    assert!(session.snapshot().error.is_none());
}

#[tokio::test]
async fn test_title_derived_from_first_message() {
    let backend = ScriptedBackend::single(vec![Item::Chunk("data: [DONE]\n")]);
    let mut session = session_with(backend);

    session
        .submit("A question that is definitely longer than thirty characters")
        .await
        .unwrap();

    let view = session.snapshot();
    let (_, title) = &view.conversations[0];
    assert_eq!(title.chars().count(), 30);
    assert!(title.starts_with("A question"));
}

#[tokio::test]
async fn test_conversation_lifecycle() {
    let backend = ScriptedBackend::new(vec![
        vec![Item::Chunk("data: {\"content\":\"one\",\"done\":true}\n")],
        vec![Item::Chunk("data: {\"content\":\"two\",\"done\":true}\n")],
    ]);
    let mut session = session_with(backend);

    session.submit("first chat").await.unwrap();
    let first_id = session.snapshot().active_id.clone().unwrap();

    session.start_new_chat();
    assert!(session.snapshot().active_id.is_none());
    assert!(session.snapshot().messages.is_empty());

    session.submit("second chat").await.unwrap();
    assert_eq!(session.snapshot().conversations.len(), 2);

    session.select_conversation(&first_id).unwrap();
    let view = session.snapshot();
    assert_eq!(view.active_id.as_deref(), Some(first_id.as_str()));
    assert_eq!(view.messages.len(), 2);

    session.delete_conversation(&first_id).unwrap();
    let view = session.snapshot();
    assert_eq!(view.conversations.len(), 1);
    assert!(view.active_id.is_none());
}

#[tokio::test]
async fn test_second_submission_reuses_conversation() {
    let backend = ScriptedBackend::new(vec![
        vec![Item::Chunk("data: {\"content\":\"first\",\"done\":true}\n")],
        vec![Item::Chunk("data: {\"content\":\"second\",\"done\":true}\n")],
    ]);
    let mut session = session_with(backend);

    session.submit("one").await.unwrap();
    session.submit("two").await.unwrap();

    let view = session.snapshot();
    assert_eq!(view.conversations.len(), 1);
    assert_eq!(view.messages.len(), 4);
    assert_eq!(assistant_messages(&session), vec!["first", "second"]);
}
