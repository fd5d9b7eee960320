//! # chatstream
//!
//! Streaming chat client core: consumes a server-sent-event stream of
//! partial or cumulative answer fragments, reconciles them into a single
//! growing answer, and commits exactly one finalized message per
//! submission to a persistent conversation store.
//!
//! ## Overview
//!
//! Two components carry the protocol:
//! - **Transport reader** ([`streaming::SseDecoder`] +
//!   [`streaming::FrameReader`]) — decodes the byte stream into
//!   [`streaming::Frame`]s, tolerating lines and multi-byte characters
//!   split across chunk boundaries; per-event parse failures are
//!   recovered, never fatal.
//! - **Answer reconciler** ([`streaming::AnswerReconciler`]) — applies the
//!   snapshot-vs-delta reconciliation policy and folds the three racing
//!   termination signals (`done` flag, raw terminator, stream exhaustion)
//!   into a single terminal transition.
//!
//! [`session::ChatSession`] orchestrates submissions over a
//! [`backend::ChatBackend`] and publishes observable state for a UI layer
//! through an `ArcSwap` snapshot.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chatstream::config::ClientConfig;
//! use chatstream::client::HttpBackend;
//! use chatstream::store::{ConversationStore, FileStorage};
//! use chatstream::session::ChatSession;
//!
//! # async fn run() -> chatstream::Result<()> {
//! let config = ClientConfig::from_env()?;
//! config.validate()?;
//!
//! let backend = Arc::new(HttpBackend::new(config.endpoint.clone())?);
//! let store = ConversationStore::new(Box::new(FileStorage::new(&config.storage_path)));
//! let mut session = ChatSession::new(backend, store, config.user.clone());
//!
//! session.submit("Hello!").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and handling
//! - [`models`] - Conversation domain types and wire formats
//! - [`streaming`] - SSE frame decoding and answer reconciliation
//! - [`backend`] / [`client`] - Assistant endpoint seam and HTTP impl
//! - [`store`] - Persistent conversation store
//! - [`session`] - Submission orchestrator and observable state

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod store;
pub mod streaming;

pub use config::ClientConfig;
pub use error::{ChatError, Result};
