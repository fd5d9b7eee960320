pub mod chat;
pub mod wire;

pub use chat::{Conversation, Message, Role};
pub use wire::{ChatRequest, ErrorBody, StreamPayload, WireMessage};
