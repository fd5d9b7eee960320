pub mod decoder;
pub mod reader;
pub mod reconciler;

pub use decoder::{EVENT_PREFIX, Frame, SseDecoder, TERMINATOR};
pub use reader::FrameReader;
pub use reconciler::{AnswerReconciler, Phase};
