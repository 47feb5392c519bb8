//! Common imports for typical chat client usage.
pub use crate::{
    ChatAction, ChatClient, ChatConfig, ChatError, ChatMessage, Conversation, DeltaSink,
    MessageId, Role, SendOutcome,
};
