use std::fmt;

use chrono::{DateTime, Utc};
use tracing::trace;

/// First assistant message shown in every new conversation.
pub const WELCOME_MESSAGE: &str = "Hello! I'm your AI Agricultural Assistant. I can help you in multiple languages - just type in your preferred language! I can assist with crop diseases, pest control, farming techniques, weather advice, and much more. What would you like to know?\n\nनमस्ते! मैं आपका कृषि सहायक हूं। मैं कई भाषाओं में मदद कर सकता हूं!\n\nవందనములు! నేను మీ వ్యవసాయ సహాయకుడిని. నేను అనేక భాషలలో సహాయం చేయగలను!";

/// Assistant message appended when a reply cannot be streamed.
pub const FALLBACK_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// A canned question offered before the user types anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuickQuestion {
    pub text: &'static str,
    pub category: &'static str,
}

/// Suggested starter questions, in display order.
pub const QUICK_QUESTIONS: [QuickQuestion; 4] = [
    QuickQuestion {
        text: "How to identify pest attacks?",
        category: "Pest Control",
    },
    QuickQuestion {
        text: "Best irrigation practices",
        category: "Water Management",
    },
    QuickQuestion {
        text: "Organic farming methods",
        category: "Sustainable Farming",
    },
    QuickQuestion {
        text: "Crop rotation benefits",
        category: "Best Practices",
    },
];

/// Stable identifier of a message within a conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MessageId(pub uuid::Uuid);

impl MessageId {
    /// Creates a fresh random id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Author of a chat message, serialized the way the chat endpoint expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a message with a fresh id stamped now.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self::with_id(MessageId::new(), role, content)
    }

    /// Creates a message with a caller-chosen id stamped now.
    pub fn with_id(id: MessageId, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// State transitions accepted by [`Conversation::apply`].
#[derive(Clone, Debug, PartialEq)]
pub enum ChatAction {
    /// The user sent a message; a reply is now awaited.
    UserSent(ChatMessage),
    /// An empty assistant message with this id starts receiving deltas.
    AssistantStarted(MessageId),
    /// Append a streamed fragment to the assistant message with `id`.
    AssistantDelta { id: MessageId, text: String },
    /// The reply failed; append the fallback message and stop waiting.
    Failed,
    /// The reply finished; stop waiting.
    Finished,
}

/// Ordered chat history plus the "waiting for a reply" flag.
///
/// The store is owned by the caller and passed into
/// [`ChatClient::send`](crate::ChatClient::send), so it can be inspected or
/// rendered without any UI framework.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    loading: bool,
}

impl Conversation {
    /// Creates a conversation opened by [`WELCOME_MESSAGE`].
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(WELCOME_MESSAGE)],
            loading: false,
        }
    }

    /// Creates a conversation with no messages at all.
    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            loading: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True between a user message and the end of its reply.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn message(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Role and content of every message, in order, as sent to the endpoint.
    pub fn history(&self) -> impl Iterator<Item = (Role, &str)> + '_ {
        self.messages.iter().map(|m| (m.role, m.content.as_str()))
    }

    /// Applies one state transition.
    ///
    /// Deltas for an unknown id are ignored.
    pub fn apply(&mut self, action: ChatAction) {
        match action {
            ChatAction::UserSent(message) => {
                self.messages.push(message);
                self.loading = true;
            }
            ChatAction::AssistantStarted(id) => {
                self.messages
                    .push(ChatMessage::with_id(id, Role::Assistant, String::new()));
            }
            ChatAction::AssistantDelta { id, text } => {
                match self.messages.iter_mut().rev().find(|m| m.id == id) {
                    Some(message) => message.content.push_str(&text),
                    None => trace!(%id, "delta for unknown message ignored"),
                }
            }
            ChatAction::Failed => {
                self.messages.push(ChatMessage::assistant(FALLBACK_MESSAGE));
                self.loading = false;
            }
            ChatAction::Finished => {
                self.loading = false;
            }
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
