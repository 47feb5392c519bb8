use std::pin::pin;
use std::sync::Arc;

use farmwise_stream::{DecodedEvent, decode_stream};
use futures::StreamExt as _;
use tracing::{debug, info, warn};

use crate::config::ChatConfig;
use crate::conversation::{ChatAction, ChatMessage, Conversation, MessageId};
use crate::errors::ChatError;
use crate::sink::DeltaSink;
use crate::transport::{ChatRequest, ChatTransport, HttpChatTransport};

/// Result of [`ChatClient::send`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The input was blank; nothing was sent or recorded.
    Ignored,
    /// The reply streamed to the end.
    Completed { id: MessageId, content: String },
    /// The reply failed and the fallback message was appended.
    Failed { error: ChatError },
}

/// Sends user messages and streams replies into a [`Conversation`].
#[derive(Clone)]
pub struct ChatClient {
    transport: Arc<dyn ChatTransport>,
}

impl ChatClient {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Creates a client backed by [`HttpChatTransport`].
    pub fn from_config(config: ChatConfig) -> Result<Self, ChatError> {
        Ok(Self::new(Arc::new(HttpChatTransport::new(config)?)))
    }

    /// Sends `text` as the next user message and streams the reply.
    ///
    /// Whitespace-only input is ignored. Otherwise the user message is
    /// appended, the whole history is posted, and each decoded fragment is
    /// applied to `conversation` and forwarded to `sink` in arrival order.
    /// Any failure appends exactly one fallback message and is reported
    /// through the returned outcome; nothing is retried.
    pub async fn send<K>(
        &self,
        conversation: &mut Conversation,
        text: &str,
        sink: &mut K,
    ) -> SendOutcome
    where
        K: DeltaSink + ?Sized,
    {
        if text.trim().is_empty() {
            return SendOutcome::Ignored;
        }

        conversation.apply(ChatAction::UserSent(ChatMessage::user(text)));
        let request = ChatRequest::from_conversation(conversation);

        match self.stream_reply(conversation, &request, sink).await {
            Ok(id) => {
                conversation.apply(ChatAction::Finished);
                let content = conversation
                    .message(id)
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                info!(message_id = %id, chars = content.chars().count(), "chat reply completed");
                SendOutcome::Completed { id, content }
            }
            Err(error) => {
                warn!(
                    error = %error,
                    before_stream = error.is_before_stream(),
                    "chat reply failed"
                );
                conversation.apply(ChatAction::Failed);
                sink.on_failure(&error);
                SendOutcome::Failed { error }
            }
        }
    }

    async fn stream_reply<K>(
        &self,
        conversation: &mut Conversation,
        request: &ChatRequest,
        sink: &mut K,
    ) -> Result<MessageId, ChatError>
    where
        K: DeltaSink + ?Sized,
    {
        let bytes = self.transport.open(request).await?;

        let id = MessageId::new();
        conversation.apply(ChatAction::AssistantStarted(id));
        debug!(message_id = %id, "streaming assistant reply");

        let mut events = pin!(decode_stream(bytes));
        while let Some(event) = events.next().await {
            match event? {
                DecodedEvent::Delta(text) => {
                    conversation.apply(ChatAction::AssistantDelta {
                        id,
                        text: text.clone(),
                    });
                    let content = conversation
                        .message(id)
                        .map(|m| m.content.as_str())
                        .unwrap_or_default();
                    sink.on_delta(id, &text, content);
                }
                DecodedEvent::Done => break,
            }
        }
        Ok(id)
    }
}
