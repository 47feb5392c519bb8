use std::pin::Pin;

use futures::StreamExt as _;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::ChatConfig;
use crate::conversation::{Conversation, Role};
use crate::errors::ChatError;

/// Raw response body chunks as delivered by a transport.
pub type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, ChatError>> + Send + 'static>>;

/// One history entry as sent to the chat endpoint.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

/// Request body of the chat endpoint: the whole conversation so far.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
}

impl ChatRequest {
    /// Snapshots every message of `conversation`, in order.
    pub fn from_conversation(conversation: &Conversation) -> Self {
        Self {
            messages: conversation
                .history()
                .map(|(role, content)| WireMessage {
                    role,
                    content: content.to_string(),
                })
                .collect(),
        }
    }
}

/// Opens the streamed reply for a chat request.
///
/// Implementations report HTTP-level failures (bad status, no body) as
/// errors from `open`; failures while reading the body come through the
/// returned stream.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream, ChatError>;
}

/// [`ChatTransport`] that POSTs JSON to the configured endpoint.
pub struct HttpChatTransport {
    client: reqwest::Client,
    config: ChatConfig,
}

impl HttpChatTransport {
    /// Creates a transport from explicit configuration.
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpChatTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream, ChatError> {
        debug!(
            endpoint = %self.config.endpoint,
            messages = request.messages.len(),
            "opening chat stream"
        );
        let mut http_req = self.client.post(&self.config.endpoint).json(request);
        if let Some(key) = self.config.api_key.as_deref() {
            http_req = http_req.bearer_auth(key);
        }

        let response = http_req
            .send()
            .await
            .map_err(|e| ChatError::transport(format!("chat request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(ChatError::MissingBody);
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ChatError::transport(format!("chat stream read failed: {e}"))));
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ChatAction, ChatMessage};
    use futures::TryStreamExt as _;
    use httpmock::prelude::*;

    #[test]
    fn request_carries_full_history_with_roles() {
        let mut conversation = Conversation::new();
        conversation.apply(ChatAction::UserSent(ChatMessage::user("When to sow wheat?")));
        let request = ChatRequest::from_conversation(&conversation);
        let value = serde_json::to_value(&request).expect("serialize");
        let messages = value["messages"].as_array().expect("messages array");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "assistant");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "When to sow wheat?");
        assert!(messages[1].get("id").is_none());
    }

    #[test]
    fn new_rejects_invalid_config() {
        assert!(matches!(
            HttpChatTransport::new(ChatConfig::new("not a url")),
            Err(ChatError::Config(_))
        ));
    }

    #[tokio::test]
    async fn open_streams_body_and_sends_bearer_key() {
        let server = MockServer::start_async().await;
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\ndata: [DONE]\n\n";
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/functions/v1/ai-chat")
                    .header("authorization", "Bearer test-key")
                    .body_contains("\"role\":\"user\"");
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body(body);
            })
            .await;

        let transport = HttpChatTransport::new(
            ChatConfig::from_base_url(&server.base_url()).api_key("test-key"),
        )
        .expect("transport");
        let request = ChatRequest {
            messages: vec![WireMessage {
                role: Role::User,
                content: "hello".into(),
            }],
        };
        let chunks: Vec<bytes::Bytes> = transport
            .open(&request)
            .await
            .expect("open")
            .try_collect()
            .await
            .expect("read body");
        let received: Vec<u8> = chunks.concat();
        assert_eq!(received, body.as_bytes());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn open_maps_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/functions/v1/ai-chat");
                then.status(500).body("gateway exploded");
            })
            .await;

        let transport =
            HttpChatTransport::new(ChatConfig::from_base_url(&server.base_url())).expect("transport");
        let err = match transport.open(&ChatRequest::default()).await {
            Ok(_) => panic!("500 should fail"),
            Err(err) => err,
        };
        assert_eq!(
            err,
            ChatError::Status {
                status: 500,
                body: "gateway exploded".into()
            }
        );
    }

    #[tokio::test]
    async fn open_maps_no_content_to_missing_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/functions/v1/ai-chat");
                then.status(204);
            })
            .await;

        let transport =
            HttpChatTransport::new(ChatConfig::from_base_url(&server.base_url())).expect("transport");
        let err = match transport.open(&ChatRequest::default()).await {
            Ok(_) => panic!("204 should fail"),
            Err(err) => err,
        };
        assert_eq!(err, ChatError::MissingBody);
    }

    #[tokio::test]
    async fn open_maps_connection_failure_to_transport_error() {
        let transport = HttpChatTransport::new(ChatConfig::new("http://127.0.0.1:9/chat"))
            .expect("transport");
        let err = match transport.open(&ChatRequest::default()).await {
            Ok(_) => panic!("closed port should fail"),
            Err(err) => err,
        };
        assert!(matches!(err, ChatError::Transport(_)));
    }
}
