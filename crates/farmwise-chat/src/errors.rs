use farmwise_stream::StreamError;

/// Errors raised while configuring the client or streaming a reply.
///
/// [`ChatClient::send`](crate::ChatClient::send) never returns these to the
/// caller directly; they are logged and turned into the fallback chat
/// message, and handed back inside
/// [`SendOutcome::Failed`](crate::SendOutcome::Failed).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// Invalid or missing client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// The chat endpoint answered with a non-success status.
    #[error("chat endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// The chat endpoint answered without a response body.
    #[error("chat endpoint returned no response body")]
    MissingBody,
    /// The request could not be sent or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),
    /// The response body failed while it was being streamed.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl ChatError {
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Returns true when the failure happened before any reply byte was read.
    pub fn is_before_stream(&self) -> bool {
        !matches!(self, Self::Stream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_code_and_body() {
        let err = ChatError::Status {
            status: 500,
            body: "upstream down".into(),
        };
        let text = err.to_string();
        assert!(text.contains("500"));
        assert!(text.contains("upstream down"));
        assert!(err.is_before_stream());
    }

    #[test]
    fn stream_errors_convert_transparently() {
        let err: ChatError = StreamError::transport("reset").into();
        assert_eq!(err.to_string(), "stream transport failed: reset");
        assert!(!err.is_before_stream());
    }
}
