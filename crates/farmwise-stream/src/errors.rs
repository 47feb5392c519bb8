/// Failure to turn a `data: ` payload into a chat completion chunk.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The payload ends before the JSON value does; more bytes may complete it.
    #[error("incomplete record payload: {0}")]
    Incomplete(#[source] serde_json::Error),
    /// The payload can never become valid JSON.
    #[error("malformed record payload: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl RecordError {
    pub(crate) fn from_json(err: serde_json::Error) -> Self {
        if err.is_eof() {
            Self::Incomplete(err)
        } else {
            Self::Malformed(err)
        }
    }

    /// Returns true when waiting for more bytes could make the payload parse.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete(_))
    }
}

/// Terminal failure of a decoded chat stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// Reading the next chunk from the underlying byte stream failed.
    #[error("stream transport failed: {message}")]
    Transport { message: String },
}

impl StreamError {
    /// Creates a transport failure from any displayable source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message } => message,
        }
    }
}
