//! Streaming chat client for the farm-advice assistant.
//!
//! The conversation lives in an explicitly owned [`Conversation`] store that
//! only changes through [`ChatAction`]s. [`ChatClient::send`] appends the
//! user's message, posts the full history to the chat endpoint, and feeds the
//! streamed reply through [`farmwise_stream`] into the store and a
//! [`DeltaSink`].
//!
//! ```no_run
//! use farmwise_chat::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ChatError> {
//! let client = ChatClient::from_config(ChatConfig::from_env()?)?;
//! let mut conversation = Conversation::new();
//!
//! let mut print = |_id: MessageId, delta: &str, _content: &str| print!("{delta}");
//! match client
//!     .send(&mut conversation, "Best irrigation practices", &mut print)
//!     .await
//! {
//!     SendOutcome::Completed { .. } => println!(),
//!     SendOutcome::Failed { error } => eprintln!("chat failed: {error}"),
//!     SendOutcome::Ignored => {}
//! }
//! # Ok(())
//! # }
//! ```

/// Send pipeline from user input to a finished assistant reply.
pub mod client;
/// Chat endpoint configuration.
pub mod config;
/// Conversation store, messages and reducer actions.
pub mod conversation;
/// Error types for the chat client.
pub mod errors;
/// Process-wide tracing setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Receivers of streamed deltas.
pub mod sink;
/// Transport seam and the HTTP implementation.
pub mod transport;

pub use client::{ChatClient, SendOutcome};
pub use config::ChatConfig;
pub use conversation::{
    ChatAction, ChatMessage, Conversation, FALLBACK_MESSAGE, MessageId, QUICK_QUESTIONS,
    QuickQuestion, Role, WELCOME_MESSAGE,
};
pub use errors::ChatError;
pub use sink::{CollectingSink, DeltaSink, NoopSink};
pub use transport::{ByteStream, ChatRequest, ChatTransport, HttpChatTransport, WireMessage};
