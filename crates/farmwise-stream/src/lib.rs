//! Incremental decoder for streamed chat completion responses.
//!
//! The upstream chat endpoint answers with a body of newline-delimited
//! records. Each record is a comment (`:`), a blank line, or a `data: ` line
//! carrying either the `[DONE]` sentinel or a JSON chunk shaped like
//! `{ "choices": [ { "delta": { "content": "..." } } ] }`.
//!
//! [`ChatStreamDecoder`] turns raw chunks of that body into ordered
//! [`DecodedEvent`]s regardless of where the transport split the bytes, and
//! [`decode_stream`] wraps it around any byte stream.
//!
//! ```
//! use farmwise_stream::{ChatStreamDecoder, DecodedEvent};
//!
//! let mut decoder = ChatStreamDecoder::new();
//! let mut events = decoder.push_chunk(b"data: {\"choices\":[{\"delta\"");
//! assert!(events.is_empty());
//! events.extend(decoder.push_chunk(b":{\"content\":\"hi\"}}]}\ndata: [DONE]\n"));
//! assert_eq!(
//!     events,
//!     vec![DecodedEvent::Delta("hi".into()), DecodedEvent::Done]
//! );
//! ```

/// Line-buffered record decoder and its state machine.
pub mod decoder;
/// Error types for record parsing and stream decoding.
pub mod errors;
/// Payload parsing for a single `data: ` record.
pub mod record;
/// Adapter from a byte stream to a stream of decoded events.
pub mod stream;

pub use decoder::{ChatStreamDecoder, DecodedEvent, DecoderState};
pub use errors::{RecordError, StreamError};
pub use record::{DATA_PREFIX, DONE_SENTINEL, parse_delta_content};
pub use stream::decode_stream;
