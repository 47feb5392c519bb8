use std::collections::VecDeque;
use std::fmt::Display;

use futures::StreamExt as _;
use futures::{Stream, stream};
use tracing::debug;

use crate::decoder::{ChatStreamDecoder, DecodedEvent};
use crate::errors::StreamError;

/// Decodes a response body stream into ordered [`DecodedEvent`]s.
///
/// The returned stream yields every delta in arrival order followed by at
/// most one [`DecodedEvent::Done`]. It stops pulling from `bytes` as soon as
/// the sentinel is decoded. A read error is yielded once as
/// [`StreamError::Transport`] and ends the stream. A body that closes without
/// the sentinel simply ends; its unterminated tail is dropped.
pub fn decode_stream<S, B, E>(bytes: S) -> impl Stream<Item = Result<DecodedEvent, StreamError>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    struct State<S> {
        bytes: S,
        decoder: ChatStreamDecoder,
        pending: VecDeque<DecodedEvent>,
        done: bool,
    }

    stream::try_unfold(
        State {
            bytes,
            decoder: ChatStreamDecoder::new(),
            pending: VecDeque::new(),
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Ok(Some((event, state)));
                }
                if state.done {
                    return Ok(None);
                }

                match state.bytes.next().await {
                    Some(Ok(chunk)) => {
                        state.pending.extend(state.decoder.push_chunk(chunk.as_ref()));
                        state.done = state.decoder.state().is_terminal();
                    }
                    Some(Err(e)) => {
                        state.decoder.fail();
                        return Err(StreamError::transport(e.to_string()));
                    }
                    None => {
                        debug!("response body closed without stream sentinel");
                        state.decoder.finish();
                        state.done = true;
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::TryStreamExt as _;

    fn chunks(parts: &[&'static str]) -> Vec<Result<Bytes, String>> {
        parts.iter().map(|p| Ok(Bytes::from_static(p.as_bytes()))).collect()
    }

    #[tokio::test]
    async fn yields_deltas_then_done() {
        let body = chunks(&[
            ": connected\n\ndata: {\"choices\":[{\"del",
            "ta\":{\"content\":\"Irrigate \"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"at dawn\"}}]}\n",
            "\ndata: [DONE]\n\n",
        ]);
        let events: Vec<DecodedEvent> = decode_stream(stream::iter(body))
            .try_collect()
            .await
            .expect("decode");
        assert_eq!(
            events,
            vec![
                DecodedEvent::Delta("Irrigate ".into()),
                DecodedEvent::Delta("at dawn".into()),
                DecodedEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn stops_pulling_after_sentinel() {
        let body = vec![
            Ok(Bytes::from_static(b"data: [DONE]\n")),
            Err("should never be read".to_string()),
        ];
        let events: Vec<DecodedEvent> = decode_stream(stream::iter(body))
            .try_collect()
            .await
            .expect("decode");
        assert_eq!(events, vec![DecodedEvent::Done]);
    }

    #[tokio::test]
    async fn close_without_sentinel_ends_without_done() {
        let body = chunks(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}",
        ]);
        let events: Vec<DecodedEvent> = decode_stream(stream::iter(body))
            .try_collect()
            .await
            .expect("decode");
        assert_eq!(events, vec![DecodedEvent::Delta("ok".into())]);
    }

    #[tokio::test]
    async fn read_error_is_terminal() {
        let body = vec![
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"part\"}}]}\n",
            )),
            Err("connection reset".to_string()),
            Ok(Bytes::from_static(b"data: [DONE]\n")),
        ];
        let mut events = Box::pin(decode_stream(stream::iter(body)));
        assert_eq!(
            events.next().await,
            Some(Ok(DecodedEvent::Delta("part".into())))
        );
        let err = events.next().await.expect("error item").expect_err("transport");
        assert_eq!(err.message(), "connection reset");
        assert!(events.next().await.is_none());
    }
}
