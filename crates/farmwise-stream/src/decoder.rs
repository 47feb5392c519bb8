use std::ops::ControlFlow;

use tracing::{debug, trace, warn};

use crate::errors::RecordError;
use crate::record::{DATA_PREFIX, DONE_SENTINEL, parse_delta_content};

/// Output of the decoder for one resolved record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedEvent {
    /// Next non-empty fragment of assistant text.
    Delta(String),
    /// The `[DONE]` sentinel was seen; nothing follows.
    Done,
}

/// Lifecycle of a [`ChatStreamDecoder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecoderState {
    /// No bytes received yet.
    #[default]
    Idle,
    /// At least one chunk received and no terminal condition reached.
    Streaming,
    /// Sentinel seen or the byte stream closed normally.
    Completed,
    /// The byte stream failed.
    Errored,
}

impl DecoderState {
    /// Completed and Errored accept no further chunks.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Errored)
    }
}

/// Incremental decoder for newline-delimited `data: ` records.
///
/// Bytes are appended to an internal buffer and consumed from a cursor one
/// complete line at a time, so a line is never processed twice and chunk
/// boundaries may fall anywhere, including inside a UTF-8 sequence. Lines
/// are only resolved once their terminating `\n` has arrived.
///
/// A `data: ` payload that stops short of a complete JSON value is held as a
/// pending record. Following lines are appended to it (joined by `\n`) until
/// it parses, or dropped if a new record, comment or blank line arrives
/// first.
#[derive(Debug, Default)]
pub struct ChatStreamDecoder {
    buf: Vec<u8>,
    cursor: usize,
    pending: Option<String>,
    state: DecoderState,
}

impl ChatStreamDecoder {
    /// Creates an idle decoder with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Bytes received but not yet resolved into a complete line.
    pub fn buffered_len(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// Returns true while a data record is waiting for its continuation.
    pub fn has_pending_record(&self) -> bool {
        self.pending.is_some()
    }

    /// Feeds one chunk and returns every event it completes, in order.
    ///
    /// Empty chunks and chunks arriving after a terminal state are no-ops.
    /// Processing stops at `[DONE]`; bytes after it are discarded.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<DecodedEvent> {
        let mut events = Vec::new();
        if chunk.is_empty() || self.state.is_terminal() {
            return events;
        }
        self.state = DecoderState::Streaming;
        self.buf.extend_from_slice(chunk);

        while let Some(line) = self.next_line() {
            if self.handle_line(&line, &mut events).is_break() {
                break;
            }
        }
        self.compact();
        events
    }

    /// Marks a normal close of the byte stream.
    ///
    /// Unterminated trailing bytes and any pending record are discarded, not
    /// flushed.
    pub fn finish(&mut self) -> DecoderState {
        if self.state.is_terminal() {
            return self.state;
        }
        let residue = self.buffered_len();
        if residue > 0 || self.pending.is_some() {
            debug!(
                residue_bytes = residue,
                pending_record = self.pending.is_some(),
                "discarding unterminated data at end of stream"
            );
        }
        self.release();
        self.state = DecoderState::Completed;
        self.state
    }

    /// Marks a transport failure; the decoder accepts nothing afterwards.
    pub fn fail(&mut self) -> DecoderState {
        if !self.state.is_terminal() {
            self.release();
            self.state = DecoderState::Errored;
        }
        self.state
    }

    fn next_line(&mut self) -> Option<String> {
        let rest = &self.buf[self.cursor..];
        let idx = rest.iter().position(|&b| b == b'\n')?;
        let line = match &rest[..idx] {
            [head @ .., b'\r'] => head,
            line => line,
        };
        let text = String::from_utf8_lossy(line).into_owned();
        self.cursor += idx + 1;
        Some(text)
    }

    fn handle_line(&mut self, line: &str, events: &mut Vec<DecodedEvent>) -> ControlFlow<()> {
        if let Some(pending) = self.pending.take() {
            if !starts_record(line) {
                return self.resolve_payload(format!("{pending}\n{line}"), events);
            }
            warn!(
                pending_bytes = pending.len(),
                "dropping incomplete data record superseded by a new line"
            );
        }

        if line.trim().is_empty() || line.starts_with(':') {
            return ControlFlow::Continue(());
        }
        let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
            trace!(line, "skipping non-data line");
            return ControlFlow::Continue(());
        };

        let payload = rest.trim();
        if payload == DONE_SENTINEL {
            debug!("received stream sentinel");
            self.release();
            self.state = DecoderState::Completed;
            events.push(DecodedEvent::Done);
            return ControlFlow::Break(());
        }
        if payload.is_empty() {
            return ControlFlow::Continue(());
        }
        self.resolve_payload(payload.to_string(), events)
    }

    fn resolve_payload(
        &mut self,
        payload: String,
        events: &mut Vec<DecodedEvent>,
    ) -> ControlFlow<()> {
        match parse_delta_content(&payload) {
            Ok(Some(text)) => events.push(DecodedEvent::Delta(text)),
            Ok(None) => {}
            Err(RecordError::Incomplete(_)) => {
                debug!(
                    pending_bytes = payload.len(),
                    "deferring incomplete data record"
                );
                self.pending = Some(payload);
            }
            Err(err @ RecordError::Malformed(_)) => {
                warn!(error = %err, "skipping malformed data record");
            }
        }
        ControlFlow::Continue(())
    }

    fn compact(&mut self) {
        if self.cursor > 0 {
            self.buf.drain(..self.cursor);
            self.cursor = 0;
        }
    }

    fn release(&mut self) {
        self.buf = Vec::new();
        self.cursor = 0;
        self.pending = None;
    }
}

/// Lines that begin a new record, or separate records, end a pending one.
fn starts_record(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with(':') || line.starts_with(DATA_PREFIX)
}
