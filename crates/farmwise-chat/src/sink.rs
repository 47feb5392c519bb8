use crate::conversation::MessageId;
use crate::errors::ChatError;

/// Receives streamed assistant output as it arrives.
///
/// `on_delta` is called once per fragment, in order, with the fragment and
/// the cumulative content of the message so far. `on_failure` is called at
/// most once per send, after the fallback message has been appended.
pub trait DeltaSink {
    fn on_delta(&mut self, id: MessageId, delta: &str, content: &str);

    fn on_failure(&mut self, _error: &ChatError) {}
}

impl<F> DeltaSink for F
where
    F: FnMut(MessageId, &str, &str),
{
    fn on_delta(&mut self, id: MessageId, delta: &str, content: &str) {
        self(id, delta, content)
    }
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl DeltaSink for NoopSink {
    fn on_delta(&mut self, _id: MessageId, _delta: &str, _content: &str) {}
}

/// Sink that records every call, mainly for tests and batch use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectingSink {
    pub deltas: Vec<String>,
    pub failures: Vec<ChatError>,
}

impl CollectingSink {
    /// Concatenation of every delta received.
    pub fn text(&self) -> String {
        self.deltas.concat()
    }
}

impl DeltaSink for CollectingSink {
    fn on_delta(&mut self, _id: MessageId, delta: &str, _content: &str) {
        self.deltas.push(delta.to_string());
    }

    fn on_failure(&mut self, error: &ChatError) {
        self.failures.push(error.clone());
    }
}
