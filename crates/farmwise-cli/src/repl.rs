//! Line-oriented chat loop over any async reader and blocking writer.

use std::io::{self, Write};

use farmwise_chat::{
    ChatClient, ChatError, Conversation, DeltaSink, MessageId, QUICK_QUESTIONS, SendOutcome,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _};

/// What a line typed at the prompt asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Quit,
    Help,
    Blank,
    Message(String),
}

/// Interprets one prompt line.
///
/// `1`..`4` pick a quick question, `/quit` or `/exit` leave, `/help` lists
/// the quick questions again. Anything else is sent as typed.
pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    match trimmed {
        "" => Input::Blank,
        "/quit" | "/exit" => Input::Quit,
        "/help" => Input::Help,
        _ => match trimmed.parse::<usize>() {
            Ok(n) if (1..=QUICK_QUESTIONS.len()).contains(&n) => {
                Input::Message(QUICK_QUESTIONS[n - 1].text.to_string())
            }
            _ => Input::Message(line.trim_end_matches(['\r', '\n']).to_string()),
        },
    }
}

/// Writes each delta straight to the terminal.
///
/// The first write error is kept and later deltas are not written; the
/// reply still completes in the conversation.
struct TerminalSink<'a, W: Write> {
    out: &'a mut W,
    error: Option<io::Error>,
}

impl<W: Write> DeltaSink for TerminalSink<'_, W> {
    fn on_delta(&mut self, id: MessageId, delta: &str, _content: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.out.write_all(delta.as_bytes()).and_then(|()| self.out.flush()) {
            tracing::debug!(%id, error = %error, "terminal write failed, dropping further deltas");
            self.error = Some(error);
        }
    }
}

pub fn print_quick_questions<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Quick questions:")?;
    for (i, question) in QUICK_QUESTIONS.iter().enumerate() {
        writeln!(out, "  {}. {} ({})", i + 1, question.text, question.category)?;
    }
    Ok(())
}

/// Sends one message and renders the reply, or the fallback on failure.
pub async fn ask<W: Write>(
    client: &ChatClient,
    conversation: &mut Conversation,
    text: &str,
    out: &mut W,
) -> io::Result<SendOutcome> {
    let outcome = {
        let mut sink = TerminalSink {
            out: &mut *out,
            error: None,
        };
        let outcome = client.send(conversation, text, &mut sink).await;
        if let Some(error) = sink.error {
            return Err(error);
        }
        outcome
    };
    match &outcome {
        SendOutcome::Completed { .. } => writeln!(out)?,
        SendOutcome::Failed { .. } => {
            if let Some(fallback) = conversation.last() {
                writeln!(out, "\n{}", fallback.content)?;
            }
        }
        SendOutcome::Ignored => {}
    }
    out.flush()?;
    Ok(outcome)
}

/// Runs the interactive loop until `/quit` or end of input.
///
/// Returns the number of messages that failed.
pub async fn run_chat<R, W>(
    client: &ChatClient,
    conversation: &mut Conversation,
    reader: R,
    out: &mut W,
) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if let Some(welcome) = conversation.messages().first() {
        writeln!(out, "{}\n", welcome.content)?;
    }
    print_quick_questions(out)?;

    let mut failures = 0;
    let mut lines = reader.lines();
    loop {
        write!(out, "\n> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_input(&line) {
            Input::Quit => break,
            Input::Help => print_quick_questions(out)?,
            Input::Blank => {}
            Input::Message(text) => {
                if let SendOutcome::Failed { error } = ask(client, conversation, &text, out).await? {
                    tracing::debug!(error = %error, "message failed");
                    failures += 1;
                }
            }
        }
    }
    writeln!(out)?;
    Ok(failures)
}

/// Maps a failed one-shot question to a process error.
pub fn outcome_result(outcome: SendOutcome) -> Result<(), ChatError> {
    match outcome {
        SendOutcome::Failed { error } => Err(error),
        SendOutcome::Completed { .. } | SendOutcome::Ignored => Ok(()),
    }
}
