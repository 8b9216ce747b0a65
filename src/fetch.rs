//! Bounded-concurrency retrieval of a whole document
//!
//! [`fetch_all`] keeps at most `concurrency` line requests outstanding against
//! a [`LineStore`], writing each reply into the slot its request targeted.
//! The first failed request aborts the fetch; nothing is retried.

use std::fmt;
use std::sync::mpsc;

use crate::store::{LineReply, LineResponder, LineStore};

/// Errors that abort a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The store could not report its line count
    LineCount(String),
    /// A single line request failed
    Line { index: usize, reason: String },
    /// The store dropped a request without answering it
    Disconnected,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::LineCount(reason) => write!(f, "failed to get line count: {}", reason),
            FetchError::Line { index, reason } => {
                write!(f, "failed to get line {}: {}", index, reason)
            }
            FetchError::Disconnected => write!(f, "line store disconnected"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Fetch lines `0..n` with at most `concurrency` requests in flight.
///
/// Requests are issued from the last line down to the first. A window of 0 is
/// treated as 1. A request the store drops unanswered fails the fetch with
/// [`FetchError::Disconnected`].
pub fn fetch_all<S: LineStore + ?Sized>(
    store: &S,
    n: usize,
    concurrency: usize,
) -> Result<Vec<String>, FetchError> {
    let window = concurrency.max(1);
    let mut lines = vec![String::new(); n];

    let (reply_tx, reply_rx) = mpsc::channel::<LineReply>();
    let mut remaining = n;
    let mut receiving = 0usize;
    let mut completed = 0usize;

    while remaining > 0 || receiving > 0 {
        if receiving >= window || remaining == 0 {
            // Wait for a reply before issuing another request
            let reply = reply_rx.recv().map_err(|_| FetchError::Disconnected)?;
            let text = reply.result?;
            let slot = lines.get_mut(reply.index).ok_or_else(|| FetchError::Line {
                index: reply.index,
                reason: "reply for a line that was never requested".to_string(),
            })?;
            *slot = text;
            receiving -= 1;
            completed += 1;
        }

        if remaining > 0 {
            let index = remaining - 1;
            store.request_line(LineResponder::new(index, reply_tx.clone()));
            remaining -= 1;
            receiving += 1;
        }

        debug_assert_eq!(remaining + receiving + completed, n);
    }

    tracing::debug!("Fetched {} lines ({} concurrent requests)", completed, window);
    Ok(lines)
}

/// Join fetched lines into one text, keeping line boundaries.
///
/// Editors return lines with their terminators; a line without one (other
/// than the last) gets a `\n` so the parsed text has the same line numbers.
pub fn join_lines(lines: &[String]) -> String {
    let mut text = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    let last = lines.len().saturating_sub(1);
    for (i, line) in lines.iter().enumerate() {
        text.push_str(line);
        if i < last && !line.ends_with('\n') {
            text.push('\n');
        }
    }
    text
}
