//! Line storage boundary
//!
//! The editor owns the document; the highlighter only asks it how many lines
//! there are and for the text of individual lines. Line requests are
//! asynchronous: the store answers through the [`LineResponder`] it is handed,
//! possibly from another thread and in any order.

use std::sync::mpsc::Sender;

use ropey::Rope;

use crate::fetch::FetchError;

/// Answer to one line request
#[derive(Debug)]
pub struct LineReply {
    /// The line index that was requested
    pub index: usize,
    pub result: Result<String, FetchError>,
}

/// Answers one line request exactly once
///
/// A responder dropped without answering reports
/// [`FetchError::Disconnected`] for its line, so the fetch waiting on it fails
/// instead of blocking.
pub struct LineResponder {
    index: usize,
    tx: Option<Sender<LineReply>>,
}

impl LineResponder {
    pub fn new(index: usize, tx: Sender<LineReply>) -> Self {
        Self {
            index,
            tx: Some(tx),
        }
    }

    /// The line this responder answers for
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn send(mut self, result: Result<String, FetchError>) {
        self.answer(result);
    }

    fn answer(&mut self, result: Result<String, FetchError>) {
        if let Some(tx) = self.tx.take() {
            // The fetch may already have given up
            let _ = tx.send(LineReply {
                index: self.index,
                result,
            });
        }
    }
}

impl Drop for LineResponder {
    fn drop(&mut self) {
        if self.tx.is_some() {
            tracing::debug!("Line {} request dropped unanswered", self.index);
            self.answer(Err(FetchError::Disconnected));
        }
    }
}

/// Source of a document's lines
pub trait LineStore {
    /// Total number of lines
    fn line_count(&self) -> Result<usize, FetchError>;

    /// Start retrieving line `reply.index()`; answer through `reply`, or drop
    /// it if the store shuts down.
    fn request_line(&self, reply: LineResponder);
}

/// In-memory store over a rope, answering synchronously
///
/// Lines keep their terminators, matching what an editor returns.
pub struct RopeLineStore {
    rope: Rope,
}

impl RopeLineStore {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }
}

impl LineStore for RopeLineStore {
    fn line_count(&self) -> Result<usize, FetchError> {
        Ok(self.rope.len_lines())
    }

    fn request_line(&self, reply: LineResponder) {
        let index = reply.index();
        let result = if index < self.rope.len_lines() {
            Ok(self.rope.line(index).to_string())
        } else {
            Err(FetchError::Line {
                index,
                reason: format!("line out of range (document has {})", self.rope.len_lines()),
            })
        };
        reply.send(result);
    }
}
