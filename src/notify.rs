//! Delivery of finished line batches to the editor

use std::fmt;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::aggregate::LineBatch;

/// Method name of the line-span notification
pub const SET_LINE_FG_SPANS: &str = "set_line_fg_spans";

/// A flush the receiver rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryError {
    pub line: usize,
    pub reason: String,
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to deliver spans for line {}: {}", self.line, self.reason)
    }
}

impl std::error::Error for DeliveryError {}

/// Receiver of line batches (fire-and-forget)
///
/// Called from the aggregator's thread.
pub trait Notifier: Send + Sync {
    fn set_line_fg_spans(&self, batch: &LineBatch) -> Result<(), DeliveryError>;
}

/// Writes each batch as one JSON line
pub struct JsonLinesNotifier<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Notifier for JsonLinesNotifier<W> {
    fn set_line_fg_spans(&self, batch: &LineBatch) -> Result<(), DeliveryError> {
        let fail = |reason: String| DeliveryError {
            line: batch.line,
            reason,
        };
        let mut line = serde_json::to_vec(batch).map_err(|e| fail(e.to_string()))?;
        line.push(b'\n');

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(&line).map_err(|e| fail(e.to_string()))?;
        out.flush().map_err(|e| fail(e.to_string()))
    }
}
