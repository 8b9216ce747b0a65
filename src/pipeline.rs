//! One highlighting run, end to end
//!
//! ```text
//! LineStore ─fetch_all─▶ lines ─join─▶ text ─GoParser─▶ tree
//!     tree ─walk─▶ [bounded queue] ─SpanAggregator─▶ Notifier
//! ```
//!
//! The walker runs on the caller's thread and the aggregator on a scoped
//! thread. Joining that thread is the completion signal: the run is not done
//! until the aggregator has flushed its last batch.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::mpsc;
use std::thread;

use crate::aggregate::{AggregateSummary, SpanAggregator};
use crate::fetch::{fetch_all, join_lines, FetchError};
use crate::notify::{DeliveryError, Notifier};
use crate::palette::Palette;
use crate::store::LineStore;
use crate::syntax::{try_walk, GoParser, ParseError, SourceMap};

/// Default number of outstanding line requests
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default capacity of the walker → aggregator queue
pub const DEFAULT_SPAN_QUEUE_CAPACITY: usize = 10;

/// Tuning for a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub concurrency: usize,
    pub span_queue_capacity: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            span_queue_capacity: DEFAULT_SPAN_QUEUE_CAPACITY,
        }
    }
}

/// Why a run produced no (or incomplete) highlighting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    Fetch(FetchError),
    Parse(ParseError),
    Delivery(DeliveryError),
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::Fetch(e) => write!(f, "fetch failed: {}", e),
            HighlightError::Parse(e) => write!(f, "parse failed: {}", e),
            HighlightError::Delivery(e) => write!(f, "delivery failed: {}", e),
        }
    }
}

impl std::error::Error for HighlightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HighlightError::Fetch(e) => Some(e),
            HighlightError::Parse(e) => Some(e),
            HighlightError::Delivery(e) => Some(e),
        }
    }
}

impl From<FetchError> for HighlightError {
    fn from(e: FetchError) -> Self {
        HighlightError::Fetch(e)
    }
}

impl From<ParseError> for HighlightError {
    fn from(e: ParseError) -> Self {
        HighlightError::Parse(e)
    }
}

impl From<DeliveryError> for HighlightError {
    fn from(e: DeliveryError) -> Self {
        HighlightError::Delivery(e)
    }
}

/// Counts from a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lines: usize,
    pub spans_emitted: usize,
    pub batches: usize,
    pub spans_delivered: usize,
}

/// Highlights one document from a store into a notifier
pub struct Pipeline<'a, S: LineStore + ?Sized, N: Notifier + ?Sized> {
    store: &'a S,
    notifier: &'a N,
    palette: &'a Palette,
    options: PipelineOptions,
}

impl<'a, S: LineStore + ?Sized, N: Notifier + ?Sized> Pipeline<'a, S, N> {
    pub fn new(
        store: &'a S,
        notifier: &'a N,
        palette: &'a Palette,
        options: PipelineOptions,
    ) -> Self {
        Self {
            store,
            notifier,
            palette,
            options,
        }
    }

    /// Run the whole pipeline once, from scratch
    pub fn run(&self) -> Result<RunSummary, HighlightError> {
        let n = self.store.line_count()?;
        tracing::debug!("Highlighting document with {} lines", n);

        let lines = fetch_all(self.store, n, self.options.concurrency)?;
        let text = join_lines(&lines);

        let mut parser = GoParser::new()?;
        let tree = parser.parse(&text)?;
        let source = SourceMap::new(&text);

        let (span_tx, span_rx) = mpsc::sync_channel(self.options.span_queue_capacity.max(1));
        let (spans_emitted, delivered) = thread::scope(|scope| {
            let source = &source;
            let palette = self.palette;
            let notifier = self.notifier;
            let consumer = scope.spawn(move || {
                SpanAggregator::new(source, palette, notifier).consume(span_rx)
            });

            let mut emitted = 0usize;
            let flow = try_walk(tree.root_node(), &mut |span| {
                // A send only fails once the aggregator has stopped on a
                // delivery error; that error is reported by the join below.
                if span_tx.send(span).is_err() {
                    return ControlFlow::Break(());
                }
                emitted += 1;
                ControlFlow::Continue(())
            });
            drop(span_tx);
            if flow.is_break() {
                tracing::debug!("Walk stopped after {} spans", emitted);
            }

            match consumer.join() {
                Ok(result) => (emitted, result),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        });
        let AggregateSummary { batches, spans } = delivered?;

        let summary = RunSummary {
            lines: n,
            spans_emitted,
            batches,
            spans_delivered: spans,
        };
        tracing::debug!(
            "Highlight run done: {} lines, {} spans in {} batches",
            summary.lines,
            summary.spans_delivered,
            summary.batches
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::LineBatch;
    use crate::store::RopeLineStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        batches: Mutex<Vec<LineBatch>>,
    }

    impl Notifier for Recorder {
        fn set_line_fg_spans(&self, batch: &LineBatch) -> Result<(), DeliveryError> {
            self.batches.lock().unwrap().push(batch.clone());
            Ok(())
        }
    }

    #[test]
    fn test_run_over_rope_store() {
        let store = RopeLineStore::new("package p\n\nvar x = 1\n");
        let recorder = Recorder::default();
        let palette = Palette::default();
        let summary = Pipeline::new(&store, &recorder, &palette, PipelineOptions::default())
            .run()
            .unwrap();

        assert_eq!(summary.lines, 4);
        assert_eq!(summary.spans_emitted, summary.spans_delivered);
        assert_eq!(summary.batches, 2);

        let batches = recorder.batches.lock().unwrap();
        assert_eq!(batches[0].line, 0);
        assert_eq!(batches[1].line, 2);
    }

    #[test]
    fn test_parse_failure_delivers_nothing() {
        let store = RopeLineStore::new("package p\nfunc {\n");
        let recorder = Recorder::default();
        let palette = Palette::default();
        let err = Pipeline::new(&store, &recorder, &palette, PipelineOptions::default())
            .run()
            .unwrap_err();

        assert!(matches!(err, HighlightError::Parse(_)));
        assert!(recorder.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_error_display_names_stage() {
        let err = HighlightError::Fetch(FetchError::Disconnected);
        assert_eq!(err.to_string(), "fetch failed: line store disconnected");
    }
}
