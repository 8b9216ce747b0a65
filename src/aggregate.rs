//! Grouping of the span stream into per-line batches
//!
//! Spans arrive in walker order, which is non-decreasing in source position.
//! The aggregator accumulates spans while they stay on the current line and
//! flushes the accumulated batch as soon as a span lands on a later line, plus
//! once more when the stream ends. Each line is therefore flushed at most once.

use std::sync::mpsc::Receiver;

use serde::Serialize;

use crate::notify::{DeliveryError, Notifier};
use crate::palette::Palette;
use crate::syntax::{SourceMap, Span};

/// Font style sent with every span (plain)
pub const FONT_STYLE_DEFAULT: u8 = 0;

/// One colored column range within a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyledSpan {
    /// Start column (0-indexed byte, inclusive)
    #[serde(rename = "start")]
    pub start_col: usize,
    /// End column (exclusive)
    #[serde(rename = "end")]
    pub end_col: usize,
    /// ARGB foreground color
    pub fg: u32,
    pub font: u8,
}

impl StyledSpan {
    pub fn new(start_col: usize, end_col: usize, fg: u32) -> Self {
        Self {
            start_col,
            end_col,
            fg,
            font: FONT_STYLE_DEFAULT,
        }
    }
}

/// All spans of one line, in emission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineBatch {
    pub line: usize,
    pub spans: Vec<StyledSpan>,
}

/// What an aggregation run delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateSummary {
    pub batches: usize,
    pub spans: usize,
}

/// Consumer side of the span hand-off
pub struct SpanAggregator<'a, N: Notifier + ?Sized> {
    source: &'a SourceMap,
    palette: &'a Palette,
    notifier: &'a N,
    current_line: usize,
    pending: Vec<StyledSpan>,
    summary: AggregateSummary,
}

impl<'a, N: Notifier + ?Sized> SpanAggregator<'a, N> {
    pub fn new(source: &'a SourceMap, palette: &'a Palette, notifier: &'a N) -> Self {
        Self {
            source,
            palette,
            notifier,
            current_line: 0,
            pending: Vec::new(),
            summary: AggregateSummary::default(),
        }
    }

    /// Add one span, flushing the current line first if the span starts a new one
    pub fn push(&mut self, span: Span) -> Result<(), DeliveryError> {
        let resolved = self.source.resolve(&span);
        let entry = StyledSpan::new(
            resolved.start_col,
            resolved.end_col,
            self.palette.fg(span.color),
        );

        if resolved.line == self.current_line {
            self.pending.push(entry);
            return Ok(());
        }

        if !self.pending.is_empty() {
            self.flush()?;
        }
        self.current_line = resolved.line;
        self.pending.push(entry);
        Ok(())
    }

    /// Flush whatever is left; the stream has ended
    pub fn finish(mut self) -> Result<AggregateSummary, DeliveryError> {
        if !self.pending.is_empty() {
            self.flush()?;
        }
        Ok(self.summary)
    }

    /// Drain a span channel until the producer closes it, then finish
    pub fn consume(mut self, spans: Receiver<Span>) -> Result<AggregateSummary, DeliveryError> {
        for span in spans {
            self.push(span)?;
        }
        self.finish()
    }

    fn flush(&mut self) -> Result<(), DeliveryError> {
        let batch = LineBatch {
            line: self.current_line,
            spans: std::mem::take(&mut self.pending),
        };
        tracing::trace!("Flushing {} spans for line {}", batch.spans.len(), batch.line);
        self.notifier.set_line_fg_spans(&batch)?;
        self.summary.batches += 1;
        self.summary.spans += batch.spans.len();
        Ok(())
    }
}
