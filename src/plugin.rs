//! Editor plugin host
//!
//! ```text
//! stdin ─▶ Peer::run (main thread) ─ping_from_editor─▶ job queue
//!                                                        │
//!                         highlight-worker ◀─────────────┘
//!                              │ n_lines / get_line (requests)
//!                              │ set_line_fg_spans (notifications)
//!                              ▼
//!                            stdout
//! ```
//!
//! The read loop never runs a pipeline itself: line replies arrive through
//! it, so a run on that thread would wait on itself.

use std::io::{BufRead, Write};
use std::ops::ControlFlow;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context};
use serde_json::{json, Value};

use crate::aggregate::LineBatch;
use crate::fetch::FetchError;
use crate::notify::{DeliveryError, Notifier, SET_LINE_FG_SPANS};
use crate::palette::Palette;
use crate::pipeline::{HighlightError, Pipeline, PipelineOptions};
use crate::rpc::{Incoming, Peer};
use crate::store::{LineResponder, LineStore};

/// Request for the editor's line count
pub const N_LINES: &str = "n_lines";
/// Request for one line's text
pub const GET_LINE: &str = "get_line";

/// [`LineStore`] backed by editor requests
pub struct PeerLineStore<'a> {
    peer: &'a Peer,
}

impl<'a> PeerLineStore<'a> {
    pub fn new(peer: &'a Peer) -> Self {
        Self { peer }
    }
}

impl LineStore for PeerLineStore<'_> {
    fn line_count(&self) -> Result<usize, FetchError> {
        let value = self
            .peer
            .request_sync(N_LINES, json!({}))
            .map_err(|e| FetchError::LineCount(e.to_string()))?;
        line_count_from(&value).ok_or_else(|| {
            FetchError::LineCount(format!("expected a line count, got {}", value))
        })
    }

    fn request_line(&self, reply: LineResponder) {
        let index = reply.index();
        self.peer
            .request(GET_LINE, json!({ "line": index }), move |result| {
                let result = match result {
                    Ok(Value::String(text)) => Ok(text),
                    Ok(other) => Err(FetchError::Line {
                        index,
                        reason: format!("expected a string, got {}", other),
                    }),
                    Err(e) => Err(FetchError::Line {
                        index,
                        reason: e.to_string(),
                    }),
                };
                reply.send(result);
            });
    }
}

/// Editors may send the count as a float
fn line_count_from(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|n| *n >= 0.0 && n.fract() == 0.0)
        .map(|n| n as usize)
}

/// [`Notifier`] sending `set_line_fg_spans` notifications
pub struct PeerNotifier<'a> {
    peer: &'a Peer,
}

impl<'a> PeerNotifier<'a> {
    pub fn new(peer: &'a Peer) -> Self {
        Self { peer }
    }
}

impl Notifier for PeerNotifier<'_> {
    fn set_line_fg_spans(&self, batch: &LineBatch) -> Result<(), DeliveryError> {
        let fail = |reason: String| DeliveryError {
            line: batch.line,
            reason,
        };
        let params = serde_json::to_value(batch).map_err(|e| fail(e.to_string()))?;
        self.peer
            .notify(SET_LINE_FG_SPANS, params)
            .map_err(|e| fail(e.to_string()))
    }
}

/// Highlight the editor's current document once, logging the outcome
pub fn highlight_document(peer: &Peer, palette: &Palette, options: PipelineOptions) {
    let store = PeerLineStore::new(peer);
    let notifier = PeerNotifier::new(peer);
    match Pipeline::new(&store, &notifier, palette, options).run() {
        Ok(summary) => tracing::info!(
            "Highlighted {} lines ({} spans)",
            summary.lines,
            summary.spans_delivered
        ),
        Err(HighlightError::Parse(e)) => tracing::warn!("Not highlighting: {}", e),
        Err(e) => tracing::error!("Highlighting failed: {}", e),
    }
}

/// Serves the plugin protocol for one editor connection
pub struct PluginHost {
    peer: Arc<Peer>,
    palette: Palette,
    options: PipelineOptions,
}

impl PluginHost {
    pub fn new<W: Write + Send + 'static>(
        writer: W,
        palette: Palette,
        options: PipelineOptions,
    ) -> Self {
        Self {
            peer: Arc::new(Peer::new(writer)),
            palette,
            options,
        }
    }

    /// Read from the editor until it disconnects or asks us to shut down
    ///
    /// Queued runs finish (or fail) before this returns.
    pub fn serve<R: BufRead>(&self, reader: R) -> anyhow::Result<()> {
        let (job_tx, job_rx) = mpsc::channel::<()>();
        let worker = {
            let peer = Arc::clone(&self.peer);
            let palette = self.palette;
            let options = self.options;
            thread::Builder::new()
                .name("highlight-worker".to_string())
                .spawn(move || {
                    for () in job_rx {
                        highlight_document(&peer, &palette, options);
                    }
                })
                .context("Failed to spawn highlight worker")?
        };

        let result = self
            .peer
            .run(reader, |incoming| self.dispatch(incoming, &job_tx));

        drop(job_tx);
        worker
            .join()
            .map_err(|_| anyhow!("Highlight worker panicked"))?;
        result.context("Editor connection failed")
    }

    fn dispatch(&self, incoming: Incoming, jobs: &Sender<()>) -> ControlFlow<()> {
        let flow = match incoming.method() {
            "ping" => {
                tracing::info!("ping received");
                ControlFlow::Continue(())
            }
            "ping_from_editor" => {
                tracing::info!("ping_from_editor received");
                if jobs.send(()).is_err() {
                    tracing::error!("Highlight worker is gone; dropping request");
                }
                ControlFlow::Continue(())
            }
            "shutdown" => {
                tracing::info!("Shutting down");
                ControlFlow::Break(())
            }
            other => {
                tracing::debug!("Ignoring {}", other);
                ControlFlow::Continue(())
            }
        };

        if let Some(id) = incoming.id() {
            if let Err(e) = self.peer.respond(id, Value::Null) {
                tracing::warn!("Failed to answer {}: {}", incoming.method(), e);
            }
        }
        flow
    }
}
