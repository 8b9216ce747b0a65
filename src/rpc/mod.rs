//! Line-delimited JSON-RPC peer for the editor's plugin protocol
//!
//! ```text
//! worker thread ── request/notify ──▶ writer (stdout)
//! reader (stdin) ── Peer::run ──┬──▶ pending reply callbacks
//!                               └──▶ handler(Incoming)
//! ```
//!
//! Replies are matched to requests by id. Reply callbacks run on the thread
//! that drives [`Peer::run`], so a caller blocked in [`Peer::request_sync`]
//! must never be that thread.

mod message;

use std::collections::HashMap;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;

pub use message::Incoming;
use message::{decode, Message, OutboundNotification, OutboundRequest, OutboundResponse};

/// Transport and protocol failures
#[derive(Debug)]
pub enum RpcError {
    Io(io::Error),
    Json(serde_json::Error),
    /// The peer answered with an error object
    Remote(Value),
    /// The connection closed before a reply arrived
    Disconnected,
    Protocol(String),
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::Io(e) => write!(f, "i/o error: {}", e),
            RpcError::Json(e) => write!(f, "invalid json: {}", e),
            RpcError::Remote(e) => write!(f, "remote error: {}", e),
            RpcError::Disconnected => write!(f, "peer disconnected"),
            RpcError::Protocol(e) => write!(f, "protocol error: {}", e),
        }
    }
}

impl std::error::Error for RpcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RpcError::Io(e) => Some(e),
            RpcError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RpcError {
    fn from(e: io::Error) -> Self {
        RpcError::Io(e)
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::Json(e)
    }
}

type ReplyHandler = Box<dyn FnOnce(Result<Value, RpcError>) + Send>;

#[derive(Default)]
struct Pending {
    handlers: HashMap<u64, ReplyHandler>,
    closed: bool,
}

/// One end of a plugin connection
pub struct Peer {
    writer: Mutex<Box<dyn Write + Send>>,
    pending: Mutex<Pending>,
    next_id: AtomicU64,
}

impl Peer {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            pending: Mutex::new(Pending::default()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Send a request; `on_reply` runs exactly once with the outcome
    pub fn request<F>(&self, method: &str, params: Value, on_reply: F)
    where
        F: FnOnce(Result<Value, RpcError>) + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut pending = self.lock_pending();
            if pending.closed {
                drop(pending);
                on_reply(Err(RpcError::Disconnected));
                return;
            }
            pending.handlers.insert(id, Box::new(on_reply));
        }

        let sent = self.write_message(&OutboundRequest {
            id,
            method,
            params: &params,
        });
        if let Err(e) = sent {
            let handler = self.lock_pending().handlers.remove(&id);
            if let Some(handler) = handler {
                handler(Err(e));
            }
        }
    }

    /// Send a request and block until its reply arrives
    pub fn request_sync(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let (tx, rx) = mpsc::channel();
        self.request(method, params, move |result| {
            let _ = tx.send(result);
        });
        rx.recv().map_err(|_| RpcError::Disconnected)?
    }

    pub fn notify(&self, method: &str, params: Value) -> Result<(), RpcError> {
        self.write_message(&OutboundNotification {
            method,
            params: &params,
        })
    }

    /// Answer an inbound request
    pub fn respond(&self, id: u64, result: Value) -> Result<(), RpcError> {
        self.write_message(&OutboundResponse {
            id,
            result: &result,
        })
    }

    /// Read messages until EOF or until `handler` breaks
    ///
    /// Responses complete their pending requests; everything else goes to
    /// `handler`. On return every outstanding request fails with
    /// [`RpcError::Disconnected`], as does any request made afterwards.
    pub fn run<R, H>(&self, reader: R, mut handler: H) -> Result<(), RpcError>
    where
        R: BufRead,
        H: FnMut(Incoming) -> ControlFlow<()>,
    {
        let result = self.read_loop(reader, &mut handler);
        self.close();
        result
    }

    fn read_loop<R, H>(&self, reader: R, handler: &mut H) -> Result<(), RpcError>
    where
        R: BufRead,
        H: FnMut(Incoming) -> ControlFlow<()>,
    {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match decode(&line) {
                Ok(Message::Response { id, result }) => self.complete(id, result),
                Ok(Message::Incoming(incoming)) => {
                    tracing::trace!("Received {}", incoming.method());
                    if handler(incoming).is_break() {
                        tracing::debug!("Read loop stopped by handler");
                        return Ok(());
                    }
                }
                Err(e) => tracing::warn!("Skipping malformed message: {}", e),
            }
        }
        tracing::debug!("Editor closed the connection");
        Ok(())
    }

    fn complete(&self, id: u64, result: Result<Value, RpcError>) {
        let handler = self.lock_pending().handlers.remove(&id);
        match handler {
            Some(handler) => handler(result),
            None => tracing::warn!("Response for unknown request id {}", id),
        }
    }

    fn close(&self) {
        let handlers = {
            let mut pending = self.lock_pending();
            pending.closed = true;
            std::mem::take(&mut pending.handlers)
        };
        if !handlers.is_empty() {
            tracing::debug!("Failing {} outstanding requests", handlers.len());
        }
        for (_, handler) in handlers {
            handler(Err(RpcError::Disconnected));
        }
    }

    fn write_message<T: Serialize>(&self, message: &T) -> Result<(), RpcError> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;
    use std::sync::Arc;

    /// Cloneable in-memory writer
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn lines(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    #[test]
    fn test_request_is_written_with_id() {
        let out = SharedBuf::default();
        let peer = Peer::new(out.clone());
        peer.request("get_line", json!({"line": 3}), |_| {});
        peer.request("get_line", json!({"line": 2}), |_| {});

        assert_eq!(
            out.lines(),
            vec![
                json!({"id": 0, "method": "get_line", "params": {"line": 3}}),
                json!({"id": 1, "method": "get_line", "params": {"line": 2}}),
            ]
        );
    }

    #[test]
    fn test_response_completes_pending_request() {
        let peer = Peer::new(SharedBuf::default());
        let (tx, rx) = mpsc::channel();
        peer.request("n_lines", json!({}), move |result| {
            tx.send(result.unwrap()).unwrap();
        });

        let input = Cursor::new("{\"id\":0,\"result\":42}\n");
        peer.run(input, |_| ControlFlow::Continue(())).unwrap();
        assert_eq!(rx.recv().unwrap(), json!(42));
    }

    #[test]
    fn test_eof_fails_outstanding_and_later_requests() {
        let peer = Peer::new(SharedBuf::default());
        let (tx, rx) = mpsc::channel();
        let early = tx.clone();
        peer.request("n_lines", json!({}), move |result| {
            early.send(result.is_err()).unwrap();
        });

        peer.run(Cursor::new(""), |_| ControlFlow::Continue(())).unwrap();
        assert!(rx.recv().unwrap());

        peer.request("n_lines", json!({}), move |result| {
            tx.send(matches!(result, Err(RpcError::Disconnected))).unwrap();
        });
        assert!(rx.recv().unwrap());
        assert!(matches!(
            peer.request_sync("n_lines", json!({})),
            Err(RpcError::Disconnected)
        ));
    }

    #[test]
    fn test_handler_break_stops_reading() {
        let peer = Peer::new(SharedBuf::default());
        let input = Cursor::new(
            "{\"method\":\"ping\"}\n{\"method\":\"shutdown\"}\n{\"method\":\"ping\"}\n",
        );
        let mut seen = Vec::new();
        peer.run(input, |incoming| {
            seen.push(incoming.method().to_string());
            if incoming.method() == "shutdown" {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
        assert_eq!(seen, vec!["ping", "shutdown"]);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let peer = Peer::new(SharedBuf::default());
        let input = Cursor::new("garbage\n\n{\"method\":\"ping\"}\n");
        let mut count = 0;
        peer.run(input, |_| {
            count += 1;
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_notify_and_respond_shapes() {
        let out = SharedBuf::default();
        let peer = Peer::new(out.clone());
        peer.notify("set_line_fg_spans", json!({"line": 0, "spans": []}))
            .unwrap();
        peer.respond(7, Value::Null).unwrap();

        assert_eq!(
            out.lines(),
            vec![
                json!({"method": "set_line_fg_spans", "params": {"line": 0, "spans": []}}),
                json!({"id": 7, "result": null}),
            ]
        );
    }
}
