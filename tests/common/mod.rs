//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use go_highlight::aggregate::LineBatch;
use go_highlight::fetch::FetchError;
use go_highlight::notify::{DeliveryError, Notifier};
use go_highlight::store::{LineResponder, LineStore};
use serde_json::{json, Value};

/// Split a document the way an editor reports it: lines keep their `\n`
pub fn editor_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
    if text.is_empty() || text.ends_with('\n') {
        lines.push(String::new());
    }
    lines
}

// ============================================================================
// Line stores
// ============================================================================

/// Line store answering from background threads, out of order
///
/// Tracks how many requests are outstanding so tests can check the fetch
/// window, and can fail a chosen request.
pub struct ScriptedLineStore {
    lines: Vec<String>,
    fail_on_request: Option<usize>,
    issued: Mutex<Vec<usize>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl ScriptedLineStore {
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.as_ref().to_string()).collect(),
            fail_on_request: None,
            issued: Mutex::new(Vec::new()),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the `nth` request issued (1-based)
    pub fn failing_on_request(mut self, nth: usize) -> Self {
        self.fail_on_request = Some(nth);
        self
    }

    /// Line indices in the order they were requested
    pub fn issued(&self) -> Vec<usize> {
        self.issued.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl LineStore for ScriptedLineStore {
    fn line_count(&self) -> Result<usize, FetchError> {
        Ok(self.lines.len())
    }

    fn request_line(&self, reply: LineResponder) {
        let index = reply.index();
        let nth = {
            let mut issued = self.issued.lock().unwrap();
            issued.push(index);
            issued.len()
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = if self.fail_on_request == Some(nth) {
            Err(FetchError::Line {
                index,
                reason: "scripted failure".to_string(),
            })
        } else {
            Ok(self.lines[index].clone())
        };
        let in_flight = Arc::clone(&self.in_flight);
        // Later requests answer sooner, so replies arrive out of order
        let delay = Duration::from_micros(((index * 37) % 5) as u64 * 200);
        thread::spawn(move || {
            thread::sleep(delay);
            in_flight.fetch_sub(1, Ordering::SeqCst);
            reply.send(result);
        });
    }
}

// ============================================================================
// Notifiers
// ============================================================================

/// Records every batch it is given
#[derive(Default)]
pub struct RecordingNotifier {
    batches: Mutex<Vec<LineBatch>>,
}

impl RecordingNotifier {
    pub fn batches(&self) -> Vec<LineBatch> {
        self.batches.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn set_line_fg_spans(&self, batch: &LineBatch) -> Result<(), DeliveryError> {
        self.batches.lock().unwrap().push(batch.clone());
        Ok(())
    }
}

/// Accepts `accept` batches, then rejects everything
pub struct FailingNotifier {
    accept: usize,
    delivered: AtomicUsize,
}

impl FailingNotifier {
    pub fn new(accept: usize) -> Self {
        Self {
            accept,
            delivered: AtomicUsize::new(0),
        }
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

impl Notifier for FailingNotifier {
    fn set_line_fg_spans(&self, batch: &LineBatch) -> Result<(), DeliveryError> {
        if self.delivered.load(Ordering::SeqCst) >= self.accept {
            return Err(DeliveryError {
                line: batch.line,
                reason: "editor went away".to_string(),
            });
        }
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Simulated editor
// ============================================================================

/// Reader half of an in-memory pipe
pub struct ChannelReader {
    rx: Receiver<Vec<u8>>,
    buf: Vec<u8>,
    pos: usize,
}

impl Read for ChannelReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.buf.len() {
            match self.rx.recv() {
                Ok(chunk) => {
                    self.buf = chunk;
                    self.pos = 0;
                }
                Err(_) => return Ok(0),
            }
        }
        let n = out.len().min(self.buf.len() - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Writer half of an in-memory pipe
pub struct ChannelWriter {
    tx: Sender<Vec<u8>>,
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tx
            .send(buf.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn pipe() -> (ChannelWriter, ChannelReader) {
    let (tx, rx) = mpsc::channel();
    (
        ChannelWriter { tx },
        ChannelReader {
            rx,
            buf: Vec::new(),
            pos: 0,
        },
    )
}

/// What the simulated editor saw from the plugin
#[derive(Debug, Default)]
pub struct EditorLog {
    pub requests: Vec<String>,
    pub responses: Vec<Value>,
    pub batches: Vec<Value>,
}

/// Drive the plugin the way an editor would
///
/// Sends `opening` messages, then answers `n_lines`/`get_line` from `lines`.
/// After the last line has been served it sends `shutdown`. Returns once the
/// plugin closes its output.
pub fn spawn_editor(
    lines: Vec<String>,
    opening: Vec<Value>,
    to_plugin: ChannelWriter,
    from_plugin: ChannelReader,
) -> thread::JoinHandle<EditorLog> {
    thread::spawn(move || {
        use std::io::BufRead;

        let mut to_plugin = Some(to_plugin);
        let send = |writer: &mut Option<ChannelWriter>, message: Value| {
            if let Some(w) = writer.as_mut() {
                let _ = writeln!(w, "{}", message);
            }
        };
        for message in opening {
            send(&mut to_plugin, message);
        }

        let mut log = EditorLog::default();
        let mut served = 0;
        for line in io::BufReader::new(from_plugin).lines() {
            let Ok(line) = line else { break };
            let message: Value = serde_json::from_str(&line).unwrap();
            let Some(method) = message.get("method").and_then(Value::as_str) else {
                log.responses.push(message);
                continue;
            };
            match method {
                "n_lines" => {
                    log.requests.push(method.to_string());
                    let reply = json!({"id": message["id"], "result": lines.len()});
                    send(&mut to_plugin, reply);
                    if lines.is_empty() {
                        send(&mut to_plugin, json!({"method": "shutdown"}));
                    }
                }
                "get_line" => {
                    log.requests.push(method.to_string());
                    let index = message["params"]["line"].as_u64().unwrap() as usize;
                    let reply = json!({"id": message["id"], "result": lines[index]});
                    send(&mut to_plugin, reply);
                    served += 1;
                    if served == lines.len() {
                        send(&mut to_plugin, json!({"method": "shutdown"}));
                    }
                }
                "set_line_fg_spans" => log.batches.push(message["params"].clone()),
                other => panic!("unexpected method from plugin: {}", other),
            }
        }
        to_plugin.take();
        log
    })
}
