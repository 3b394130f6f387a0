use http::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::{Mutex, OnceLock};
use tracing::error;

use crate::errors;

/// Writers kept around per pool; beyond this, released writers are dropped.
const POOL_CAPACITY: usize = 64;

/// Buffered response sink with idempotent writes.
///
/// The status line is recorded by the first `write_header` call and locked in
/// by the first body write; every later write attempt is a no-op. This is
/// what guarantees at most one logical response per request no matter how
/// many handlers are chained.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    header_written: bool,
    written: bool,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            body: Vec::new(),
            header_written: false,
            written: false,
        }
    }

    /// Record the response status. Only the first call has an effect.
    pub fn write_header(&mut self, status: StatusCode) {
        if self.header_written {
            return;
        }
        self.header_written = true;
        self.status = status;
    }

    /// Set a response header, replacing any earlier value for the same name.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.headers.iter_mut().find(|(k, _)| *k == name) {
            entry.1 = value;
        } else {
            self.headers.push((name, value));
        }
    }

    /// Write the response body and lock in the status. A no-op once a body
    /// has been written.
    pub fn write(&mut self, body: &[u8]) {
        if self.written {
            return;
        }
        self.header_written = true;
        self.written = true;
        self.body.extend_from_slice(body);
    }

    /// Whether a response body has been written.
    #[must_use]
    pub fn written(&self) -> bool {
        self.written
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Clear all fields back to their zero state for reuse.
    fn reset(&mut self) {
        self.status = StatusCode::OK;
        self.headers.clear();
        self.body.clear();
        self.header_written = false;
        self.written = false;
    }

    /// Copy the buffered response into the wire-level response.
    pub(crate) fn flush_into(&mut self, res: &mut may_minihttp::Response) {
        res.status_code(
            self.status.as_u16() as usize,
            self.status.canonical_reason().unwrap_or("OK"),
        );
        for (name, value) in &self.headers {
            res.header(header_line(name, value));
        }
        res.body_vec(std::mem::take(&mut self.body));
    }
}

/// may_minihttp wants `&'static str` header lines. The common cases are
/// interned statically; everything else goes through a global cache so each
/// distinct name/value line is leaked at most once, no matter how many
/// responses carry it.
fn header_line(name: &str, value: &str) -> &'static str {
    match (name, value) {
        ("Content-Type", "application/json") => "Content-Type: application/json",
        ("Content-Type", "text/plain") => "Content-Type: text/plain",
        ("Content-Type", "text/html") => "Content-Type: text/html",
        _ => intern_header_line(name, value),
    }
}

static HEADER_LINES: OnceLock<Mutex<HashMap<(String, String), &'static str>>> = OnceLock::new();

fn intern_header_line(name: &str, value: &str) -> &'static str {
    let cache = HEADER_LINES.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = match cache.lock() {
        Ok(guard) => guard,
        // The only write under the lock is an insert; a poisoned map is
        // still a valid map.
        Err(poisoned) => poisoned.into_inner(),
    };
    let key = (name.to_string(), value.to_string());
    if let Some(line) = cache.get(&key).copied() {
        return line;
    }
    let line: &'static str = Box::leak(format!("{name}: {value}").into_boxed_str());
    cache.insert(key, line);
    line
}

/// Respond with the success envelope `{"data": …, "status": …}`.
pub fn send_response(rw: &mut ResponseWriter, status: StatusCode, data: &Value) {
    let payload = json!({ "data": data, "status": status.as_u16() });
    send_raw_json(rw, status, &payload);
}

/// Respond with the error envelope `{"errors": …, "status": …}`.
pub fn send_error(rw: &mut ResponseWriter, status: StatusCode, message: &str) {
    let payload = json!({ "errors": message, "status": status.as_u16() });
    send_raw_json(rw, status, &payload);
}

/// The failure adapter at the transport boundary: classify `err` into a
/// status code and user-facing message, send those to the client, and keep
/// the diagnostic trace in the server log.
pub fn send_classified_error(rw: &mut ResponseWriter, err: &(dyn StdError + 'static)) {
    let (status, message, classified) = errors::http_status_message(err);
    if let Some(classified_err) = err.downcast_ref::<errors::Error>() {
        error!(
            status = status.as_u16(),
            trace = ?classified_err.trace(),
            "request failed"
        );
    } else {
        error!(status = status.as_u16(), classified, error = %err, "request failed");
    }
    send_error(rw, status, &message);
}

fn send_raw_json(rw: &mut ResponseWriter, status: StatusCode, payload: &Value) {
    rw.header("Content-Type", "application/json");
    rw.write_header(status);
    rw.write(payload.to_string().as_bytes());
}

/// Free-list of response writers: acquire before the request, reset and
/// release after it completes.
///
/// A writer must never be released while still referenced by in-flight work;
/// references to it must not outlive the request that acquired it.
#[derive(Debug, Default)]
pub struct WriterPool {
    free: Mutex<Vec<ResponseWriter>>,
}

impl WriterPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a writer from the pool, or allocate a fresh one.
    #[must_use]
    pub fn acquire(&self) -> ResponseWriter {
        self.free
            .lock()
            .ok()
            .and_then(|mut free| free.pop())
            .unwrap_or_default()
    }

    /// Reset a writer to its zero state and return it to the pool.
    pub fn release(&self, mut writer: ResponseWriter) {
        writer.reset();
        if let Ok(mut free) = self.free.lock() {
            if free.len() < POOL_CAPACITY {
                free.push(writer);
            }
        }
    }
}
