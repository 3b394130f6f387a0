use std::time::Instant;

use tracing::info;

use super::{middleware, Middleware};

/// Access log middleware: one structured log line per request with method,
/// path, response status and handling duration.
pub fn access_log() -> Middleware {
    middleware(|req, rw, next| {
        let start = Instant::now();
        next(req, rw);
        info!(
            method = %req.method,
            path = %req.path,
            status = rw.status().as_u16(),
            duration_us = start.elapsed().as_micros() as u64,
            "request served"
        );
    })
}
