use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::router::ParamVec;
use crate::server::ResponseWriter;

/// A request handler. Handlers are cheap to clone and shared across
/// coroutines; per-request state lives in the arguments, never the handler.
pub type Handler = Arc<dyn Fn(&HandlerRequest, &mut ResponseWriter) + Send + Sync>;

/// Convenience constructor for a [`Handler`] from a closure.
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&HandlerRequest, &mut ResponseWriter) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Request data passed to handlers: everything extracted from the raw HTTP
/// request plus the path parameters captured by the matched route.
///
/// Allocated per request and discarded when the request completes; references
/// into it must not outlive the request.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub method: Method,
    /// Request path with the query string already split off.
    pub path: String,
    /// Path parameters extracted by the router (stack-allocated for ≤8).
    pub params: ParamVec,
    /// Parsed query string parameters.
    pub query_params: HashMap<String, String>,
    /// HTTP headers, lowercase keys.
    pub headers: HashMap<String, String>,
    /// Cookies parsed from the Cookie header.
    pub cookies: HashMap<String, String>,
    /// Request body parsed as JSON, when present and well-formed.
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Get a path parameter by name.
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Get a header by name, case-insensitive per RFC 7230.
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie by name.
    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Convert params to a `HashMap`. This allocates; prefer
    /// [`get_param`](Self::get_param) on hot paths.
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Build the serve function for a route's handler chain.
///
/// A single handler is returned as-is: without a second handler there is
/// nothing to guard, the writer's own idempotence is enough. Longer chains
/// stop after a response was written unless fall-through is enabled.
pub(crate) fn chain(handlers: &[Handler], fall_through: bool) -> Handler {
    if handlers.len() == 1 {
        return Arc::clone(&handlers[0]);
    }

    let handlers = handlers.to_vec();
    Arc::new(move |req, rw| {
        for h in &handlers {
            if rw.written() && !fall_through {
                break;
            }
            h(req, rw);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request() -> HandlerRequest {
        HandlerRequest {
            method: Method::GET,
            path: "/".to_string(),
            params: ParamVec::new(),
            query_params: HashMap::new(),
            headers: HashMap::new(),
            cookies: HashMap::new(),
            body: None,
        }
    }

    #[test]
    fn chain_stops_after_response_is_written() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = Arc::clone(&calls);
        let serve = chain(
            &[
                handler(|_req, rw| {
                    rw.write_header(StatusCode::OK);
                    rw.write(b"first");
                }),
                handler(move |_req, _rw| {
                    calls2.fetch_add(1, Ordering::SeqCst);
                }),
            ],
            false,
        );

        let mut rw = ResponseWriter::new();
        serve(&request(), &mut rw);
        assert_eq!(rw.body(), b"first");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fallthrough_runs_later_handlers_without_touching_the_response() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = Arc::clone(&calls);
        let serve = chain(
            &[
                handler(|_req, rw| {
                    rw.write_header(StatusCode::CREATED);
                    rw.write(b"first");
                }),
                handler(move |_req, rw| {
                    calls2.fetch_add(1, Ordering::SeqCst);
                    rw.write_header(StatusCode::INTERNAL_SERVER_ERROR);
                    rw.write(b"second");
                }),
            ],
            true,
        );

        let mut rw = ResponseWriter::new();
        serve(&request(), &mut rw);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(rw.status(), StatusCode::CREATED);
        assert_eq!(rw.body(), b"first");
    }
}
