use http::{Method, StatusCode};
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;

use super::request::{parse_request, ParsedRequest};
use super::response::{send_error, WriterPool};
use crate::dispatcher::{handler, Handler, HandlerRequest};
use crate::router::{Lookup, ParamVec, Router};

/// The HTTP service tying the pieces together: parse the raw request, look up
/// the route, execute its handler chain, and flush the buffered response to
/// the wire.
///
/// Cloned once per server worker; all shared state is behind `Arc` and
/// immutable after startup.
#[derive(Clone)]
pub struct AppService {
    router: Arc<Router>,
    not_found: Handler,
    not_implemented: Handler,
    pool: Arc<WriterPool>,
}

impl AppService {
    /// New service over a finished route table.
    ///
    /// The default miss handlers respond with the standard error envelope:
    /// 404 for an unmatched path, 501 for a method outside the supported set.
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
            not_found: handler(|_req, rw| {
                send_error(rw, StatusCode::NOT_FOUND, "not found");
            }),
            not_implemented: handler(|_req, rw| {
                send_error(rw, StatusCode::NOT_IMPLEMENTED, "not implemented");
            }),
            pool: Arc::new(WriterPool::new()),
        }
    }

    /// Replace the handler for unmatched paths.
    #[must_use]
    pub fn with_not_found(mut self, h: Handler) -> Self {
        self.not_found = h;
        self
    }

    /// Replace the handler for unsupported methods.
    #[must_use]
    pub fn with_not_implemented(mut self, h: Handler) -> Self {
        self.not_implemented = h;
        self
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }
}

fn handler_request(parsed: ParsedRequest, method: Method, params: ParamVec) -> HandlerRequest {
    HandlerRequest {
        method,
        path: parsed.path,
        params,
        query_params: parsed.query_params,
        headers: parsed.headers,
        cookies: parsed.cookies,
        body: parsed.body,
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);
        let mut rw = self.pool.acquire();

        // An unparseable method token is outside the fixed set by definition.
        match parsed.method.parse::<Method>() {
            Err(_) => {
                let hreq = handler_request(parsed, Method::GET, ParamVec::new());
                (self.not_implemented)(&hreq, &mut rw);
            }
            Ok(method) => match self.router.lookup(&method, &parsed.path) {
                Lookup::Matched(m) => {
                    let route = m.route;
                    let hreq = handler_request(parsed, method, m.params);
                    route.serve(&hreq, &mut rw);
                }
                Lookup::NotFound => {
                    let hreq = handler_request(parsed, method, ParamVec::new());
                    (self.not_found)(&hreq, &mut rw);
                }
                Lookup::NotImplemented => {
                    let hreq = handler_request(parsed, method, ParamVec::new());
                    (self.not_implemented)(&hreq, &mut rw);
                }
            },
        }

        rw.flush_into(res);
        self.pool.release(rw);
        Ok(())
    }
}
