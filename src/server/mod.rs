//! # Server Module
//!
//! HTTP plumbing on top of `may_minihttp`: request parsing, the buffered
//! idempotent [`ResponseWriter`], the [`AppService`] request loop, and a thin
//! server start/stop wrapper.

mod http_server;
mod request;
mod response;
mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_cookies, parse_query_params, parse_request, ParsedRequest};
pub use response::{
    send_classified_error, send_error, send_response, ResponseWriter, WriterPool,
};
pub use service::AppService;
