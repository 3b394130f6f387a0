//! # Middleware Module
//!
//! Middleware wraps a route's serve chain in the next-continuation style: a
//! layer receives the request, the response writer, and the inner chain, and
//! decides whether and when to call through. Layers are applied at startup
//! via [`Router::use_middleware`](crate::router::Router::use_middleware) or
//! per route; the layer added last runs outermost.

mod accesslog;
mod cors;

use std::sync::Arc;

use crate::dispatcher::{Handler, HandlerRequest};
use crate::server::ResponseWriter;

/// A middleware layer: wraps the inner handler chain and may run work before
/// or after it, or skip it entirely (e.g. a preflight short-circuit).
pub type Middleware =
    Arc<dyn Fn(&HandlerRequest, &mut ResponseWriter, &Handler) + Send + Sync>;

/// Convenience constructor for a [`Middleware`] from a closure.
pub fn middleware<F>(f: F) -> Middleware
where
    F: Fn(&HandlerRequest, &mut ResponseWriter, &Handler) + Send + Sync + 'static,
{
    Arc::new(f)
}

pub use accesslog::access_log;
pub use cors::Cors;
