//! # Dispatcher Module
//!
//! Handler types and chain execution. Once the router selects a route, its
//! ordered handler list runs in sequence; the response writer's written flag
//! stops the chain after the first handler that responds, unless the route
//! opted into fall-through. Either way, at most one logical response body is
//! produced per request.

mod core;

pub use core::{handler, Handler, HandlerRequest};
pub(crate) use core::chain;
