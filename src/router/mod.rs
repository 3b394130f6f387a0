//! # Router Module
//!
//! Path matching and route resolution: given a registered set of
//! (method, pattern) routes, find the single route that should handle an
//! inbound request and extract its named path parameters.
//!
//! ## Overview
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: at registration, patterns like `/users/:email` or
//!    `/files/*path` are split into segment fragments (literal, parameter,
//!    wildcard). Misconfiguration is fatal at this point, never at request
//!    time.
//! 2. **Matching**: per request, candidates for the request's method are
//!    walked in registration order. Static routes are a single string
//!    comparison; parameterized routes match segment by segment. The first
//!    match wins — a deliberate, reported tie-break policy when patterns
//!    overlap.
//!
//! The table is built once at startup and immutable afterwards, so it is
//! shared across coroutines without synchronization.
//!
//! ## Example
//!
//! ```
//! use http::Method;
//! use waypoint::dispatcher::handler;
//! use waypoint::router::{Lookup, Route, Router};
//! use waypoint::server::send_response;
//!
//! let get_user = handler(|req, rw| {
//!     send_response(rw, http::StatusCode::OK, &serde_json::json!({
//!         "email": req.get_param("email"),
//!     }));
//! });
//!
//! let router = Router::with_routes(vec![
//!     Route::new("get_user", Method::GET, "/users/:email", vec![get_user]),
//! ]).unwrap();
//!
//! match router.lookup(&Method::GET, "/users/jane@example.com") {
//!     Lookup::Matched(m) => assert_eq!(m.get_param("email"), Some("jane@example.com")),
//!     _ => panic!("expected a match"),
//! }
//! ```

mod core;
mod route;

pub use core::{Lookup, ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS, SUPPORTED_METHODS};
pub use route::{Route, RouteError};
