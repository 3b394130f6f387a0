//! # Waypoint
//!
//! **Waypoint** is a small, coroutine-powered HTTP toolkit for Rust built on
//! the `may` runtime: a segment-matching path router, a handler dispatch
//! chain, an idempotent buffered response writer, and a classified error
//! type that maps error kinds to HTTP statuses.
//!
//! ## Architecture
//!
//! The library is organized into a handful of modules:
//!
//! - **[`errors`]** - classified errors: a [`Kind`](errors::Kind) per error,
//!   HTTP status mapping, cause chains, and friendly user messages
//! - **[`router`]** - route registration and segment-walking path matching
//!   with `:param` and `*wildcard` fragments
//! - **[`dispatcher`]** - handler types and the write-once dispatch chain
//! - **[`middleware`]** - next-continuation middleware (access log, CORS)
//! - **[`server`]** - HTTP plumbing on `may_minihttp`: request parsing, the
//!   pooled [`ResponseWriter`](server::ResponseWriter), and the service loop
//! - **[`runtime_config`]** - environment-driven runtime configuration
//! - **[`logging`]** - tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```no_run
//! use waypoint::dispatcher::handler;
//! use waypoint::router::{Route, Router};
//! use waypoint::server::{send_response, AppService, HttpServer};
//! use waypoint::runtime_config::RuntimeConfig;
//! use http::Method;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     waypoint::logging::init();
//!     let config = RuntimeConfig::from_env();
//!     config.apply();
//!
//!     let mut router = Router::new();
//!     router.add(Route::new(
//!         "get_user",
//!         Method::GET,
//!         "/users/:id",
//!         vec![handler(|req, rw| {
//!             let id = req.get_param("id").unwrap_or_default();
//!             send_response(rw, http::StatusCode::OK, &serde_json::json!({ "id": id }));
//!         })],
//!     ))?;
//!
//!     let service = AppService::new(router);
//!     let server = HttpServer(service).start(&config.addr)?;
//!     server.join().map_err(|_| "server panicked")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Runtime Notes
//!
//! Handlers run on `may` coroutines with small stacks (16 KB by default).
//! Avoid deep recursion and large stack allocations in handlers, or raise
//! the stack size via `WAYPOINT_STACK_SIZE`.

pub mod dispatcher;
pub mod errors;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use dispatcher::{handler, Handler, HandlerRequest};
pub use errors::{Classifier, Error, Kind};
pub use middleware::{access_log, middleware, Cors, Middleware};
pub use router::{Lookup, Route, RouteError, RouteMatch, Router};
pub use runtime_config::RuntimeConfig;
pub use server::{AppService, HttpServer, ResponseWriter, ServerHandle};
