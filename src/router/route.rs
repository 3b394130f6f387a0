use http::Method;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::core::ParamVec;
use crate::dispatcher::{chain, Handler, HandlerRequest};
use crate::middleware::Middleware;
use crate::server::ResponseWriter;

/// Fatal route configuration errors, surfaced at registration time.
///
/// These all indicate a programmer error in the route declarations, so
/// startup must stop rather than silently degrade.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("unsupported HTTP method '{method}' for route '{name}'")]
    UnsupportedMethod { name: String, method: Method },
    #[error("no handlers provided for route '{name}' ({pattern})")]
    NoHandlers { name: String, pattern: String },
    #[error("duplicate URI parameter '{param}' in pattern '{pattern}'")]
    DuplicateParam { pattern: String, param: String },
    #[error("more than one wildcard in pattern '{pattern}'")]
    MultipleWildcards { pattern: String },
}

/// One pre-compiled segment of a route pattern.
///
/// A literal must match byte-for-byte, a parameter captures one non-empty
/// segment under `name`, and a wildcard greedily captures the remaining
/// segments joined by `/`.
#[derive(Debug, Clone)]
struct Fragment {
    is_param: bool,
    is_wildcard: bool,
    /// The capture key for parameters and wildcards, the literal text
    /// otherwise.
    name: Arc<str>,
}

/// A registered route: immutable after registration.
///
/// Patterns are `/`-delimited; a segment starting with `:` is a named
/// parameter and a segment spelled `*name` (or `:name*`) is a wildcard that
/// captures the rest of the path. At most one wildcard per pattern.
pub struct Route {
    /// Unique identifier for the route. Duplicates are reported at
    /// registration but are not fatal.
    pub name: String,
    pub method: Method,
    pub pattern: String,
    /// When set, the pattern also matches with exactly one extra trailing
    /// slash. There is no redirect, both spellings serve the same route.
    pub trailing_slash: bool,
    /// When set, remaining handlers keep executing even after a response was
    /// written. Later body writes are still no-ops; this exists for
    /// instrumentation handlers that run after the functional one.
    pub fallthrough_post_response: bool,

    handlers: Vec<Handler>,
    fragments: Vec<Fragment>,
    params_count: usize,
    serve: Option<Handler>,
}

impl Route {
    /// New route with default flags. Pattern compilation and validation
    /// happen when the route is added to a [`Router`](super::Router).
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        method: Method,
        pattern: impl Into<String>,
        handlers: Vec<Handler>,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            pattern: pattern.into(),
            trailing_slash: false,
            fallthrough_post_response: false,
            handlers,
            fragments: Vec::new(),
            params_count: 0,
            serve: None,
        }
    }

    /// Also accept the path with one extra trailing slash.
    #[must_use]
    pub fn with_trailing_slash(mut self) -> Self {
        self.trailing_slash = true;
        self
    }

    /// Keep executing handlers after a response has been written.
    #[must_use]
    pub fn with_fallthrough(mut self) -> Self {
        self.fallthrough_post_response = true;
        self
    }

    /// Number of named captures (parameters and wildcards) in the pattern.
    #[must_use]
    pub fn params_count(&self) -> usize {
        self.params_count
    }

    /// Compile the pattern into fragments and build the serve chain.
    /// Called once, by `Router::add`.
    pub(crate) fn init(&mut self) -> Result<(), RouteError> {
        if self.handlers.is_empty() {
            return Err(RouteError::NoHandlers {
                name: self.name.clone(),
                pattern: self.pattern.clone(),
            });
        }
        self.compile_pattern()?;
        self.serve = Some(chain(&self.handlers, self.fallthrough_post_response));
        Ok(())
    }

    fn compile_pattern(&mut self) -> Result<(), RouteError> {
        // Static patterns are matched by string equality, no fragments needed.
        if !self.pattern.contains(':') && !self.pattern.contains('*') {
            return Ok(());
        }

        let mut fragments = Vec::new();
        let mut wildcard_seen = false;
        for segment in self.pattern.split('/').skip(1) {
            let is_param = segment.starts_with(':') || segment.starts_with('*');
            // A trailing `*` only marks a wildcard on a parameter segment
            // (`*name` or `:name*`); a bare `a*` stays the literal `a*`.
            let is_wildcard = is_param && (segment.starts_with('*') || segment.ends_with('*'));
            let name: Arc<str> = if is_param {
                segment
                    .trim_start_matches([':', '*'])
                    .trim_end_matches('*')
                    .into()
            } else {
                segment.into()
            };

            if is_wildcard {
                if wildcard_seen {
                    return Err(RouteError::MultipleWildcards {
                        pattern: self.pattern.clone(),
                    });
                }
                wildcard_seen = true;
            }
            if is_param {
                let duplicate = fragments
                    .iter()
                    .any(|f: &Fragment| f.is_param && f.name == name);
                if duplicate {
                    return Err(RouteError::DuplicateParam {
                        pattern: self.pattern.clone(),
                        param: name.to_string(),
                    });
                }
                self.params_count += 1;
            }
            fragments.push(Fragment {
                is_param,
                is_wildcard,
                name,
            });
        }
        self.fragments = fragments;
        Ok(())
    }

    /// Match a request path against this route, extracting named parameters.
    ///
    /// Cheapest check first: static routes compare the whole string. Routes
    /// with captures walk the path segment by segment.
    pub(crate) fn matches(&self, path: &str) -> Option<ParamVec> {
        if !self.trailing_slash && path.len() > 1 && path.ends_with('/') {
            return None;
        }

        if self.fragments.is_empty() {
            let exact = self.pattern == path;
            let with_slash = self.trailing_slash
                && path.len() == self.pattern.len() + 1
                && path.ends_with('/')
                && path.starts_with(self.pattern.as_str());
            return (exact || with_slash).then(ParamVec::new);
        }

        self.match_segments(path)
    }

    /// Position-by-position segment walk.
    ///
    /// A wildcard consumes segments greedily, but when the next literal
    /// pattern segment reappears in the path the wildcard gives back its last
    /// captured segment and matching resumes after the literal. This is what
    /// makes a pattern like `/files/*path/download` work.
    fn match_segments(&self, path: &str) -> Option<ParamVec> {
        let mut params = ParamVec::new();
        let last_idx = self.fragments.len() - 1;
        let mut frag_idx = 0usize;
        let mut capture: Vec<&str> = Vec::new();

        for segment in path.split('/').skip(1) {
            // An empty segment is the trailing slash, end of the path.
            if segment.is_empty() {
                break;
            }
            if frag_idx > last_idx {
                return None;
            }

            let fragment = &self.fragments[frag_idx];
            if !fragment.is_param && fragment.name.as_ref() != segment {
                return None;
            }

            capture.push(segment);
            if fragment.is_param {
                set_param(&mut params, &fragment.name, capture.join("/"));
            }

            if !fragment.is_wildcard {
                capture.clear();
                frag_idx += 1;
                continue;
            }

            let next_idx = frag_idx + 1;
            if next_idx > last_idx {
                continue;
            }
            let next = &self.fragments[next_idx];
            // The fragment immediately after a wildcard is always a literal
            // (validated at registration via the single-wildcard rule).
            if !next.is_param && next.name.as_ref() == segment {
                // The segment belongs to the static part of the URI, give it
                // back from the wildcard capture.
                set_param(
                    &mut params,
                    &fragment.name,
                    capture[..capture.len() - 1].join("/"),
                );
                capture.clear();
                frag_idx += 2;
            }
        }

        // All pattern fragments must be consumed. A wildcard that captured at
        // least one segment never advances past itself, so allow that case.
        if frag_idx <= last_idx {
            let open_wildcard = frag_idx == last_idx
                && self.fragments[frag_idx].is_wildcard
                && !capture.is_empty();
            if !open_wildcard {
                return None;
            }
        }

        (params.len() == self.params_count).then_some(params)
    }

    /// Execute this route's handler chain (with any wrapped middleware).
    pub(crate) fn serve(&self, req: &HandlerRequest, rw: &mut ResponseWriter) {
        if let Some(serve) = &self.serve {
            serve(req, rw);
        }
    }

    /// Wrap the serve chain in a middleware layer. The layer added last runs
    /// outermost. Applied at startup only.
    pub(crate) fn wrap(&mut self, mw: Middleware) {
        if let Some(inner) = self.serve.take() {
            self.serve = Some(Arc::new(move |req, rw| mw(req, rw, &inner)));
        }
    }
}

// Handlers are opaque closures, so show the declarative fields only.
impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("trailing_slash", &self.trailing_slash)
            .field("fallthrough_post_response", &self.fallthrough_post_response)
            .finish_non_exhaustive()
    }
}

fn set_param(params: &mut ParamVec, name: &Arc<str>, value: String) {
    if let Some(entry) = params.iter_mut().find(|(k, _)| k == name) {
        entry.1 = value;
    } else {
        params.push((Arc::clone(name), value));
    }
}
