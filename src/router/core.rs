use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::route::{Route, RouteError};
use crate::middleware::Middleware;

/// Maximum number of path parameters before heap allocation.
/// Most REST routes have well under 8 captures, so matching stays
/// allocation-free in the common case.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the matching hot path.
///
/// Param names are `Arc<str>` because they come from the static route table
/// (known at startup); cloning one is an atomic increment, not a string copy.
/// Values are per-request data from the URL and stay `String`.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// The fixed set of HTTP methods routes may be registered for. Matching any
/// other method short-circuits to [`Lookup::NotImplemented`].
pub const SUPPORTED_METHODS: [Method; 7] = [
    Method::OPTIONS,
    Method::HEAD,
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Result of successfully matching a request path to a route.
#[derive(Debug)]
pub struct RouteMatch<'r> {
    /// The matched route. First registered match wins.
    pub route: &'r Route,
    /// Parameters extracted from the path, one entry per capture declared in
    /// the pattern. Empty for static routes.
    pub params: ParamVec,
}

impl RouteMatch<'_> {
    /// Get an extracted path parameter by name.
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
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

/// Per-request routing outcome. Misses are normal values, never errors.
#[derive(Debug)]
pub enum Lookup<'r> {
    Matched(RouteMatch<'r>),
    /// Known method, no route matched the path. Maps to 404.
    NotFound,
    /// Method outside the fixed supported set. Maps to 501.
    NotImplemented,
}

/// The route table: routes grouped per HTTP method, in registration order.
///
/// Built once at startup, immutable afterwards, and safe for unsynchronized
/// concurrent reads from any number of coroutines. Within one method, if two
/// patterns could both match the same path, the earlier-registered route wins;
/// overlaps are reported at registration so operators can fix ambiguous
/// configurations.
#[derive(Default)]
pub struct Router {
    tables: HashMap<Method, Vec<Route>>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a router from a static list of route declarations.
    pub fn with_routes(routes: Vec<Route>) -> Result<Self, RouteError> {
        let mut router = Self::new();
        for route in routes {
            router.add(route)?;
        }
        info!(routes_count = router.len(), "routing table loaded");
        Ok(router)
    }

    /// Register a route. Startup-time only.
    ///
    /// # Errors
    ///
    /// Misconfiguration (unsupported method, empty handler list, duplicate
    /// parameter name, multiple wildcards) is fatal and must stop startup.
    pub fn add(&mut self, mut route: Route) -> Result<(), RouteError> {
        if !SUPPORTED_METHODS.contains(&route.method) {
            return Err(RouteError::UnsupportedMethod {
                name: route.name.clone(),
                method: route.method.clone(),
            });
        }
        route.init()?;
        self.check_duplicates(&route);

        debug!(
            name = %route.name,
            method = %route.method,
            pattern = %route.pattern,
            "route registered"
        );
        self.tables
            .entry(route.method.clone())
            .or_default()
            .push(route);
        Ok(())
    }

    /// Reports duplicate names and structurally overlapping patterns.
    /// Intentionally not fatal: first match wins, but operators should know.
    fn check_duplicates(&self, route: &Route) {
        for earlier in self.tables.values().flatten() {
            if earlier.name == route.name {
                warn!(name = %route.name, "duplicate route name detected");
            }
        }
        let Some(same_method) = self.tables.get(&route.method) else {
            return;
        };
        for earlier in same_method {
            if earlier.matches(&route.pattern).is_some() {
                warn!(
                    pattern = %earlier.pattern,
                    duplicate = %route.pattern,
                    method = %route.method,
                    "overlapping URI patterns, only the first registered route will handle requests"
                );
            }
        }
    }

    /// Match an inbound request to a route, in registration order.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_> {
        if !SUPPORTED_METHODS.contains(method) {
            debug!(method = %method, path = %path, "method not implemented");
            return Lookup::NotImplemented;
        }

        if let Some(routes) = self.tables.get(method) {
            for route in routes {
                if let Some(params) = route.matches(path) {
                    debug!(
                        method = %method,
                        path = %path,
                        route = %route.name,
                        pattern = %route.pattern,
                        "route matched"
                    );
                    return Lookup::Matched(RouteMatch { route, params });
                }
            }
        }

        debug!(method = %method, path = %path, "no route matched");
        Lookup::NotFound
    }

    /// Add a middleware layer to every registered route.
    ///
    /// Call after all routes are added and before serving begins; routes added
    /// later will not carry earlier middleware.
    pub fn use_middleware(&mut self, mw: Middleware) {
        for routes in self.tables.values_mut() {
            for route in routes {
                route.wrap(Arc::clone(&mw));
            }
        }
    }

    /// Total number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
