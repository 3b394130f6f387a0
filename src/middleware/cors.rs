use http::{Method, StatusCode};

use super::{middleware, Middleware};

const DEFAULT_ALLOW_METHODS: &str = "HEAD,GET,POST,PUT,PATCH,DELETE,OPTIONS";
const DEFAULT_ALLOW_HEADERS: &str = "Accept,Content-Type,Content-Length,Authorization";

/// Cross-origin resource sharing configuration.
///
/// Decorates every response with the CORS headers and answers `OPTIONS`
/// preflight requests with 200 without invoking the route's handlers.
#[derive(Debug, Clone)]
pub struct Cors {
    allowed_origins: Vec<String>,
    allowed_methods: String,
    allowed_headers: String,
}

impl Default for Cors {
    /// Allows every origin. Narrow with [`Cors::allow_origins`].
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: DEFAULT_ALLOW_METHODS.to_string(),
            allowed_headers: DEFAULT_ALLOW_HEADERS.to_string(),
        }
    }
}

impl Cors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn allow_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn allow_methods(mut self, methods: impl Into<String>) -> Self {
        self.allowed_methods = methods.into();
        self
    }

    #[must_use]
    pub fn allow_headers(mut self, headers: impl Into<String>) -> Self {
        self.allowed_headers = headers.into();
        self
    }

    /// The origin value to echo back for this request, if the request origin
    /// is allowed.
    fn origin_for(&self, request_origin: Option<&str>) -> Option<String> {
        if self.allowed_origins.iter().any(|o| o == "*") {
            return Some("*".to_string());
        }
        let origin = request_origin?;
        self.allowed_origins
            .iter()
            .find(|o| o.as_str() == origin)
            .cloned()
    }

    /// Build the middleware layer for this configuration.
    #[must_use]
    pub fn into_middleware(self) -> Middleware {
        middleware(move |req, rw, next| {
            if let Some(origin) = self.origin_for(req.get_header("origin")) {
                rw.header("Access-Control-Allow-Origin", origin);
                rw.header("Access-Control-Allow-Methods", self.allowed_methods.clone());
                rw.header("Access-Control-Allow-Headers", self.allowed_headers.clone());
            }

            if req.method == Method::OPTIONS {
                rw.write_header(StatusCode::OK);
                rw.write(b"");
                return;
            }

            next(req, rw);
        })
    }
}
