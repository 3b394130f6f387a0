use http::StatusCode;
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;

/// Fallback user-facing message when an error carries no message at all.
pub const DEFAULT_MESSAGE: &str = "unknown error occurred";

/// Semantic classification of an error.
///
/// The set is deliberately small, closed, and status-code-oriented rather than
/// domain-specific, so any domain error can be classified without this module
/// knowing the domain. Adding a variant means updating [`Kind::status_code`]
/// and the constructor catalogue on [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Internal system error, e.g. a database failure.
    Internal,
    /// Validation failed, e.g. an invalid email address.
    Validation,
    /// Malformed input payload, e.g. invalid JSON.
    InputBody,
    /// Duplicate content, e.g. unique constraint violation.
    Duplicate,
    /// Accessing an authenticated API without credentials.
    Unauthenticated,
    /// Credentials present but access not allowed.
    Unauthorized,
    /// An expected non-empty resource is empty.
    Empty,
    /// An expected resource was not found, e.g. unknown user ID.
    NotFound,
    /// The same action was attempted more times than allowed.
    MaximumAttempts,
    /// A paid account's subscription has lapsed.
    SubscriptionExpired,
    /// A request to a downstream dependency timed out.
    DownstreamDependencyTimedout,
}

impl Kind {
    /// Every kind, in declaration order. Useful for exhaustive assertions.
    pub const ALL: [Kind; 11] = [
        Kind::Internal,
        Kind::Validation,
        Kind::InputBody,
        Kind::Duplicate,
        Kind::Unauthenticated,
        Kind::Unauthorized,
        Kind::Empty,
        Kind::NotFound,
        Kind::MaximumAttempts,
        Kind::SubscriptionExpired,
        Kind::DownstreamDependencyTimedout,
    ];

    /// The HTTP response status code for this kind.
    #[must_use]
    pub fn status_code(self) -> StatusCode {
        match self {
            Kind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Kind::InputBody => StatusCode::BAD_REQUEST,
            Kind::Duplicate => StatusCode::CONFLICT,
            Kind::Unauthenticated => StatusCode::UNAUTHORIZED,
            Kind::Unauthorized => StatusCode::FORBIDDEN,
            Kind::Empty => StatusCode::GONE,
            Kind::NotFound => StatusCode::NOT_FOUND,
            Kind::MaximumAttempts => StatusCode::TOO_MANY_REQUESTS,
            Kind::SubscriptionExpired => StatusCode::PAYMENT_REQUIRED,
            Kind::Internal | Kind::DownstreamDependencyTimedout => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Internal => "internal",
            Kind::Validation => "validation",
            Kind::InputBody => "input body",
            Kind::Duplicate => "duplicate",
            Kind::Unauthenticated => "unauthenticated",
            Kind::Unauthorized => "unauthorized",
            Kind::Empty => "empty",
            Kind::NotFound => "not found",
            Kind::MaximumAttempts => "maximum attempts",
            Kind::SubscriptionExpired => "subscription expired",
            Kind::DownstreamDependencyTimedout => "downstream dependency timed out",
        };
        f.write_str(name)
    }
}

/// The cause of a classified error.
///
/// An error value either wraps another classified error (keeping the chain
/// inspectable without downcasting) or an opaque foreign error.
#[derive(Debug)]
enum Cause {
    Classified(Box<Error>),
    Opaque(Box<dyn StdError + Send + Sync>),
}

impl Cause {
    fn as_dyn(&self) -> &(dyn StdError + 'static) {
        match self {
            Cause::Classified(e) => e.as_ref(),
            Cause::Opaque(e) => &**e,
        }
    }
}

/// An error with a [`Kind`], a user-facing message, an optional cause, and
/// the call site it was constructed at.
///
/// Values are immutable after construction and safe to share across threads
/// or coroutines. The message is meant to be returned as an API response, so
/// it should be user friendly; call-site diagnostics stay in server logs.
#[derive(Debug)]
pub struct Error {
    cause: Option<Cause>,
    message: String,
    kind: Kind,
    location: &'static Location<'static>,
}

impl Error {
    /// New causeless error with an explicit kind.
    #[track_caller]
    #[must_use]
    pub fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            cause: None,
            message: message.into(),
            kind,
            location: Location::caller(),
        }
    }

    /// Wrap an error with an additional message.
    ///
    /// If `cause` is itself a classified [`Error`], the new error inherits its
    /// kind; otherwise the kind is [`Kind::Internal`]. Use a [`Classifier`] to
    /// change the default applied to opaque causes.
    #[track_caller]
    #[must_use]
    pub fn wrap<E>(cause: E, message: impl Into<String>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::wrap_with_default(cause, message, Kind::Internal)
    }

    /// Wrap an error, forcing the kind regardless of the cause's own kind.
    #[track_caller]
    #[must_use]
    pub fn wrap_as<E>(cause: E, kind: Kind, message: impl Into<String>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            cause: Some(Self::into_cause(cause)),
            message: message.into(),
            kind,
            location: Location::caller(),
        }
    }

    #[track_caller]
    fn wrap_with_default<E>(cause: E, message: impl Into<String>, default_kind: Kind) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let cause = Self::into_cause(cause);
        let kind = match &cause {
            Cause::Classified(e) => e.kind,
            Cause::Opaque(_) => default_kind,
        };
        Self {
            cause: Some(cause),
            message: message.into(),
            kind,
            location: Location::caller(),
        }
    }

    fn into_cause<E>(cause: E) -> Cause
    where
        E: StdError + Send + Sync + 'static,
    {
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(cause);
        match boxed.downcast::<Error>() {
            Ok(classified) => Cause::Classified(classified),
            Err(opaque) => Cause::Opaque(opaque),
        }
    }

    /// The semantic classification of this error.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The HTTP response status code for this error's kind.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.kind.status_code()
    }

    /// The call site this error was constructed at.
    #[must_use]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Recursively concatenates the messages of this error and every
    /// classified error in its cause chain, outer to inner, joined by `": "`.
    /// Empty messages are skipped; opaque causes are ignored. Falls back to
    /// the full [`Display`](fmt::Display) output when no message is set
    /// anywhere in the chain.
    #[must_use]
    pub fn user_message(&self) -> String {
        let mut messages: Vec<&str> = Vec::new();
        let mut current = Some(self);
        while let Some(err) = current {
            if !err.message.is_empty() {
                messages.push(&err.message);
            }
            current = match &err.cause {
                Some(Cause::Classified(e)) => Some(e),
                _ => None,
            };
        }

        if messages.is_empty() {
            return self.to_string();
        }
        messages.join(": ")
    }

    /// Diagnostic trace of the cause chain, outer to inner: one
    /// `file:line: message` entry per classified error, the `Display` output
    /// for an opaque terminal. For server-side logs only.
    #[must_use]
    pub fn trace(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = self;
        loop {
            lines.push(format!(
                "{}:{}: {}",
                current.location.file(),
                current.location.line(),
                current.message
            ));
            match &current.cause {
                Some(Cause::Classified(e)) => current = e,
                Some(Cause::Opaque(e)) => {
                    lines.push(e.to_string());
                    break;
                }
                None => break,
            }
        }
        lines
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.location.file(), self.location.line())?;
        match (&self.cause, self.message.is_empty()) {
            (Some(cause), false) => write!(f, ": {}\n{}", self.message, DisplayCause(cause)),
            (Some(cause), true) => write!(f, "\n{}", DisplayCause(cause)),
            (None, false) => write!(f, ": {}", self.message),
            (None, true) => write!(f, ": {DEFAULT_MESSAGE}"),
        }
    }
}

struct DisplayCause<'a>(&'a Cause);

impl fmt::Display for DisplayCause<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Cause::Classified(e) => fmt::Display::fmt(e, f),
            Cause::Opaque(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(Cause::as_dyn)
    }
}

macro_rules! kind_constructors {
    ($(($name:ident, $with_cause:ident, $kind:ident, $doc:literal)),* $(,)?) => {
        impl Error {
            $(
                #[doc = concat!("New causeless `", $doc, "` error.")]
                #[track_caller]
                #[must_use]
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(Kind::$kind, message)
                }

                #[doc = concat!("New `", $doc, "` error wrapping a cause.")]
                #[track_caller]
                #[must_use]
                pub fn $with_cause<E>(cause: E, message: impl Into<String>) -> Self
                where
                    E: StdError + Send + Sync + 'static,
                {
                    Self::wrap_as(cause, Kind::$kind, message)
                }
            )*
        }
    };
}

kind_constructors!(
    (internal, internal_err, Internal, "internal"),
    (validation, validation_err, Validation, "validation"),
    (input_body, input_body_err, InputBody, "input body"),
    (duplicate, duplicate_err, Duplicate, "duplicate"),
    (
        unauthenticated,
        unauthenticated_err,
        Unauthenticated,
        "unauthenticated"
    ),
    (unauthorized, unauthorized_err, Unauthorized, "unauthorized"),
    (empty, empty_err, Empty, "empty"),
    (not_found, not_found_err, NotFound, "not found"),
    (
        maximum_attempts,
        maximum_attempts_err,
        MaximumAttempts,
        "maximum attempts"
    ),
    (
        subscription_expired,
        subscription_expired_err,
        SubscriptionExpired,
        "subscription expired"
    ),
    (
        downstream_timed_out,
        downstream_timed_out_err,
        DownstreamDependencyTimedout,
        "downstream dependency timed out"
    ),
);

/// Explicit default-kind configuration, set once at startup and passed to the
/// layers that wrap foreign errors.
///
/// When wrapping an opaque (non-classified) cause, the classifier's default
/// kind is applied instead of [`Kind::Internal`]. Classified causes always
/// keep their own kind.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    default_kind: Kind,
}

impl Classifier {
    #[must_use]
    pub const fn new(default_kind: Kind) -> Self {
        Self { default_kind }
    }

    /// New causeless error with the configured default kind.
    #[track_caller]
    #[must_use]
    pub fn classify(&self, message: impl Into<String>) -> Error {
        Error::new(self.default_kind, message)
    }

    /// Wrap an error; opaque causes receive the configured default kind,
    /// classified causes keep their own.
    #[track_caller]
    #[must_use]
    pub fn wrap<E>(&self, cause: E, message: impl Into<String>) -> Error
    where
        E: StdError + Send + Sync + 'static,
    {
        Error::wrap_with_default(cause, message, self.default_kind)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Kind::Internal)
    }
}

/// The classified error at the head of `err`, if any.
#[must_use]
pub fn kind_of(err: &(dyn StdError + 'static)) -> Option<Kind> {
    err.downcast_ref::<Error>().map(Error::kind)
}

/// HTTP status code for any error. The boolean is `true` when the error is a
/// classified [`Error`]; otherwise the code is 500 and callers should treat
/// the error as internal.
#[must_use]
pub fn http_status_code(err: &(dyn StdError + 'static)) -> (StatusCode, bool) {
    match err.downcast_ref::<Error>() {
        Some(e) => (e.status(), true),
        None => (StatusCode::INTERNAL_SERVER_ERROR, false),
    }
}

/// HTTP status code plus user-facing message in one call, for the transport
/// boundary. Non-classified errors yield 500 and their raw `Display` output.
#[must_use]
pub fn http_status_message(err: &(dyn StdError + 'static)) -> (StatusCode, String, bool) {
    match err.downcast_ref::<Error>() {
        Some(e) => (e.status(), e.user_message(), true),
        None => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), false),
    }
}

/// The recursively concatenated user-facing message. The boolean is `true`
/// when the error is a classified [`Error`]; otherwise the raw `Display`
/// output is returned.
#[must_use]
pub fn message(err: &(dyn StdError + 'static)) -> (String, bool) {
    match err.downcast_ref::<Error>() {
        Some(e) => (e.user_message(), true),
        None => (err.to_string(), false),
    }
}

/// Whether `kind` appears anywhere in the error's cause chain.
///
/// Walks `source()` links until a causeless terminal, so it also sees
/// classified errors buried under foreign wrappers.
#[must_use]
pub fn has_kind(err: &(dyn StdError + 'static), kind: Kind) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(classified) = e.downcast_ref::<Error>() {
            if classified.kind == kind {
                return true;
            }
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn opaque_cause_defaults_to_internal() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "db down");
        let err = Error::wrap(io_err, "loading user");
        assert_eq!(err.kind(), Kind::Internal);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn trace_includes_opaque_terminal() {
        let io_err = io::Error::other("socket closed");
        let err = Error::wrap(io_err, "outer");
        let trace = err.trace();
        assert_eq!(trace.len(), 2);
        assert!(trace[0].contains("core.rs"));
        assert!(trace[0].ends_with(": outer"));
        assert_eq!(trace[1], "socket closed");
    }

    #[test]
    fn display_without_message_uses_default() {
        let err = Error::new(Kind::Internal, "");
        assert!(err.to_string().ends_with(DEFAULT_MESSAGE));
    }
}
