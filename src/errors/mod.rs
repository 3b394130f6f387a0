//! # Errors Module
//!
//! Classified errors: every error carries a semantic [`Kind`], a user-facing
//! message, an optional cause, and the call site it was constructed at.
//!
//! ## Overview
//!
//! Any layer of an application can attach a stable classification to an error
//! without the outer layers knowing which inner layer produced it:
//!
//! - Wrapping preserves the full cause chain; nothing is ever swallowed.
//! - A wrapped classified error keeps its kind, so low-level plumbing can add
//!   context without erasing domain intent.
//! - The transport boundary recovers a status code and a safe, user-facing
//!   message from any `&dyn std::error::Error` via [`http_status_message`].
//!
//! ## Example
//!
//! ```
//! use waypoint::errors::{self, Error, Kind};
//!
//! fn find_user() -> Result<(), Error> {
//!     Err(Error::not_found("user not found"))
//! }
//!
//! let err = Error::wrap(find_user().unwrap_err(), "fetching profile");
//! assert_eq!(err.kind(), Kind::NotFound);
//! assert_eq!(err.user_message(), "fetching profile: user not found");
//!
//! let (status, classified) = errors::http_status_code(&err);
//! assert_eq!(status.as_u16(), 404);
//! assert!(classified);
//! ```
//!
//! Diagnostic call-site data ([`Error::trace`]) is for server-side logs only
//! and must never be sent to clients; [`Error::user_message`] is the side that
//! is safe to return from an API.

mod core;

pub use core::{
    has_kind, http_status_code, http_status_message, kind_of, message, Classifier, Error, Kind,
    DEFAULT_MESSAGE,
};
