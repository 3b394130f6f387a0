//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the coroutine runtime and
//! the HTTP listener.
//!
//! ## Environment Variables
//!
//! ### `WAYPOINT_STACK_SIZE`
//!
//! Stack size for coroutine handlers, in bytes. Accepts decimal (`16384`)
//! or hexadecimal (`0x4000`). Default: `0x4000` (16 KB).
//!
//! Total memory is roughly `stack_size × concurrent_coroutines`, so tune to
//! handler depth: too small overflows, too large wastes memory.
//!
//! ### `WAYPOINT_ADDR`
//!
//! Address the server binds to. Default: `127.0.0.1:8080`.
//!
//! ## Usage
//!
//! ```rust
//! use waypoint::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! config.apply();
//! println!("listening on {}", config.addr);
//! ```

use std::env;

const DEFAULT_STACK_SIZE: usize = 0x4000;
const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Runtime configuration loaded from environment variables.
///
/// Load this at startup with [`RuntimeConfig::from_env()`] and install it
/// with [`RuntimeConfig::apply()`] before starting the server.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes (default: 16 KB / 0x4000)
    pub stack_size: usize,
    /// Listen address for the HTTP server (default: 127.0.0.1:8080)
    pub addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            stack_size: DEFAULT_STACK_SIZE,
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables. Unset or unparseable
    /// values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = match env::var("WAYPOINT_STACK_SIZE") {
            Ok(val) => parse_stack_size(&val).unwrap_or(DEFAULT_STACK_SIZE),
            Err(_) => DEFAULT_STACK_SIZE,
        };
        let addr = env::var("WAYPOINT_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        RuntimeConfig { stack_size, addr }
    }

    /// Install the coroutine stack size into the `may` runtime. Call once,
    /// before the server starts.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

fn parse_stack_size(val: &str) -> Option<usize> {
    match val.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}
