//! Logging abstraction layer
//!
//! The router logs through these macros so the backend can be chosen at
//! compile time:
//!
//! - `log` (default) - Uses the standard `log` crate
//! - `tracing` - Uses the `tracing` crate
//!
//! The two features are mutually exclusive.
//!
//! # Usage
//!
//! ```ignore
//! use gpui_stack_router::{debug_log, info_log};
//!
//! debug_log!("resolving {}", url);
//! info_log!("navigation applied");
//! ```

use crate::location::Url;

/// Trace-level logging
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!($($arg)*);
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!($($arg)*);
    };
}

/// Info-level logging
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)*);
        #[cfg(feature = "log")]
        ::log::info!($($arg)*);
    };
}

/// Warn-level logging
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!($($arg)*);
    };
}

/// Error-level logging
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!($($arg)*);
        #[cfg(feature = "log")]
        ::log::error!($($arg)*);
    };
}

/// Status string reported for a resolution attempt.
pub(crate) fn resolution_status(matched: bool) -> &'static str {
    if matched {
        "200"
    } else {
        "404"
    }
}

/// Log one resolution attempt.
///
/// Matched URLs go to `info` with status `200`, everything else to `warn`
/// with status `404`. Called exactly once per request.
#[cfg_attr(
    not(any(feature = "log", feature = "tracing")),
    allow(unused_variables)
)]
pub(crate) fn log_resolution(url: &Url, matched: bool) {
    let status = resolution_status(matched);
    if matched {
        info_log!("path={} status={}", url, status);
    } else {
        warn_log!("path={} status={}", url, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_status() {
        assert_eq!(resolution_status(true), "200");
        assert_eq!(resolution_status(false), "404");
    }
}
