//! Call-site capturing log macros.
//!
//! Every macro takes the logger first, then a format string with its
//! arguments, then optionally `;` and `key = value` attribute pairs:
//!
//! ```ignore
//! info!(logger, "listening on {}", addr; port = 8080, tls = true);
//! critical!(logger, "disk full"; mount = "/var");
//! ```
//!
//! The call site (enclosing function, file, line) is captured where the
//! macro is written, so helpers and wrappers never shift attribution.
//!
//! Inside an `async fn` the enclosing function shows as `<fn>.closure`,
//! because that is how the compiler names async bodies. Put `fn = "name"`
//! first in the attribute list to name the function explicitly:
//!
//! ```ignore
//! async fn handle_order(logger: &Logger) {
//!     info!(logger, "order accepted"; fn = "handle_order", order_id = 17);
//! }
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __log_attributes {
    ($($key:ident = $value:expr),*) => {{
        #[allow(unused_mut)]
        let mut attributes = $crate::value::Attributes::new();
        $( attributes.insert(stringify!($key), $value); )*
        attributes
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_emit {
    ($logger:expr, $level:expr, $callsite:expr, $message:expr, $attributes:expr) => {{
        let logger = &$logger;
        let level = $level;
        if logger.enabled(level) {
            logger.emit($callsite, level, &$message, $attributes);
        }
    }};
}

/// Emit an event at an explicit [`Level`](crate::level::Level).
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* ; fn = $name:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::__log_emit!(
            $logger,
            $level,
            $crate::callsite!(fn = $name),
            format!($fmt $(, $arg)*),
            $crate::__log_attributes!($($key = $value),*)
        )
    };
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(; $($key:ident = $value:expr),+ $(,)?)?) => {
        $crate::__log_emit!(
            $logger,
            $level,
            $crate::callsite!(),
            format!($fmt $(, $arg)*),
            $crate::__log_attributes!($($($key = $value),+)?)
        )
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::level::Level::Debug, $($rest)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::level::Level::Info, $($rest)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::level::Level::Warn, $($rest)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::level::Level::Error, $($rest)+)
    };
}

#[macro_export]
macro_rules! critical {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::level::Level::Critical, $($rest)+)
    };
}

/// Emit a FATAL event, drain the logger and exit the process with status 1.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $fmt:literal $(, $arg:expr)* ; fn = $name:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $logger.fatal(
            $crate::callsite!(fn = $name),
            &format!($fmt $(, $arg)*),
            $crate::__log_attributes!($($key = $value),*),
        )
    };
    ($logger:expr, $fmt:literal $(, $arg:expr)* $(; $($key:ident = $value:expr),+ $(,)?)?) => {
        $logger.fatal(
            $crate::callsite!(),
            &format!($fmt $(, $arg)*),
            $crate::__log_attributes!($($($key = $value),+)?),
        )
    };
}
