//! Environment variable names read by [`LoggerConfig::from_env`](crate::init::LoggerConfig::from_env).
//!
//! These are purely helpers; the logger itself never touches the
//! environment unless asked to.

/// Application name emitted as the `app` field.
pub const LOG_APP_NAME_ENV: &str = "LOG_APP_NAME";

/// Host name emitted as the `host` field. Falls back to `HOSTNAME`, then
/// `/etc/hostname`.
pub const LOG_HOST_NAME_ENV: &str = "LOG_HOST_NAME";

/// Conventional shell variable holding the machine's host name.
pub const HOSTNAME_ENV: &str = "HOSTNAME";

/// Output destination, e.g. `stdout`, `stderr` or `file:///var/log/app.log`.
pub const LOG_DESTINATION_ENV: &str = "LOG_DESTINATION";

/// `true`/`1`/`yes`/`on` enables DEBUG events.
pub const LOG_DEBUG_ENV: &str = "LOG_DEBUG";

/// Maximum number of queued lines before producers block.
pub const LOG_QUEUE_CAPACITY_ENV: &str = "LOG_QUEUE_CAPACITY";

/// Periodic flush interval of the writer, in milliseconds.
pub const LOG_FLUSH_INTERVAL_MS_ENV: &str = "LOG_FLUSH_INTERVAL_MS";

/// Read a non-empty environment variable.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Best-effort host name: `LOG_HOST_NAME`, then `HOSTNAME`, then the
/// contents of `/etc/hostname`.
pub fn detect_host_name() -> Option<String> {
    env_opt(LOG_HOST_NAME_ENV)
        .or_else(|| env_opt(HOSTNAME_ENV))
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Parse a boolean flag the way shells usually spell them.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
