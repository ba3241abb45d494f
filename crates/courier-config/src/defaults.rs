use crate::logging::LogFormat;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Host used when an extension or destination does not name one.
pub const DEFAULT_CONNECT_HOST: &str = "localhost";

/// Host placeholder meaning "every interface" in bind addresses.
pub const WILDCARD_HOST: &str = "*";

/// Service identity used when neither a topology file nor a URL is supplied.
pub const DEFAULT_SERVICE_URL: &str = "courier";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Owned connect host, for serde defaults.
#[must_use]
pub fn default_connect_host() -> String {
    DEFAULT_CONNECT_HOST.to_owned()
}
