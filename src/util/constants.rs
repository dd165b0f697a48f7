// LogPanel - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogPanel";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogPanel";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Host API endpoints (relative to the API root)
// =============================================================================

/// Host core log (plain text).
pub const ENDPOINT_CORE_LOG: &str = "error_log";

/// Supervisor log (plain text, may carry escape sequences).
pub const ENDPOINT_SUPERVISOR_LOG: &str = "hassio/supervisor/logs";

/// Add-on list (JSON).
pub const ENDPOINT_ADDON_LIST: &str = "hassio/addons";

/// Host configuration (JSON, carries the `components` array).
pub const ENDPOINT_HOST_CONFIG: &str = "config";

/// Path segment appended to the host URL to reach the API root.
pub const API_ROOT_SEGMENT: &str = "api/";

/// Build the log endpoint for a single add-on.
pub fn addon_log_endpoint(slug: &str) -> String {
    format!("hassio/addons/{slug}/logs")
}

/// Integration name whose presence in the host component list means the
/// supervisor is available.
pub const SUPERVISOR_COMPONENT: &str = "hassio";

// =============================================================================
// Host connection defaults
// =============================================================================

/// Host URL used when neither config nor CLI provide one.
pub const DEFAULT_HOST_URL: &str = "http://localhost:8123";

/// Environment variable consulted for the API token when none is configured.
pub const TOKEN_ENV_VAR: &str = "LOGPANEL_TOKEN";

/// Default per-request timeout (seconds).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Minimum user-configurable request timeout (seconds).
pub const MIN_HTTP_TIMEOUT_SECS: u64 = 1;

/// Maximum user-configurable request timeout (seconds).
/// Supervisor log dumps for chatty add-ons can take a while to stream.
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// Watch mode
// =============================================================================

/// Minimum `--watch` reload interval (seconds).
pub const MIN_WATCH_INTERVAL_SECS: u64 = 2;

/// Maximum `--watch` reload interval (seconds).
pub const MAX_WATCH_INTERVAL_SECS: u64 = 3_600;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
