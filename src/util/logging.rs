// LogPanel - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// Output: stderr only. stdout is reserved for the log text being viewed.
// Never logs tokens or log bodies at any level.

use tracing_subscriber::EnvFilter;

/// Pick the filter directive by priority:
/// RUST_LOG env var > CLI --debug flag > config level > default "info".
///
/// Returns `None` when RUST_LOG should be used as-is.
fn directive(rust_log_set: bool, debug_flag: bool, config_level: Option<&str>) -> Option<String> {
    if rust_log_set {
        None
    } else if debug_flag {
        Some("debug".to_string())
    } else if let Some(level) = config_level {
        Some(level.to_string())
    } else {
        Some(super::constants::DEFAULT_LOG_LEVEL.to_string())
    }
}

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the validated level from config.toml (if present).
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let filter = match directive(std::env::var("RUST_LOG").is_ok(), debug_flag, config_level) {
        None => EnvFilter::from_default_env(),
        Some(level) => EnvFilter::new(level),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        "Logging initialised"
    );
}
