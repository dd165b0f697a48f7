// LogPanel - platform/config.rs
//
// Platform config directory resolution and config.toml loading with
// startup validation. Invalid values warn and fall back to defaults; a
// broken config file never stops the viewer from starting.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::Source;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogPanel configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logpanel/ or %APPDATA%\LogPanel\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file still loads.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[host]` section.
    pub host: HostSection,
    /// `[viewer]` section.
    pub viewer: ViewerSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[host]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct HostSection {
    /// Host base URL, without the `/api` suffix.
    pub url: Option<String>,
    /// API token sent as a bearer header.
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// `"auto"`, `true` or `false`.
    pub supervisor: Option<RawSupervisor>,
}

/// `supervisor` accepts a boolean or the word `"auto"`.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum RawSupervisor {
    Flag(bool),
    Word(String),
}

/// `[viewer]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ViewerSection {
    /// `core`, `supervisor` or `addon:<slug>`.
    pub initial_source: Option<String>,
    /// Filter query applied at startup.
    pub filter: Option<String>,
    /// Forget the picked add-on when leaving the add-on tab.
    pub reset_addon_on_leave: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

// =============================================================================
// Validated configuration
// =============================================================================

/// How supervisor availability is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupervisorMode {
    /// Ask the host for its component list.
    #[default]
    Auto,
    /// Assume the supervisor integration is present.
    Present,
    /// Assume it is absent; only the core log is offered.
    Absent,
}

/// Validated application configuration derived from `config.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Host --
    pub host_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub supervisor: SupervisorMode,

    // -- Viewer --
    pub initial_source: Source,
    pub filter: String,
    pub reset_addon_on_leave: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host_url: constants::DEFAULT_HOST_URL.to_string(),
            token: None,
            timeout_secs: constants::DEFAULT_HTTP_TIMEOUT_SECS,
            supervisor: SupervisorMode::Auto,
            initial_source: Source::Core,
            filter: String::new(),
            reset_addon_on_leave: false,
            log_level: None,
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults plus a warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            let error = ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            };
            let msg = format!("{error}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let error = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source,
            };
            let msg = format!("{error}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);
    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }
    (config, warnings)
}

/// Validate each field against named constants, accumulating all problems.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Host: url --
    if let Some(url) = raw.host.url {
        match reqwest::Url::parse(url.trim()) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                config.host_url = url.trim().to_string();
            }
            Ok(parsed) => warnings.push(format!(
                "[host] url = \"{url}\" uses scheme '{}'; expected http or https. Using default ({}).",
                parsed.scheme(),
                constants::DEFAULT_HOST_URL,
            )),
            Err(e) => warnings.push(format!(
                "[host] url = \"{url}\" is not a valid URL ({e}). Using default ({}).",
                constants::DEFAULT_HOST_URL,
            )),
        }
    }

    // -- Host: token --
    if let Some(token) = raw.host.token {
        if !token.trim().is_empty() {
            config.token = Some(token.trim().to_string());
        }
    }

    // -- Host: timeout_secs --
    if let Some(secs) = raw.host.timeout_secs {
        if (constants::MIN_HTTP_TIMEOUT_SECS..=constants::MAX_HTTP_TIMEOUT_SECS).contains(&secs) {
            config.timeout_secs = secs;
        } else {
            let error = ConfigError::ValueOutOfRange {
                field: "host.timeout_secs".to_string(),
                value: secs.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_HTTP_TIMEOUT_SECS,
                    constants::MAX_HTTP_TIMEOUT_SECS
                ),
            };
            warnings.push(format!(
                "{error}. Using default ({}).",
                constants::DEFAULT_HTTP_TIMEOUT_SECS
            ));
        }
    }

    // -- Host: supervisor --
    match raw.host.supervisor {
        None => {}
        Some(RawSupervisor::Flag(true)) => config.supervisor = SupervisorMode::Present,
        Some(RawSupervisor::Flag(false)) => config.supervisor = SupervisorMode::Absent,
        Some(RawSupervisor::Word(word)) if word.eq_ignore_ascii_case("auto") => {
            config.supervisor = SupervisorMode::Auto;
        }
        Some(RawSupervisor::Word(word)) => warnings.push(format!(
            "[host] supervisor = \"{word}\" is not recognised. Expected \"auto\", true or false. Using default (auto).",
        )),
    }

    // -- Viewer: initial_source --
    if let Some(source) = raw.viewer.initial_source {
        match source.parse::<Source>() {
            Ok(parsed) => config.initial_source = parsed,
            Err(e) => warnings.push(format!("[viewer] initial_source: {e}. Using default (core).")),
        }
    }

    // -- Viewer: filter / reset_addon_on_leave --
    if let Some(filter) = raw.viewer.filter {
        config.filter = filter;
    }
    if let Some(reset) = raw.viewer.reset_addon_on_leave {
        config.reset_addon_on_leave = reset;
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: {}. Using default ({}).",
                constants::VALID_LOG_LEVELS.join(", "),
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    config
}

/// Pick the API token: explicit value first, then the config file, then
/// the `LOGPANEL_TOKEN` environment variable.
pub fn resolve_token(explicit: Option<String>, configured: Option<String>) -> Option<String> {
    explicit
        .or(configured)
        .or_else(|| std::env::var(constants::TOKEN_ENV_VAR).ok())
        .filter(|t| !t.trim().is_empty())
}
