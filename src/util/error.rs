// LogPanel - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.
// Core model types (Source, Tab) appear in payloads; nothing from app/platform.

use crate::core::model::{Source, Tab};
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogPanel operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogPanelError {
    /// A retrieval from the host failed.
    Fetch(FetchError),

    /// A controller operation was rejected.
    Controller(ControllerError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogPanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {e}"),
            Self::Controller(e) => write!(f, "{e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogPanelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Controller(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

/// Errors raised by a transport while retrieving from the host.
///
/// Every variant is transient from the controller's point of view: the cache
/// keeps its previous value and the user may retry.
#[derive(Debug)]
pub enum FetchError {
    /// Connection, TLS or timeout failure.
    Network {
        path: String,
        source: reqwest::Error,
    },

    /// The host answered with a non-success status (401/403 for auth).
    Status { path: String, status: u16 },

    /// The response body could not be decoded into the expected shape.
    Decode { path: String, reason: String },

    /// The transport could not serve the request for another reason.
    Unavailable { path: String, reason: String },
}

impl FetchError {
    /// Endpoint path the failed request targeted.
    pub fn path(&self) -> &str {
        match self {
            Self::Network { path, .. }
            | Self::Status { path, .. }
            | Self::Decode { path, .. }
            | Self::Unavailable { path, .. } => path,
        }
    }

    /// True for 401/403 responses.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { path, source } => write!(f, "GET '{path}' failed: {source}"),
            Self::Status { path, status } if *status == 401 || *status == 403 => write!(
                f,
                "GET '{path}' was refused with HTTP {status}. Check the API token."
            ),
            Self::Status { path, status } => write!(f, "GET '{path}' returned HTTP {status}"),
            Self::Decode { path, reason } => {
                write!(f, "GET '{path}' returned an unexpected body: {reason}")
            }
            Self::Unavailable { path, reason } => write!(f, "GET '{path}' unavailable: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FetchError> for LogPanelError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

// ---------------------------------------------------------------------------
// Transition errors
// ---------------------------------------------------------------------------

/// A state-machine operation that is not valid in the current state.
/// Rejected transitions never change controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// `select_addon` was called while another tab is active.
    AddonTabInactive { current: Tab },

    /// The tab needs the supervisor integration, which the host lacks.
    CapabilityMissing { tab: Tab },

    /// An add-on slug must be non-empty.
    EmptySlug,

    /// The slug is not among the installed add-ons.
    UnknownAddon { slug: String },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddonTabInactive { current } => write!(
                f,
                "Cannot select an add-on while the {current} tab is active"
            ),
            Self::CapabilityMissing { tab } => write!(
                f,
                "The {tab} tab is unavailable: the host has no supervisor integration"
            ),
            Self::EmptySlug => write!(f, "Add-on slug must not be empty"),
            Self::UnknownAddon { slug } => {
                write!(f, "No installed add-on with slug '{slug}'")
            }
        }
    }
}

impl std::error::Error for TransitionError {}

// ---------------------------------------------------------------------------
// Controller errors
// ---------------------------------------------------------------------------

/// Errors surfaced by `SourceController` operations.
#[derive(Debug)]
pub enum ControllerError {
    /// Fetching a log source failed; the cached text (if any) is still shown.
    Fetch { source: Source, error: FetchError },

    /// Fetching the add-on list failed.
    AddonList(FetchError),

    /// The requested transition was rejected.
    Transition(TransitionError),
}

impl ControllerError {
    /// The underlying fetch failure, if this was one.
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            Self::Fetch { error, .. } | Self::AddonList(error) => Some(error),
            Self::Transition(_) => None,
        }
    }
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { source, error } => write!(f, "Could not load {source} log: {error}"),
            Self::AddonList(error) => write!(f, "Could not load add-on list: {error}"),
            Self::Transition(e) => write!(f, "Rejected: {e}"),
        }
    }
}

impl std::error::Error for ControllerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch { error, .. } | Self::AddonList(error) => Some(error),
            Self::Transition(e) => Some(e),
        }
    }
}

impl From<TransitionError> for ControllerError {
    fn from(e: TransitionError) -> Self {
        Self::Transition(e)
    }
}

impl From<ControllerError> for LogPanelError {
    fn from(e: ControllerError) -> Self {
        Self::Controller(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// The host URL could not be parsed.
    InvalidUrl { url: String, reason: String },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::InvalidUrl { url, reason } => write!(f, "Host URL '{url}' is invalid: {reason}"),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogPanelError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogPanel results.
pub type Result<T> = std::result::Result<T, LogPanelError>;
