// LogPanel - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
// These types are the shared vocabulary across all layers.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Tab (state-machine state)
// =============================================================================

/// The three tabs a viewer can show. One tab is always active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Core,
    Supervisor,
    Addon,
}

impl Tab {
    /// Returns all tabs in display order.
    pub fn all() -> &'static [Tab] {
        &[Tab::Core, Tab::Supervisor, Tab::Addon]
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Core => "Core",
            Tab::Supervisor => "Supervisor",
            Tab::Addon => "Add-on",
        }
    }

    /// Whether the tab is only reachable with the supervisor integration.
    pub fn requires_supervisor(&self) -> bool {
        !matches!(self, Tab::Core)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Source (cache key)
// =============================================================================

/// A concrete log origin. `Addon` always carries its slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    Core,
    Supervisor,
    Addon(String),
}

impl Source {
    /// The tab that displays this source.
    pub fn tab(&self) -> Tab {
        match self {
            Source::Core => Tab::Core,
            Source::Supervisor => Tab::Supervisor,
            Source::Addon(_) => Tab::Addon,
        }
    }

    /// Supervisor and add-on logs carry terminal escape sequences; the core
    /// log does not.
    pub fn needs_sanitizing(&self) -> bool {
        !matches!(self, Source::Core)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Core => f.write_str("core"),
            Source::Supervisor => f.write_str("supervisor"),
            Source::Addon(slug) => write!(f, "addon:{slug}"),
        }
    }
}

/// Error returned when a source string is not `core`, `supervisor` or
/// `addon:<slug>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSourceError(pub String);

impl fmt::Display for ParseSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown source '{}': expected core, supervisor or addon:<slug>",
            self.0
        )
    }
}

impl std::error::Error for ParseSourceError {}

impl FromStr for Source {
    type Err = ParseSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "core" => return Ok(Source::Core),
            "supervisor" => return Ok(Source::Supervisor),
            _ => {}
        }
        // Slugs are opaque, so only the prefix is matched case-insensitively.
        match trimmed.split_once(':') {
            Some((prefix, slug)) if prefix.eq_ignore_ascii_case("addon") && !slug.is_empty() => {
                Ok(Source::Addon(slug.to_string()))
            }
            _ => Err(ParseSourceError(s.to_string())),
        }
    }
}

// =============================================================================
// Add-on descriptor
// =============================================================================

/// One add-on as reported by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddonDescriptor {
    /// Opaque identifier, unique among installed add-ons.
    pub slug: String,

    /// Display name.
    pub name: String,

    /// Only installed add-ons are offered to the user.
    #[serde(default)]
    pub installed: bool,
}

impl AddonDescriptor {
    /// Convenience constructor.
    pub fn new(slug: impl Into<String>, name: impl Into<String>, installed: bool) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            installed,
        }
    }
}
