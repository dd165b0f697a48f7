// LogPanel - app/registry.rs
//
// Enumerates log sources: the fixed core/supervisor pair plus the installed
// add-ons reported by the supervisor. Holds no state beyond its collaborators.

use crate::app::transport::Transport;
use crate::core::model::AddonDescriptor;
use crate::util::constants;
use crate::util::error::FetchError;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

// =============================================================================
// Host capabilities
// =============================================================================

/// What the host reports about optional integrations.
pub trait HostCapabilities: Send + Sync {
    /// True when the supervisor integration is present. Without it only the
    /// core log is reachable.
    fn has_supervisor(&self) -> bool;
}

/// Fixed capability, for hosts whose setup is known up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticCapabilities(pub bool);

impl HostCapabilities for StaticCapabilities {
    fn has_supervisor(&self) -> bool {
        self.0
    }
}

/// The host's list of loaded integrations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostComponents {
    components: HashSet<String>,
}

impl HostComponents {
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether an integration is loaded.
    pub fn contains(&self, component: &str) -> bool {
        self.components.contains(component)
    }

    /// Number of loaded integrations.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl HostCapabilities for HostComponents {
    fn has_supervisor(&self) -> bool {
        self.contains(constants::SUPERVISOR_COMPONENT)
    }
}

#[derive(Deserialize)]
struct HostConfigBody {
    #[serde(default)]
    components: Vec<String>,
}

/// Read the host's integration list from its `config` endpoint.
pub async fn discover_capabilities(transport: &dyn Transport) -> Result<HostComponents, FetchError> {
    let path = constants::ENDPOINT_HOST_CONFIG;
    let body = transport.get_json(path).await?;
    let parsed: HostConfigBody =
        serde_json::from_value(body).map_err(|e| FetchError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    let components = HostComponents::new(parsed.components);
    tracing::debug!(
        components = components.len(),
        supervisor = components.has_supervisor(),
        "Host capabilities discovered"
    );
    Ok(components)
}

// =============================================================================
// Add-on list decoding
// =============================================================================

/// Shapes the add-on list arrives in, depending on which API layer answers.
#[derive(Deserialize)]
#[serde(untagged)]
enum AddonListBody {
    Bare(Vec<AddonDescriptor>),
    Wrapped { addons: Vec<AddonDescriptor> },
    Envelope { data: AddonsField },
}

#[derive(Deserialize)]
struct AddonsField {
    addons: Vec<AddonDescriptor>,
}

/// Decode an add-on list response body.
pub fn parse_addon_list(body: serde_json::Value) -> Result<Vec<AddonDescriptor>, String> {
    match serde_json::from_value::<AddonListBody>(body) {
        Ok(AddonListBody::Bare(list)) | Ok(AddonListBody::Wrapped { addons: list }) => Ok(list),
        Ok(AddonListBody::Envelope { data }) => Ok(data.addons),
        Err(e) => Err(e.to_string()),
    }
}

/// Keep only installed add-ons, preserving order.
pub fn installed_only(descriptors: Vec<AddonDescriptor>) -> Vec<AddonDescriptor> {
    descriptors.into_iter().filter(|d| d.installed).collect()
}

// =============================================================================
// Registry
// =============================================================================

/// Forwards source enumeration to the host.
#[derive(Clone)]
pub struct SourceRegistry {
    transport: Arc<dyn Transport>,
    capabilities: Arc<dyn HostCapabilities>,
}

impl SourceRegistry {
    pub fn new(transport: Arc<dyn Transport>, capabilities: Arc<dyn HostCapabilities>) -> Self {
        Self {
            transport,
            capabilities,
        }
    }

    /// Whether supervisor and add-on sources are reachable. Never fails.
    pub fn has_supervisor_capability(&self) -> bool {
        self.capabilities.has_supervisor()
    }

    /// Installed add-ons, in the order the host reports them.
    pub async fn list_addons(&self) -> Result<Vec<AddonDescriptor>, FetchError> {
        let path = constants::ENDPOINT_ADDON_LIST;
        let body = self.transport.get_json(path).await?;
        let all = parse_addon_list(body).map_err(|reason| FetchError::Decode {
            path: path.to_string(),
            reason,
        })?;
        let total = all.len();
        let installed = installed_only(all);
        tracing::debug!(total, installed = installed.len(), "Add-on list loaded");
        Ok(installed)
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("supervisor", &self.has_supervisor_capability())
            .finish_non_exhaustive()
    }
}
