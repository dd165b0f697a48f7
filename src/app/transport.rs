// LogPanel - app/transport.rs
//
// The seam between the controller and whatever talks to the host.
// Paths are relative to the host API root (see util::constants ENDPOINT_*).

use crate::util::error::FetchError;
use async_trait::async_trait;

/// Retrieval from the host API.
///
/// Implementations are expected to fail transiently (network, auth). They
/// must not retry on their own; the controller surfaces failures to the
/// caller, who decides whether to reload.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` and return the body as text.
    async fn get_text(&self, path: &str) -> Result<String, FetchError>;

    /// GET `path` and return the body parsed as JSON.
    async fn get_json(&self, path: &str) -> Result<serde_json::Value, FetchError>;
}
