// LogPanel - app/controller.rs
//
// The source state machine. Owns the active tab, the sticky add-on
// selection, the filter query and the log cache; drives every fetch through
// the injected transport and composes the display-ready text on read.
//
// Concurrency: every method takes `&self`. State and cache locks are held
// only for short synchronous sections, never across an await, so
// overlapping fetches for one source resolve last-writer-wins in completion
// order. Nothing is queued, cancelled or retried here.

use crate::app::cache::LogCache;
use crate::app::registry::{HostCapabilities, SourceRegistry};
use crate::app::transport::Transport;
use crate::core::filter::LineFilter;
use crate::core::model::{AddonDescriptor, Source, Tab};
use crate::core::sanitize::sanitize;
use crate::util::constants;
use crate::util::error::{ControllerError, TransitionError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Behaviour switches for a controller instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Forget the selected add-on when switching away from the add-on tab.
    /// Off by default: the selection is sticky across tab switches.
    pub reset_addon_on_leave: bool,

    /// Filter query in effect before the user types anything.
    pub initial_query: String,
}

/// Mutable view state. Guarded by one lock so tab and selection always
/// change together.
#[derive(Debug, Default)]
struct ViewState {
    tab: Tab,
    selected_addon: Option<String>,
    /// `None` until the add-on list has been loaded once.
    addons: Option<Vec<AddonDescriptor>>,
    filter: LineFilter,
}

impl ViewState {
    fn current_source(&self) -> Option<Source> {
        match self.tab {
            Tab::Core => Some(Source::Core),
            Tab::Supervisor => Some(Source::Supervisor),
            Tab::Addon => self.selected_addon.clone().map(Source::Addon),
        }
    }
}

/// Coordinates log sources for one viewer instance.
pub struct SourceController {
    transport: Arc<dyn Transport>,
    registry: SourceRegistry,
    options: ControllerOptions,
    cache: LogCache,
    state: RwLock<ViewState>,
    started: AtomicBool,
}

impl SourceController {
    /// Create a controller on the `Core` tab. Call [`start`](Self::start)
    /// before handing it to a view so the first fetch happens.
    pub fn new(
        transport: Arc<dyn Transport>,
        capabilities: Arc<dyn HostCapabilities>,
        options: ControllerOptions,
    ) -> Self {
        let state = ViewState {
            filter: LineFilter::new(&options.initial_query),
            ..ViewState::default()
        };
        Self {
            registry: SourceRegistry::new(Arc::clone(&transport), capabilities),
            transport,
            options,
            cache: LogCache::new(),
            state: RwLock::new(state),
            started: AtomicBool::new(false),
        }
    }

    /// Perform the initial fetch of the core log. Only the first call
    /// fetches; later calls return `Ok(())` immediately.
    pub async fn start(&self) -> Result<(), ControllerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!("Controller starting");
        self.fetch_source(Source::Core).await.map(|_| ())
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn current_tab(&self) -> Tab {
        self.read_state().tab
    }

    /// The source shown by the active tab. `None` on the add-on tab while no
    /// add-on has been picked.
    pub fn current_source(&self) -> Option<Source> {
        self.read_state().current_source()
    }

    /// The remembered add-on slug, whichever tab is active.
    pub fn selected_addon(&self) -> Option<String> {
        self.read_state().selected_addon.clone()
    }

    pub fn has_supervisor_capability(&self) -> bool {
        self.registry.has_supervisor_capability()
    }

    /// Tabs the user can reach on this host.
    pub fn available_tabs(&self) -> Vec<Tab> {
        if self.has_supervisor_capability() {
            Tab::all().to_vec()
        } else {
            vec![Tab::Core]
        }
    }

    /// Installed add-ons from the last successful list fetch (empty before).
    pub fn addon_list(&self) -> Vec<AddonDescriptor> {
        self.read_state().addons.clone().unwrap_or_default()
    }

    /// Whether the add-on list has been loaded at least once.
    pub fn addons_loaded(&self) -> bool {
        self.read_state().addons.is_some()
    }

    pub fn filter_query(&self) -> String {
        self.read_state().filter.query().to_string()
    }

    /// Replace the filter query. Takes effect on the next read.
    pub fn set_filter_query(&self, query: &str) {
        self.write_state().filter = LineFilter::new(query);
    }

    /// Display-ready text for the active source: filtered, then stripped of
    /// escape sequences for supervisor and add-on logs. Empty when nothing
    /// has been fetched for the source yet.
    pub fn current_text(&self) -> String {
        let state = self.read_state();
        let Some(source) = state.current_source() else {
            return String::new();
        };
        let Some(raw) = self.cache.text(&source) else {
            return String::new();
        };
        let filtered = state.filter.apply(&raw);
        if source.needs_sanitizing() {
            sanitize(&filtered).into_owned()
        } else {
            filtered
        }
    }

    /// Cache sequence of the active source's entry. Changes whenever a fetch
    /// for that source lands.
    pub fn current_sequence(&self) -> Option<u64> {
        let source = self.current_source()?;
        self.cache.sequence(&source)
    }

    /// Read access to the underlying cache.
    pub fn cache(&self) -> &LogCache {
        &self.cache
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Switch tabs. `Core` and `Supervisor` fetch immediately; `Addon` only
    /// makes sure the add-on list is loaded so the user can pick one.
    pub async fn select_tab(&self, tab: Tab) -> Result<(), ControllerError> {
        if tab.requires_supervisor() && !self.has_supervisor_capability() {
            tracing::debug!(tab = %tab, "Tab rejected: no supervisor integration");
            return Err(TransitionError::CapabilityMissing { tab }.into());
        }

        let needs_addon_list = {
            let mut state = self.write_state();
            let previous = state.tab;
            if previous == Tab::Addon && tab != Tab::Addon && self.options.reset_addon_on_leave {
                state.selected_addon = None;
            }
            state.tab = tab;
            tracing::debug!(from = %previous, to = %tab, "Tab selected");
            state.addons.is_none()
        };

        match tab {
            Tab::Core => self.fetch_source(Source::Core).await.map(|_| ()),
            Tab::Supervisor => self.fetch_source(Source::Supervisor).await.map(|_| ()),
            Tab::Addon if needs_addon_list => self.load_addons().await,
            Tab::Addon => Ok(()),
        }
    }

    /// Pick an add-on on the add-on tab and fetch its log.
    pub async fn select_addon(&self, slug: &str) -> Result<(), ControllerError> {
        {
            let mut state = self.write_state();
            if state.tab != Tab::Addon {
                return Err(TransitionError::AddonTabInactive { current: state.tab }.into());
            }
            if slug.is_empty() {
                return Err(TransitionError::EmptySlug.into());
            }
            if let Some(addons) = &state.addons {
                if !addons.iter().any(|a| a.slug == slug) {
                    return Err(TransitionError::UnknownAddon {
                        slug: slug.to_string(),
                    }
                    .into());
                }
            }
            state.selected_addon = Some(slug.to_string());
        }
        tracing::debug!(slug, "Add-on selected");
        self.fetch_source(Source::Addon(slug.to_string()))
            .await
            .map(|_| ())
    }

    /// Refetch whatever the active tab shows. On the add-on tab with no
    /// add-on picked, this refetches the add-on list instead.
    pub async fn reload(&self) -> Result<(), ControllerError> {
        let (tab, source) = {
            let state = self.read_state();
            (state.tab, state.current_source())
        };
        tracing::debug!(tab = %tab, "Reload requested");
        match source {
            Some(source) => self.fetch_source(source).await.map(|_| ()),
            None => self.load_addons().await,
        }
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    /// Fetch one source and store the result. On failure the cache keeps
    /// whatever it had.
    async fn fetch_source(&self, source: Source) -> Result<u64, ControllerError> {
        let path = endpoint(&source);
        tracing::debug!(source = %source, path = %path, "Fetching log");

        match self.transport.get_text(&path).await {
            Ok(text) => {
                let bytes = text.len();
                let lines = text.lines().count();
                let sequence = self.cache.store(source.clone(), text);
                tracing::debug!(source = %source, bytes, lines, sequence, "Log fetched");
                Ok(sequence)
            }
            Err(error) => {
                tracing::warn!(
                    source = %source,
                    error = %error,
                    cached = self.cache.contains(&source),
                    "Log fetch failed; keeping cached text"
                );
                Err(ControllerError::Fetch { source, error })
            }
        }
    }

    async fn load_addons(&self) -> Result<(), ControllerError> {
        match self.registry.list_addons().await {
            Ok(addons) => {
                tracing::debug!(count = addons.len(), "Add-on list stored");
                self.write_state().addons = Some(addons);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(error = %error, "Add-on list fetch failed");
                Err(ControllerError::AddonList(error))
            }
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ViewState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ViewState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SourceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("SourceController")
            .field("tab", &state.tab)
            .field("selected_addon", &state.selected_addon)
            .field("filter", &state.filter.query())
            .field("cached_sources", &self.cache.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Host API path for a source's log.
pub fn endpoint(source: &Source) -> String {
    match source {
        Source::Core => constants::ENDPOINT_CORE_LOG.to_string(),
        Source::Supervisor => constants::ENDPOINT_SUPERVISOR_LOG.to_string(),
        Source::Addon(slug) => constants::addon_log_endpoint(slug),
    }
}
