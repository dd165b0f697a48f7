// LogPanel - tests/e2e_controller.rs
//
// End-to-end tests for the source controller: tab transitions, fetch
// caching, failure handling and the text pipeline, driven through a
// scripted in-memory transport that records every request.

use async_trait::async_trait;
use logpanel::app::controller::{ControllerOptions, SourceController};
use logpanel::app::registry::StaticCapabilities;
use logpanel::app::transport::Transport;
use logpanel::core::model::{Source, Tab};
use logpanel::util::error::{ControllerError, FetchError, TransitionError};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

// =============================================================================
// Helpers
// =============================================================================

const CORE: &str = "error_log";
const SUPERVISOR: &str = "hassio/supervisor/logs";
const ADDONS: &str = "hassio/addons";

fn addon_log(slug: &str) -> String {
    format!("hassio/addons/{slug}/logs")
}

enum Reply {
    Text(String),
    Json(serde_json::Value),
    Fail,
    /// Text delivered only once the paired sender fires.
    Gated(oneshot::Receiver<()>, String),
}

/// Transport answering from per-path queues of scripted replies.
#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    fn text(&self, path: &str, body: &str) {
        self.push(path, Reply::Text(body.to_string()));
    }

    fn json(&self, path: &str, body: serde_json::Value) {
        self.push(path, Reply::Json(body));
    }

    fn fail(&self, path: &str) {
        self.push(path, Reply::Fail);
    }

    fn gated_text(&self, path: &str, body: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(path, Reply::Gated(rx, body.to_string()));
        tx
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, path: &str) -> Option<Reply> {
        self.calls.lock().unwrap().push(path.to_string());
        self.replies
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
    }
}

fn unavailable(path: &str) -> FetchError {
    FetchError::Unavailable {
        path: path.to_string(),
        reason: "scripted failure".to_string(),
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_text(&self, path: &str) -> Result<String, FetchError> {
        match self.next(path) {
            Some(Reply::Text(body)) => Ok(body),
            Some(Reply::Gated(gate, body)) => {
                gate.await.map_err(|_| unavailable(path))?;
                Ok(body)
            }
            _ => Err(unavailable(path)),
        }
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, FetchError> {
        match self.next(path) {
            Some(Reply::Json(body)) => Ok(body),
            _ => Err(unavailable(path)),
        }
    }
}

fn controller_with(
    transport: &Arc<ScriptedTransport>,
    supervisor: bool,
    options: ControllerOptions,
) -> SourceController {
    SourceController::new(
        transport.clone(),
        Arc::new(StaticCapabilities(supervisor)),
        options,
    )
}

fn controller(transport: &Arc<ScriptedTransport>, supervisor: bool) -> SourceController {
    controller_with(transport, supervisor, ControllerOptions::default())
}

fn addon_list_body() -> serde_json::Value {
    json!({"addons": [
        {"slug": "core_ssh", "name": "Terminal & SSH", "installed": true},
        {"slug": "mosquitto", "name": "Mosquitto broker", "installed": true},
        {"slug": "zwave", "name": "Z-Wave JS", "installed": false}
    ]})
}

// =============================================================================
// Startup
// =============================================================================

#[tokio::test]
async fn e2e_start_fetches_core_once() {
    let t = ScriptedTransport::new();
    t.text(CORE, "2024 INFO ready\n2024 ERROR boom");
    let c = controller(&t, true);

    assert_eq!(c.current_text(), "", "nothing shown before the first fetch");
    c.start().await.unwrap();
    c.start().await.unwrap();

    assert_eq!(t.calls(), vec![CORE]);
    assert_eq!(c.current_tab(), Tab::Core);
    assert_eq!(c.current_text(), "2024 INFO ready\n2024 ERROR boom");
}

#[tokio::test]
async fn e2e_failed_start_is_reported_and_recoverable() {
    let t = ScriptedTransport::new();
    t.fail(CORE);
    t.text(CORE, "later");
    let c = controller(&t, false);

    let err = c.start().await.unwrap_err();
    assert!(
        matches!(err, ControllerError::Fetch { source: Source::Core, .. }),
        "got {err:?}"
    );
    assert_eq!(c.current_text(), "");

    c.reload().await.unwrap();
    assert_eq!(c.current_text(), "later");
}

// =============================================================================
// Capability gating
// =============================================================================

#[tokio::test]
async fn e2e_supervisor_tab_rejected_without_capability() {
    let t = ScriptedTransport::new();
    t.text(CORE, "core");
    let c = controller(&t, false);
    c.start().await.unwrap();

    for tab in [Tab::Supervisor, Tab::Addon] {
        let err = c.select_tab(tab).await.unwrap_err();
        assert!(
            matches!(
                err,
                ControllerError::Transition(TransitionError::CapabilityMissing { .. })
            ),
            "got {err:?}"
        );
        assert_eq!(c.current_tab(), Tab::Core);
    }
    assert_eq!(t.calls(), vec![CORE]);
    assert_eq!(c.available_tabs(), vec![Tab::Core]);
}

// =============================================================================
// Tab transitions
// =============================================================================

#[tokio::test]
async fn e2e_supervisor_tab_fetches_and_sanitizes() {
    let t = ScriptedTransport::new();
    t.text(SUPERVISOR, "\\[31merror\\[0m\ninfo");
    let c = controller(&t, true);

    c.select_tab(Tab::Supervisor).await.unwrap();
    assert_eq!(c.current_source(), Some(Source::Supervisor));
    assert_eq!(c.current_text(), "error\ninfo");
}

#[tokio::test]
async fn e2e_addon_tab_loads_list_but_no_log() {
    let t = ScriptedTransport::new();
    t.json(ADDONS, addon_list_body());
    let c = controller(&t, true);

    c.select_tab(Tab::Addon).await.unwrap();

    assert_eq!(t.calls(), vec![ADDONS]);
    assert_eq!(c.current_source(), None);
    assert_eq!(c.current_text(), "");
    let slugs: Vec<_> = c.addon_list().into_iter().map(|a| a.slug).collect();
    assert_eq!(slugs, vec!["core_ssh", "mosquitto"]);

    // Returning to the tab does not refetch a list that is already loaded.
    t.text(CORE, "core");
    c.select_tab(Tab::Core).await.unwrap();
    c.select_tab(Tab::Addon).await.unwrap();
    assert_eq!(t.calls(), vec![ADDONS, CORE]);
}

#[tokio::test]
async fn e2e_addon_list_without_start_fetches_no_log() {
    let t = ScriptedTransport::new();
    t.json(ADDONS, addon_list_body());
    t.text(CORE, "core");
    let c = controller(&t, true);

    c.select_tab(Tab::Addon).await.unwrap();
    assert_eq!(c.addon_list().len(), 2);
    assert_eq!(t.calls(), vec![ADDONS]);

    // A later start still performs its one core fetch.
    c.start().await.unwrap();
    assert_eq!(t.calls(), vec![ADDONS, CORE]);
}

#[tokio::test]
async fn e2e_select_addon_fetches_its_log() {
    let t = ScriptedTransport::new();
    t.json(ADDONS, addon_list_body());
    t.text(&addon_log("core_ssh"), "\\[32mssh started\\[0m");
    let c = controller(&t, true);

    c.select_tab(Tab::Addon).await.unwrap();
    c.select_addon("core_ssh").await.unwrap();

    assert_eq!(c.selected_addon().as_deref(), Some("core_ssh"));
    assert_eq!(c.current_source(), Some(Source::Addon("core_ssh".to_string())));
    assert_eq!(c.current_text(), "ssh started");
}

#[tokio::test]
async fn e2e_select_addon_outside_addon_tab_is_rejected() {
    let t = ScriptedTransport::new();
    let c = controller(&t, true);

    let err = c.select_addon("core_ssh").await.unwrap_err();
    assert!(
        matches!(
            err,
            ControllerError::Transition(TransitionError::AddonTabInactive { current: Tab::Core })
        ),
        "got {err:?}"
    );
    assert_eq!(c.selected_addon(), None);
    assert!(t.calls().is_empty());
}

#[tokio::test]
async fn e2e_select_addon_validates_slug() {
    let t = ScriptedTransport::new();
    t.json(ADDONS, addon_list_body());
    let c = controller(&t, true);
    c.select_tab(Tab::Addon).await.unwrap();

    let err = c.select_addon("").await.unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Transition(TransitionError::EmptySlug)
    ));

    // Known but not installed.
    let err = c.select_addon("zwave").await.unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Transition(TransitionError::UnknownAddon { .. })
    ));
    assert_eq!(c.selected_addon(), None);
    assert_eq!(t.calls(), vec![ADDONS]);
}

// =============================================================================
// Reload
// =============================================================================

#[tokio::test]
async fn e2e_reload_follows_current_state() {
    let t = ScriptedTransport::new();
    t.text(CORE, "core 1");
    t.text(CORE, "core 2");
    t.json(ADDONS, json!([]));
    t.json(ADDONS, addon_list_body());
    t.text(&addon_log("mosquitto"), "mqtt 1");
    t.text(&addon_log("mosquitto"), "mqtt 2");
    let c = controller(&t, true);

    c.start().await.unwrap();
    c.reload().await.unwrap();
    assert_eq!(c.current_text(), "core 2");

    // Add-on tab with nothing picked: reload refreshes the list.
    c.select_tab(Tab::Addon).await.unwrap();
    assert!(c.addon_list().is_empty());
    c.reload().await.unwrap();
    assert_eq!(c.addon_list().len(), 2);

    // With an add-on picked: reload refreshes that add-on's log.
    c.select_addon("mosquitto").await.unwrap();
    c.reload().await.unwrap();
    assert_eq!(c.current_text(), "mqtt 2");

    assert_eq!(
        t.calls(),
        vec![
            CORE.to_string(),
            CORE.to_string(),
            ADDONS.to_string(),
            ADDONS.to_string(),
            addon_log("mosquitto"),
            addon_log("mosquitto"),
        ]
    );
}

// =============================================================================
// Cache behaviour
// =============================================================================

#[tokio::test]
async fn e2e_second_fetch_overwrites_first() {
    let t = ScriptedTransport::new();
    t.text(SUPERVISOR, "first");
    t.text(SUPERVISOR, "second");
    let c = controller(&t, true);

    c.select_tab(Tab::Supervisor).await.unwrap();
    let first_seq = c.current_sequence().unwrap();
    c.select_tab(Tab::Supervisor).await.unwrap();

    assert_eq!(c.current_text(), "second");
    assert!(c.current_sequence().unwrap() > first_seq);
}

#[tokio::test]
async fn e2e_failed_fetch_keeps_stale_text() {
    let t = ScriptedTransport::new();
    t.text(SUPERVISOR, "\\[33mWARNING disk\\[0m\nINFO ok");
    t.fail(SUPERVISOR);
    let c = controller(&t, true);
    c.set_filter_query("warning");

    c.select_tab(Tab::Supervisor).await.unwrap();
    let before = c.current_text();
    assert_eq!(before, "WARNING disk");

    let err = c.reload().await.unwrap_err();
    assert!(err.fetch_error().is_some());
    assert_eq!(c.current_tab(), Tab::Supervisor);
    assert_eq!(c.current_text(), before);
}

#[tokio::test]
async fn e2e_failed_addon_reload_keeps_stale_text() {
    let t = ScriptedTransport::new();
    t.json(ADDONS, addon_list_body());
    t.text(&addon_log("mosquitto"), "\\[32mclient connected\\[0m\nidle");
    t.fail(&addon_log("mosquitto"));
    let c = controller(&t, true);
    c.set_filter_query("CLIENT");

    c.select_tab(Tab::Addon).await.unwrap();
    c.select_addon("mosquitto").await.unwrap();
    let before = c.current_text();
    assert_eq!(before, "client connected");
    let sequence = c.current_sequence();

    let err = c.reload().await.unwrap_err();
    assert!(
        matches!(&err, ControllerError::Fetch { source: Source::Addon(slug), .. } if slug == "mosquitto"),
        "got {err:?}"
    );
    assert_eq!(c.current_source(), Some(Source::Addon("mosquitto".to_string())));
    assert_eq!(c.current_text(), before);
    assert_eq!(c.current_sequence(), sequence);
}

#[tokio::test]
async fn e2e_failed_first_fetch_leaves_tab_selected() {
    let t = ScriptedTransport::new();
    t.fail(SUPERVISOR);
    let c = controller(&t, true);

    let err = c.select_tab(Tab::Supervisor).await.unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Fetch {
            source: Source::Supervisor,
            ..
        }
    ));
    assert_eq!(c.current_tab(), Tab::Supervisor);
    assert_eq!(c.current_text(), "");
}

// =============================================================================
// Add-on selection stickiness
// =============================================================================

#[tokio::test]
async fn e2e_addon_selection_is_sticky_by_default() {
    let t = ScriptedTransport::new();
    t.json(ADDONS, addon_list_body());
    t.text(&addon_log("core_ssh"), "ssh log");
    t.text(CORE, "core log");
    let c = controller(&t, true);

    c.select_tab(Tab::Addon).await.unwrap();
    c.select_addon("core_ssh").await.unwrap();
    c.select_tab(Tab::Core).await.unwrap();
    assert_eq!(c.selected_addon().as_deref(), Some("core_ssh"));

    c.select_tab(Tab::Addon).await.unwrap();
    assert_eq!(c.current_source(), Some(Source::Addon("core_ssh".to_string())));
    assert_eq!(c.current_text(), "ssh log");
    // Coming back shows the cached log without a refetch.
    assert_eq!(t.calls().iter().filter(|p| **p == addon_log("core_ssh")).count(), 1);
}

#[tokio::test]
async fn e2e_addon_selection_resets_when_configured() {
    let t = ScriptedTransport::new();
    t.json(ADDONS, addon_list_body());
    t.text(&addon_log("core_ssh"), "ssh log");
    t.text(SUPERVISOR, "supervisor log");
    let c = controller_with(
        &t,
        true,
        ControllerOptions {
            reset_addon_on_leave: true,
            ..ControllerOptions::default()
        },
    );

    c.select_tab(Tab::Addon).await.unwrap();
    c.select_addon("core_ssh").await.unwrap();
    c.select_tab(Tab::Supervisor).await.unwrap();
    assert_eq!(c.selected_addon(), None);

    c.select_tab(Tab::Addon).await.unwrap();
    assert_eq!(c.current_source(), None);
    assert_eq!(c.current_text(), "");
    // The cached log itself is kept.
    assert!(c.cache().contains(&Source::Addon("core_ssh".to_string())));
}

// =============================================================================
// Text pipeline
// =============================================================================

#[tokio::test]
async fn e2e_filter_applies_to_every_source() {
    let t = ScriptedTransport::new();
    t.text(CORE, "a\nB\nc");
    t.text(SUPERVISOR, "\\[31mBoot\\[0m\nidle\n");
    let c = controller_with(
        &t,
        true,
        ControllerOptions {
            initial_query: "b".to_string(),
            ..ControllerOptions::default()
        },
    );

    c.start().await.unwrap();
    assert_eq!(c.current_text(), "B");

    c.select_tab(Tab::Supervisor).await.unwrap();
    assert_eq!(c.current_text(), "Boot");

    c.set_filter_query("");
    assert_eq!(c.filter_query(), "");
    assert_eq!(c.current_text(), "Boot\nidle\n");
}

#[tokio::test]
async fn e2e_core_text_keeps_escape_sequences() {
    let t = ScriptedTransport::new();
    t.text(CORE, "\\[31mraw\\[0m");
    let c = controller(&t, false);
    c.start().await.unwrap();
    assert_eq!(c.current_text(), "\\[31mraw\\[0m");
}

// =============================================================================
// Overlapping fetches
// =============================================================================

#[tokio::test]
async fn e2e_overlapping_fetches_last_completion_wins() {
    let t = ScriptedTransport::new();
    let gate = t.gated_text(CORE, "issued first, finished last");
    t.text(CORE, "issued second, finished first");
    let c = controller(&t, false);

    let (first, second) = tokio::join!(c.reload(), async {
        let result = c.reload().await;
        gate.send(()).unwrap();
        result
    });
    first.unwrap();
    second.unwrap();

    assert_eq!(c.current_text(), "issued first, finished last");
}

#[tokio::test]
async fn e2e_inflight_fetch_for_unselected_source_still_lands() {
    let t = ScriptedTransport::new();
    let gate = t.gated_text(SUPERVISOR, "late supervisor log");
    t.text(CORE, "core log");
    let c = controller(&t, true);

    let (supervisor, core) = tokio::join!(c.select_tab(Tab::Supervisor), async {
        let result = c.select_tab(Tab::Core).await;
        gate.send(()).unwrap();
        result
    });
    supervisor.unwrap();
    core.unwrap();

    assert_eq!(c.current_tab(), Tab::Core);
    assert_eq!(c.current_text(), "core log");
    assert_eq!(
        c.cache().text(&Source::Supervisor).as_deref(),
        Some("late supervisor log")
    );
}
