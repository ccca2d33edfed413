//! Extension entry points.
//!
//! The host constructs one [`AutohideCursor`] around its [`Host`]
//! implementation and forwards its own lifecycle to it: `activate` on load,
//! `on_workspace_ready` once the initial layout exists, `on_layout_change`
//! for every later workspace mutation (including popout windows opening and
//! closing), and `deactivate` on unload.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::host::Host;
use crate::listeners::WindowListenerManager;
use crate::settings::{CursorSettings, SettingsStore};

#[derive(Clone)]
pub struct AutohideCursor {
    settings: Arc<SettingsStore>,
    manager: Arc<WindowListenerManager>,
}

impl AutohideCursor {
    pub fn new(host: Arc<dyn Host>) -> Self {
        let settings = Arc::new(SettingsStore::new(Arc::clone(&host)));
        let manager = Arc::new(WindowListenerManager::new(host, Arc::clone(&settings)));
        Self { settings, manager }
    }

    /// Load persisted settings. Listeners are not attached yet; that waits
    /// for the workspace-ready notification.
    pub fn activate(&self) {
        self.settings.load();
        info!(version = env!("CARGO_PKG_VERSION"), "autohide-cursor activated");
    }

    /// The host's initial layout exists: bind every current window root
    pub fn on_workspace_ready(&self) {
        debug!("workspace ready");
        self.manager.sync_now();
    }

    /// The layout changed (popout opened/closed, content root replaced):
    /// re-reconcile after the popout-readiness delay
    pub fn on_layout_change(&self) {
        debug!("layout change notified");
        self.manager.resync();
    }

    /// Unload: drop every binding and timer, leaving the cursor visible.
    /// The host additionally removes any listener registrations that
    /// survive, per its scoped-listener contract.
    pub fn deactivate(&self) {
        self.manager.detach_all();
        info!("autohide-cursor deactivated");
    }

    pub fn settings(&self) -> CursorSettings {
        self.settings.get()
    }

    /// Mutate and persist the settings, then re-bind listeners immediately
    /// so threshold, delay and mode changes take effect without waiting for
    /// a layout change.
    pub fn update_settings(&self, mutate: impl FnOnce(&mut CursorSettings)) -> Result<()> {
        self.settings.update(mutate)?;
        self.manager.sync_now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventKind, InputEvent};
    use crate::host::WindowRoot;
    use crate::host::testing::{TestHost, TestRoot, settle};
    use crate::settings::ReappearMode;
    use serde_json::json;
    use tokio::time::{Duration, advance};

    #[tokio::test(start_paused = true)]
    async fn test_activation_loads_persisted_settings() {
        let host = TestHost::with_persisted(json!({
            "movementThreshold": 6.0,
            "reappearMode": "delay",
        }));
        let plugin = AutohideCursor::new(host as Arc<dyn Host>);
        plugin.activate();

        let settings = plugin.settings();
        assert_eq!(settings.movement_threshold, 6.0);
        assert_eq!(settings.delay_time, 500.0);
        assert_eq!(settings.reappear_mode, ReappearMode::Delay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_lifecycle_movement_mode() {
        let host = TestHost::new();
        let root = TestRoot::new(1);
        host.add_root(root.clone());

        let plugin = AutohideCursor::new(host.clone() as Arc<dyn Host>);
        plugin.activate();

        // No listeners until the workspace is ready
        assert_eq!(host.listener_count(root.id(), EventKind::Scroll), 0);
        plugin.on_workspace_ready();
        assert_eq!(host.listener_count(root.id(), EventKind::Scroll), 1);

        host.emit(root.id(), InputEvent::Scroll);
        assert!(root.hidden());

        host.emit(root.id(), InputEvent::PointerMove { dx: 5.0, dy: 0.0 });
        assert!(!root.hidden());

        advance(Duration::from_millis(500)).await;
        settle().await;
        assert!(root.hidden());

        plugin.deactivate();
        assert!(!root.hidden());
        assert_eq!(host.listener_count(root.id(), EventKind::Scroll), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_layout_change_binds_popout() {
        let host = TestHost::new();
        let root = TestRoot::new(1);
        host.add_root(root.clone());

        let plugin = AutohideCursor::new(host.clone() as Arc<dyn Host>);
        plugin.activate();
        plugin.on_workspace_ready();

        let popout = TestRoot::new(2);
        host.add_root(popout.clone());
        plugin.on_layout_change();

        advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(host.listener_count(popout.id(), EventKind::Scroll), 1);

        // Each window has its own machine: hiding in the popout does not
        // touch the main window
        host.emit(popout.id(), InputEvent::Scroll);
        assert!(popout.hidden());
        assert!(!root.hidden());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_settings_persists_and_rebinds() {
        let host = TestHost::new();
        let root = TestRoot::new(1);
        host.add_root(root.clone());

        let plugin = AutohideCursor::new(host.clone() as Arc<dyn Host>);
        plugin.activate();
        plugin.on_workspace_ready();
        assert_eq!(host.listener_count(root.id(), EventKind::PointerMove), 1);

        plugin
            .update_settings(|s| s.reappear_mode = ReappearMode::Delay)
            .unwrap();

        // Persisted immediately and the listener set reflects the new mode
        assert_eq!(host.persisted().unwrap()["reappearMode"], json!("delay"));
        assert_eq!(host.listener_count(root.id(), EventKind::PointerMove), 0);
        assert_eq!(host.listener_count(root.id(), EventKind::Scroll), 1);
    }
}
