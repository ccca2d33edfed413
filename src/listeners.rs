//! Listener lifecycle across window roots.
//!
//! The manager owns one binding per live window root: a visibility machine
//! plus the listener guards registered for it. Bindings are reconciled
//! against the host's current window list on workspace-ready, on settings
//! changes, and (after a fixed delay) on layout changes, so popout windows
//! opened after activation get their own machine and windows that vanish
//! release theirs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};

use crate::constants::timing;
use crate::events::{EventKind, InputEvent};
use crate::host::{Host, ListenerGuard, RootId, WindowRoot};
use crate::settings::{ReappearMode, SettingsStore};
use crate::visibility::CursorVisibility;

/// Everything attached to one window root
struct RootBinding {
    machine: CursorVisibility,
    /// Held for their Drop side effect: dropping unregisters the listeners
    _guards: Vec<ListenerGuard>,
}

impl Drop for RootBinding {
    fn drop(&mut self) {
        // Leaves the cursor visible; a vanished window must not strand a
        // hidden cursor or a pending timer
        self.machine.shutdown();
    }
}

pub struct WindowListenerManager {
    host: Arc<dyn Host>,
    settings: Arc<SettingsStore>,
    bindings: Mutex<HashMap<RootId, RootBinding>>,
    resync_task: Mutex<Option<JoinHandle<()>>>,
}

impl WindowListenerManager {
    pub fn new(host: Arc<dyn Host>, settings: Arc<SettingsStore>) -> Self {
        Self {
            host,
            settings,
            bindings: Mutex::new(HashMap::new()),
            resync_task: Mutex::new(None),
        }
    }

    /// Bind the visibility machine to `root`. Idempotent: any existing
    /// binding for the same root is detached first, so calling this twice
    /// never double-registers.
    pub fn attach(&self, root: Arc<dyn WindowRoot>) {
        let mode = self.settings.get().reappear_mode;
        let mut bindings = self.bindings.lock();
        self.attach_root(&mut bindings, root, mode);
    }

    /// Remove the binding for `id`; a no-op for unknown roots
    pub fn detach(&self, id: RootId) {
        if self.bindings.lock().remove(&id).is_some() {
            debug!(root = %id, "listeners detached");
        }
    }

    /// Reconcile bindings against the host's current window list right now:
    /// prune vanished or detached roots, then (re-)attach every live one.
    pub fn sync_now(&self) {
        let roots = self.host.window_roots();
        let mode = self.settings.get().reappear_mode;
        let mut bindings = self.bindings.lock();

        let live: HashSet<RootId> = roots
            .iter()
            .filter(|root| root.is_attached())
            .map(|root| root.id())
            .collect();
        bindings.retain(|id, _| live.contains(id));

        for root in roots {
            self.attach_root(&mut bindings, root, mode);
        }
    }

    /// Deferred reconciliation for layout changes. A newly opened popout's
    /// document may not exist yet when the notification fires, so the sync
    /// runs `RESYNC_DELAY_MS` later; a newer resync supersedes a pending
    /// one. Attach is idempotent, so an extra sync is always harmless.
    pub fn resync(self: &Arc<Self>) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime for deferred resync, syncing immediately");
            self.sync_now();
            return;
        };
        let manager = Arc::clone(self);
        let mut slot = self.resync_task.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = Some(runtime.spawn(async move {
            sleep(Duration::from_millis(timing::RESYNC_DELAY_MS)).await;
            manager.sync_now();
        }));
    }

    /// Tear everything down: pending resync, all bindings, all timers.
    /// The cursor is left visible on every root.
    pub fn detach_all(&self) {
        if let Some(task) = self.resync_task.lock().take() {
            task.abort();
        }
        self.bindings.lock().clear();
        debug!("all listeners detached");
    }

    fn attach_root(
        &self,
        bindings: &mut HashMap<RootId, RootBinding>,
        root: Arc<dyn WindowRoot>,
        mode: ReappearMode,
    ) {
        let id = root.id();
        bindings.remove(&id);
        if !root.is_attached() {
            debug!(root = %id, "root not ready, skipping attach");
            return;
        }

        let machine = CursorVisibility::new(Arc::clone(&root), Arc::clone(&self.settings));
        let mut guards = Vec::with_capacity(2);

        let scroll_machine = machine.clone();
        guards.push(self.host.register_listener(
            &root,
            EventKind::Scroll,
            true,
            Box::new(move |_| scroll_machine.on_scroll()),
        ));

        // Delay mode never consults pointer movement, so it gets no
        // pointer-move listener; mode switches re-run attach
        if mode == ReappearMode::Movement {
            let move_machine = machine.clone();
            guards.push(self.host.register_listener(
                &root,
                EventKind::PointerMove,
                true,
                Box::new(move |event| {
                    if let InputEvent::PointerMove { dx, dy } = event {
                        move_machine.on_pointer_move(dx, dy);
                    }
                }),
            ));
        }

        debug!(root = %id, mode = ?mode, "listeners attached");
        bindings.insert(id, RootBinding { machine, _guards: guards });
    }
}
