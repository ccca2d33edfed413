//! Cursor visibility state machine.
//!
//! One [`CursorVisibility`] instance is bound to one window root and drives
//! that root's hidden-cursor visual from the scroll and pointer-move streams.
//! Each instance owns at most one pending debounce timer; arming a new timer
//! always cancels the previous one, and an epoch counter makes a timer that
//! raced its own cancellation a no-op.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};

use crate::host::WindowRoot;
use crate::motion::exceeds_threshold;
use crate::settings::{ReappearMode, SettingsStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Visible,
    Hidden,
}

struct MachineState {
    root: Arc<dyn WindowRoot>,
    settings: Arc<SettingsStore>,
    state: CursorState,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every cancel; a pending timer only acts if its epoch still
    /// matches, so a stale fire after re-arm or teardown does nothing
    epoch: u64,
    runtime: Option<Handle>,
}

impl MachineState {
    /// Transition and mirror the state onto the root. Exactly one visual
    /// mutation per transition; repeated same-state calls mutate nothing.
    fn set_state(&mut self, next: CursorState) {
        if self.state == next {
            return;
        }
        self.state = next;
        self.root.set_cursor_hidden(next == CursorState::Hidden);
        debug!(root = %self.root.id(), state = ?next, "cursor visibility changed");
    }

    fn cancel_timer(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Handle to one root's visibility machine. Clones share the same state;
/// the listener closures for a root each hold one.
#[derive(Clone)]
pub struct CursorVisibility {
    inner: Arc<Mutex<MachineState>>,
}

impl CursorVisibility {
    /// Create a machine for `root`, starting visible. Must be constructed on
    /// the host's async runtime; without one the machine still tracks state
    /// but cannot schedule debounce timers.
    pub fn new(root: Arc<dyn WindowRoot>, settings: Arc<SettingsStore>) -> Self {
        let runtime = Handle::try_current().ok();
        if runtime.is_none() {
            warn!(root = %root.id(), "no async runtime available, debounce timers disabled");
        }
        Self {
            inner: Arc::new(Mutex::new(MachineState {
                root,
                settings,
                state: CursorState::Visible,
                timer: None,
                epoch: 0,
                runtime,
            })),
        }
    }

    pub fn state(&self) -> CursorState {
        self.inner.lock().state
    }

    /// Scroll anywhere in the window.
    ///
    /// Movement mode hides immediately and stays hidden until qualifying
    /// pointer movement. Delay mode hides on the first scroll of a burst and
    /// re-arms the show timer on every scroll, so the cursor reappears one
    /// delay after the burst ends.
    pub fn on_scroll(&self) {
        let mut machine = self.inner.lock();
        let settings = machine.settings.get();
        match settings.reappear_mode {
            ReappearMode::Movement => {
                machine.cancel_timer();
                machine.set_state(CursorState::Hidden);
            }
            ReappearMode::Delay => {
                // Only hide if the show timer could actually be armed,
                // otherwise the cursor would never come back
                if self.arm(&mut machine, settings.delay(), CursorState::Visible) {
                    machine.set_state(CursorState::Hidden);
                }
            }
        }
    }

    /// Pointer moved by (dx, dy) pixels.
    ///
    /// Only movement mode reacts, and only to deltas past the configured
    /// threshold: the cursor reappears and the hide timer restarts. Jitter
    /// below the threshold neither shows the cursor nor extends its
    /// visibility, so a slow continuous drag will eventually let it hide.
    pub fn on_pointer_move(&self, dx: f64, dy: f64) {
        let mut machine = self.inner.lock();
        let settings = machine.settings.get();
        if settings.reappear_mode != ReappearMode::Movement {
            return;
        }
        if !exceeds_threshold(dx, dy, settings.movement_threshold) {
            return;
        }
        machine.set_state(CursorState::Visible);
        self.arm(&mut machine, settings.delay(), CursorState::Hidden);
    }

    /// Cancel any pending timer and leave the cursor visible. Used when the
    /// binding is torn down; the worst failure mode anywhere is a cursor
    /// that stays visible.
    pub fn shutdown(&self) {
        let mut machine = self.inner.lock();
        machine.cancel_timer();
        machine.set_state(CursorState::Visible);
    }

    /// Cancel-then-set: replace any pending timer with one that transitions
    /// to `then` after `delay`. Returns false when no runtime is available.
    fn arm(&self, machine: &mut MachineState, delay: Duration, then: CursorState) -> bool {
        let Some(runtime) = machine.runtime.clone() else {
            return false;
        };
        machine.cancel_timer();
        let epoch = machine.epoch;
        let weak = Arc::downgrade(&self.inner);
        machine.timer = Some(runtime.spawn(async move {
            sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let mut machine = inner.lock();
            if machine.epoch == epoch {
                machine.timer = None;
                machine.set_state(then);
            }
        }));
        true
    }
}
