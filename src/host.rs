//! Host application interfaces.
//!
//! The editor embedding this extension provides four primitives: opaque JSON
//! settings persistence, the set of live window roots, capturing event
//! listener registration, and settings-panel widget builders. Everything
//! here is a contract consumed by the extension; the host supplies the
//! implementations and drives the [`crate::plugin::AutohideCursor`]
//! lifecycle entry points.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use crate::events::{EventKind, InputEvent};

/// Identity of a window root, stable for the lifetime of that window.
/// Window ids are ephemeral and may be reused after the host recreates a
/// window, which is why bindings are reconciled rather than cached forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(pub u64);

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The top-level container of one window's visible content.
///
/// All operations on a root whose window has been torn down must be no-ops;
/// the extension never checks liveness before mutating.
pub trait WindowRoot: Send + Sync {
    fn id(&self) -> RootId;

    /// False once the underlying window/document has been destroyed
    fn is_attached(&self) -> bool;

    /// Apply or remove the hidden-cursor visual on this root's body.
    /// Must be a no-op for a detached root.
    fn set_cursor_hidden(&self, hidden: bool);
}

/// Callback invoked by the host for every matching event on a root
pub type EventHandler = Box<dyn Fn(InputEvent) + Send + Sync>;

/// Removal handle for one registered listener.
///
/// Dropping the guard unregisters the listener. Keeping removal in an
/// explicit handle (rather than re-deriving closure identity at removal
/// time) is what makes detach-then-attach reliable.
pub struct ListenerGuard {
    remove: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerGuard {
    pub fn new(remove: impl FnOnce() + Send + 'static) -> Self {
        Self {
            remove: Some(Box::new(remove)),
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard").finish_non_exhaustive()
    }
}

/// The host application, as seen by the extension
pub trait Host: Send + Sync {
    /// Load the previously persisted settings object, if any
    fn load_data(&self) -> Result<Option<Value>>;

    /// Persist an opaque settings object, overwriting the previous one
    fn save_data(&self, data: &Value) -> Result<()>;

    /// All currently live window roots: the main window first, then any
    /// popout windows. Roots for half-constructed windows may be absent;
    /// callers retry via the deferred resync.
    fn window_roots(&self) -> Vec<Arc<dyn WindowRoot>>;

    /// Register `handler` for `kind` events on `root`. `capture` selects the
    /// capture phase so events are observed regardless of which descendant
    /// handles them. The host removes any surviving registrations when the
    /// extension deactivates; the returned guard is the per-binding handle.
    fn register_listener(
        &self,
        root: &Arc<dyn WindowRoot>,
        kind: EventKind,
        capture: bool,
        handler: EventHandler,
    ) -> ListenerGuard;
}

/// Slider widget description for the settings panel
pub struct SliderSpec<'a> {
    pub name: &'a str,
    pub desc: &'a str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

/// Dropdown widget description; options are (key, label) pairs
pub struct DropdownSpec<'a> {
    pub name: &'a str,
    pub desc: &'a str,
    pub options: &'a [(&'a str, &'a str)],
    pub selected: &'a str,
}

/// Host-provided settings panel under construction.
///
/// The extension only declares widgets and change callbacks; layout and
/// rendering belong to the host.
pub trait SettingsPanel {
    fn slider(&mut self, spec: SliderSpec<'_>, on_change: Box<dyn Fn(f64) + Send + Sync>);

    fn dropdown(&mut self, spec: DropdownSpec<'_>, on_change: Box<dyn Fn(&str) + Send + Sync>);

    fn reset_button(&mut self, name: &str, desc: &str, on_click: Box<dyn Fn() + Send + Sync>);
}
