#![forbid(unsafe_code)]

//! Auto-hide cursor extension core.
//!
//! Hides the mouse cursor on scroll and brings it back on real pointer
//! movement (or, in delay mode, a quiet period after scrolling), across the
//! host editor's main window and any popout windows. The host is consumed
//! through the traits in [`host`]; see [`plugin::AutohideCursor`] for the
//! lifecycle entry points.

pub mod constants;
pub mod events;
pub mod host;
pub mod listeners;
pub mod motion;
pub mod plugin;
pub mod settings;
pub mod settings_ui;
pub mod visibility;

pub use events::{EventKind, InputEvent};
pub use host::{DropdownSpec, EventHandler, Host, ListenerGuard, RootId, SettingsPanel, SliderSpec, WindowRoot};
pub use listeners::WindowListenerManager;
pub use plugin::AutohideCursor;
pub use settings::{CursorSettings, ReappearMode, SettingsStore};
pub use settings_ui::build_settings_panel;
pub use visibility::{CursorState, CursorVisibility};
