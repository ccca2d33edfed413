//! Declarative settings panel.
//!
//! Widgets belong to the host; this module only declares them and persists
//! changes. Every change saves immediately and re-binds listeners through
//! [`AutohideCursor::update_settings`].

use tracing::warn;

use crate::constants::limits;
use crate::host::{DropdownSpec, SettingsPanel, SliderSpec};
use crate::plugin::AutohideCursor;
use crate::settings::{CursorSettings, ReappearMode};

/// (key, label) pairs for the reappearance-mode dropdown
const MODE_OPTIONS: &[(&str, &str)] = &[
    ("movement", "On pointer movement"),
    ("delay", "After scrolling settles"),
];

/// Populate the host-provided settings panel
pub fn build_settings_panel(panel: &mut dyn SettingsPanel, plugin: &AutohideCursor) {
    let current = plugin.settings();

    let threshold_plugin = plugin.clone();
    panel.slider(
        SliderSpec {
            name: "Movement threshold (px)",
            desc: "Minimum distance to show the cursor again",
            min: limits::THRESHOLD_MIN,
            max: limits::THRESHOLD_MAX,
            step: limits::THRESHOLD_STEP,
            value: current.movement_threshold,
        },
        Box::new(move |value| {
            save(&threshold_plugin, |s| s.movement_threshold = value);
        }),
    );

    let delay_plugin = plugin.clone();
    panel.slider(
        SliderSpec {
            name: "Hide delay (ms)",
            desc: "Time to hide the cursor after movement stops",
            min: limits::DELAY_MIN_MS,
            max: limits::DELAY_MAX_MS,
            step: limits::DELAY_STEP_MS,
            value: current.delay_time,
        },
        Box::new(move |value| {
            save(&delay_plugin, |s| s.delay_time = value);
        }),
    );

    let mode_plugin = plugin.clone();
    panel.dropdown(
        DropdownSpec {
            name: "Cursor reappears",
            desc: "What brings the cursor back after it hides",
            options: MODE_OPTIONS,
            selected: current.reappear_mode.key(),
        },
        Box::new(move |key| match ReappearMode::from_key(key) {
            Some(mode) => save(&mode_plugin, |s| s.reappear_mode = mode),
            None => warn!(key = %key, "unknown reappear mode selected"),
        }),
    );

    let reset_plugin = plugin.clone();
    panel.reset_button(
        "Reset to defaults",
        "Restore threshold, delay and mode to their defaults",
        Box::new(move || {
            save(&reset_plugin, |s| *s = CursorSettings::default());
        }),
    );
}

fn save(plugin: &AutohideCursor, mutate: impl FnOnce(&mut CursorSettings)) {
    // Settings failures are logged, never surfaced as UI errors
    if let Err(e) = plugin.update_settings(mutate) {
        warn!(error = %e, "failed to save settings");
    }
}
