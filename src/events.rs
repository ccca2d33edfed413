//! Input events observed on a window root.
//!
//! These are the extension's view of the host's raw DOM-style events: only
//! the fields the visibility logic consults survive (movement deltas for
//! pointer events, nothing for scroll events).

/// Event categories a listener can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    Scroll,
}

/// A single input event dispatched by the host, in capture phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved by (dx, dy) pixels since the previous event
    PointerMove { dx: f64, dy: f64 },
    /// Any scroll within the window; the scroll amount is irrelevant
    Scroll,
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::PointerMove { .. } => EventKind::PointerMove,
            InputEvent::Scroll => EventKind::Scroll,
        }
    }
}
