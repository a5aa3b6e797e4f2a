//! Lightbox navigation state machine.
//!
//! States are `Closed` and `Open`. Every transition is a pure function of
//! the current state and a [`NavContext`] snapshot describing what is loaded;
//! side effects (fetching the next page, entering fullscreen, locking the
//! page scroll) are left to the caller, which reads them off the returned
//! outcome.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.5;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// State of an open lightbox.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenLightbox {
    /// Index into the flattened sequence of loaded items.
    pub index: usize,
    pub autoplay: bool,
    /// Zoom multiplier within `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f64,
    pub fullscreen: bool,
    /// Set when `next` ran off the loaded items and a page fetch is expected
    /// to supply the following one.
    pub pending_advance: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Lightbox {
    #[default]
    Closed,
    Open(OpenLightbox),
}

/// What the caller knows about the loaded data at the time of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavContext {
    pub loaded_count: usize,
    /// Total matching items as reported by the last fetch.
    pub total_count: usize,
    pub has_next_page: bool,
}

impl NavContext {
    /// Everything the store reported is already loaded.
    pub fn fully_loaded(&self) -> bool {
        self.loaded_count == self.total_count
    }
}

/// Result of a `next` / `prev` / `resolve_pending` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Moved to a neighbouring index.
    Moved(usize),
    /// Wrapped around to the other end of a fully loaded sequence.
    Wrapped(usize),
    /// The caller must fetch the next page; the advance happens once it lands.
    FetchRequested,
    /// An advance is already pending on an outstanding fetch.
    AwaitingFetch,
    /// Nothing to do (closed, end of archive, or first item of a partial load).
    Stayed,
}

/// Result of pressing Escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeOutcome {
    ExitedFullscreen,
    Closed,
    Ignored,
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

impl Lightbox {
    pub fn is_open(&self) -> bool {
        matches!(self, Lightbox::Open(_))
    }

    pub fn state(&self) -> Option<&OpenLightbox> {
        match self {
            Lightbox::Open(open) => Some(open),
            Lightbox::Closed => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.state().map(|s| s.index)
    }

    /// Open on item `index`. Autoplay starts off and zoom resets.
    pub fn open(&mut self, index: usize) {
        *self = Lightbox::Open(OpenLightbox {
            index,
            autoplay: false,
            zoom: MIN_ZOOM,
            fullscreen: false,
            pending_advance: false,
        });
    }

    /// Close and discard zoom, autoplay and any pending advance.
    pub fn close(&mut self) {
        *self = Lightbox::Closed;
    }

    pub fn next(&mut self, ctx: NavContext) -> NavOutcome {
        let Lightbox::Open(open) = self else {
            return NavOutcome::Stayed;
        };
        if open.pending_advance {
            return NavOutcome::AwaitingFetch;
        }
        if open.index + 1 < ctx.loaded_count {
            open.index += 1;
            return NavOutcome::Moved(open.index);
        }
        if ctx.has_next_page {
            open.pending_advance = true;
            return NavOutcome::FetchRequested;
        }
        if ctx.loaded_count > 0 && ctx.fully_loaded() {
            open.index = 0;
            return NavOutcome::Wrapped(0);
        }
        NavOutcome::Stayed
    }

    pub fn prev(&mut self, ctx: NavContext) -> NavOutcome {
        let Lightbox::Open(open) = self else {
            return NavOutcome::Stayed;
        };
        if open.index > 0 {
            open.index -= 1;
            return NavOutcome::Moved(open.index);
        }
        if ctx.loaded_count > 0 && ctx.fully_loaded() {
            open.index = ctx.loaded_count - 1;
            return NavOutcome::Wrapped(open.index);
        }
        NavOutcome::Stayed
    }

    /// Complete a pending advance once a fetch has resolved.
    ///
    /// Advances exactly once if the next item is now loaded. If the fetch
    /// brought nothing new and no further page exists, the pending flag is
    /// dropped without moving. While a further page may still arrive the flag
    /// is kept.
    pub fn resolve_pending(&mut self, ctx: NavContext) -> NavOutcome {
        let Lightbox::Open(open) = self else {
            return NavOutcome::Stayed;
        };
        if !open.pending_advance {
            return NavOutcome::Stayed;
        }
        if open.index + 1 < ctx.loaded_count {
            open.pending_advance = false;
            open.index += 1;
            return NavOutcome::Moved(open.index);
        }
        if !ctx.has_next_page {
            open.pending_advance = false;
        }
        NavOutcome::Stayed
    }

    /// Drop a pending advance, e.g. after the triggering fetch failed.
    pub fn cancel_pending(&mut self) {
        if let Lightbox::Open(open) = self {
            open.pending_advance = false;
        }
    }

    /// Flip autoplay; returns the new value, or `None` when closed.
    pub fn toggle_autoplay(&mut self) -> Option<bool> {
        let Lightbox::Open(open) = self else {
            return None;
        };
        open.autoplay = !open.autoplay;
        Some(open.autoplay)
    }

    pub fn zoom_in(&mut self) -> Option<f64> {
        self.set_zoom(|z| z + ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> Option<f64> {
        self.set_zoom(|z| z - ZOOM_STEP)
    }

    pub fn reset_zoom(&mut self) -> Option<f64> {
        self.set_zoom(|_| MIN_ZOOM)
    }

    fn set_zoom(&mut self, f: impl FnOnce(f64) -> f64) -> Option<f64> {
        let Lightbox::Open(open) = self else {
            return None;
        };
        open.zoom = f(open.zoom).clamp(MIN_ZOOM, MAX_ZOOM);
        Some(open.zoom)
    }

    /// Flip the fullscreen flag; returns the new value, or `None` when closed.
    pub fn toggle_fullscreen(&mut self) -> Option<bool> {
        let Lightbox::Open(open) = self else {
            return None;
        };
        open.fullscreen = !open.fullscreen;
        Some(open.fullscreen)
    }

    /// Escape leaves fullscreen first and only closes on a second press.
    pub fn escape(&mut self) -> EscapeOutcome {
        let Lightbox::Open(open) = self else {
            return EscapeOutcome::Ignored;
        };
        if open.fullscreen {
            open.fullscreen = false;
            return EscapeOutcome::ExitedFullscreen;
        }
        self.close();
        EscapeOutcome::Closed
    }
}

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxCommand {
    Escape,
    Next,
    Prev,
    ToggleAutoplay,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    ToggleFullscreen,
}

/// A resolved key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub command: LightboxCommand,
    /// The browser's default action must be suppressed (Space scrolls).
    pub prevent_default: bool,
}

/// Map a `KeyboardEvent.key` value to a lightbox command.
pub fn key_binding(key: &str) -> Option<KeyBinding> {
    let command = match key {
        "Escape" => LightboxCommand::Escape,
        "ArrowRight" => LightboxCommand::Next,
        "ArrowLeft" => LightboxCommand::Prev,
        " " | "Space" | "Spacebar" => LightboxCommand::ToggleAutoplay,
        "+" | "=" => LightboxCommand::ZoomIn,
        "-" | "_" => LightboxCommand::ZoomOut,
        "0" => LightboxCommand::ResetZoom,
        "f" | "F" => LightboxCommand::ToggleFullscreen,
        _ => return None,
    };
    Some(KeyBinding {
        command,
        prevent_default: command == LightboxCommand::ToggleAutoplay,
    })
}
