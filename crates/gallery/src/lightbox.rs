//! Async lightbox controller.
//!
//! Drives the pure [`Lightbox`] state machine against a [`GalleryCache`].
//! Running off the end of the loaded items asks the cache for the next page
//! and sets a pending-advance flag; the flag is resolved exactly once, either
//! by the triggering call when its fetch returns or by the cache's
//! [`CacheEvent::PageLoaded`] broadcast when another caller's fetch lands
//! first.
//!
//! Autoplay runs as a background interval task. It stops on toggle-off, on
//! close, and when the controller is dropped. While the lightbox is open the
//! host page's scroll is locked through a [`ScrollLock`] guard.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use vizfolio_core::lightbox::{
    key_binding, EscapeOutcome, KeyBinding, Lightbox, LightboxCommand, NavOutcome,
};
use vizfolio_store::models::gallery_item::GalleryItem;

use crate::cache::{CacheEvent, FetchOutcome, GalleryCache, QueryKey};
use crate::error::GalleryError;

// ---------------------------------------------------------------------------
// Host document
// ---------------------------------------------------------------------------

/// The page hosting the lightbox.
pub trait DocumentHost: Send + Sync {
    fn lock_scroll(&self);
    fn unlock_scroll(&self);
    fn set_fullscreen(&self, fullscreen: bool);
}

/// Keeps the host's scroll locked until dropped.
pub struct ScrollLock {
    host: Arc<dyn DocumentHost>,
}

impl ScrollLock {
    pub fn acquire(host: Arc<dyn DocumentHost>) -> Self {
        host.lock_scroll();
        Self { host }
    }
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        self.host.unlock_scroll();
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ControllerState {
    lightbox: Lightbox,
    /// Bucket the open lightbox navigates.
    key: Option<QueryKey>,
    scroll_lock: Option<ScrollLock>,
    /// Cancels the running autoplay task.
    autoplay: Option<CancellationToken>,
}

impl ControllerState {
    fn stop_autoplay(&mut self) {
        if let Some(token) = self.autoplay.take() {
            token.cancel();
        }
    }
}

struct Inner {
    cache: Arc<GalleryCache>,
    host: Arc<dyn DocumentHost>,
    autoplay_every: Duration,
    state: Mutex<ControllerState>,
    /// Parent of every task this controller spawns.
    cancel: CancellationToken,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Lightbox bound to one gallery cache and one host page.
///
/// Must be created inside a Tokio runtime: construction spawns the task that
/// listens for cache events.
pub struct LightboxController {
    inner: Arc<Inner>,
}

impl LightboxController {
    pub fn new(
        cache: Arc<GalleryCache>,
        host: Arc<dyn DocumentHost>,
        autoplay_every: Duration,
    ) -> Self {
        let inner = Arc::new(Inner {
            cache,
            host,
            autoplay_every,
            state: Mutex::new(ControllerState::default()),
            cancel: CancellationToken::new(),
        });
        spawn_event_listener(&inner);
        Self { inner }
    }

    /// Current state machine value.
    pub async fn state(&self) -> Lightbox {
        self.inner.state.lock().await.lightbox.clone()
    }

    /// The item currently shown, if open.
    pub async fn current_item(&self) -> Option<GalleryItem> {
        let (key, index) = {
            let state = self.inner.state.lock().await;
            (state.key.clone()?, state.lightbox.index()?)
        };
        self.inner.cache.item_at(&key, index).await
    }

    /// Open on item `index` of `key`'s loaded sequence.
    pub async fn open(&self, key: QueryKey, index: usize) {
        let mut state = self.inner.state.lock().await;
        state.stop_autoplay();
        state.lightbox.open(index);
        state.key = Some(key);
        if state.scroll_lock.is_none() {
            state.scroll_lock = Some(ScrollLock::acquire(Arc::clone(&self.inner.host)));
        }
        tracing::debug!(index, "Lightbox opened");
    }

    pub async fn close(&self) {
        self.inner.close().await;
    }

    /// Advance, fetching the next page when the loaded items run out.
    pub async fn next(&self) -> Result<NavOutcome, GalleryError> {
        self.inner.next().await
    }

    /// Step back. Wraps to the last item only when everything is loaded.
    pub async fn prev(&self) -> NavOutcome {
        let mut state = self.inner.state.lock().await;
        let Some(key) = state.key.clone() else {
            return NavOutcome::Stayed;
        };
        let ctx = self.inner.cache.nav_context(&key).await;
        state.lightbox.prev(ctx)
    }

    /// Flip autoplay. Returns the new value, or `None` when closed.
    pub async fn toggle_autoplay(&self) -> Option<bool> {
        let mut state = self.inner.state.lock().await;
        let enabled = state.lightbox.toggle_autoplay()?;
        state.stop_autoplay();
        if enabled {
            let token = self.inner.cancel.child_token();
            spawn_autoplay(&self.inner, token.clone());
            state.autoplay = Some(token);
        }
        tracing::debug!(enabled, "Lightbox autoplay toggled");
        Some(enabled)
    }

    pub async fn zoom_in(&self) -> Option<f64> {
        self.inner.state.lock().await.lightbox.zoom_in()
    }

    pub async fn zoom_out(&self) -> Option<f64> {
        self.inner.state.lock().await.lightbox.zoom_out()
    }

    pub async fn reset_zoom(&self) -> Option<f64> {
        self.inner.state.lock().await.lightbox.reset_zoom()
    }

    pub async fn toggle_fullscreen(&self) -> Option<bool> {
        let fullscreen = self.inner.state.lock().await.lightbox.toggle_fullscreen()?;
        self.inner.host.set_fullscreen(fullscreen);
        Some(fullscreen)
    }

    /// Escape: leave fullscreen if active, otherwise close.
    pub async fn escape(&self) -> EscapeOutcome {
        let mut state = self.inner.state.lock().await;
        let outcome = state.lightbox.escape();
        match outcome {
            EscapeOutcome::ExitedFullscreen => self.inner.host.set_fullscreen(false),
            EscapeOutcome::Closed => Inner::release(&mut state),
            EscapeOutcome::Ignored => {}
        }
        outcome
    }

    /// Dispatch a keyboard key. Returns the binding when the key is handled,
    /// so the caller knows whether to suppress the default action. Keys are
    /// ignored while closed.
    pub async fn handle_key(&self, key: &str) -> Result<Option<KeyBinding>, GalleryError> {
        let Some(binding) = key_binding(key) else {
            return Ok(None);
        };
        if !self.inner.state.lock().await.lightbox.is_open() {
            return Ok(None);
        }

        match binding.command {
            LightboxCommand::Escape => {
                self.escape().await;
            }
            LightboxCommand::Next => {
                self.next().await?;
            }
            LightboxCommand::Prev => {
                self.prev().await;
            }
            LightboxCommand::ToggleAutoplay => {
                self.toggle_autoplay().await;
            }
            LightboxCommand::ZoomIn => {
                self.zoom_in().await;
            }
            LightboxCommand::ZoomOut => {
                self.zoom_out().await;
            }
            LightboxCommand::ResetZoom => {
                self.reset_zoom().await;
            }
            LightboxCommand::ToggleFullscreen => {
                self.toggle_fullscreen().await;
            }
        }
        Ok(Some(binding))
    }
}

impl Inner {
    async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.lightbox.state().is_some_and(|s| s.fullscreen) {
            self.host.set_fullscreen(false);
        }
        state.lightbox.close();
        Self::release(&mut state);
    }

    /// Drop everything tied to an open lightbox.
    fn release(state: &mut ControllerState) {
        state.stop_autoplay();
        state.key = None;
        state.scroll_lock = None;
        tracing::debug!("Lightbox closed");
    }

    async fn next(&self) -> Result<NavOutcome, GalleryError> {
        let key = {
            let mut state = self.state.lock().await;
            let Some(key) = state.key.clone() else {
                return Ok(NavOutcome::Stayed);
            };
            let ctx = self.cache.nav_context(&key).await;
            let outcome = state.lightbox.next(ctx);
            if outcome != NavOutcome::FetchRequested {
                return Ok(outcome);
            }
            key
        };

        match self.cache.fetch_next_page(&key).await {
            // Another fetch is pending; its PageLoaded event resolves the advance.
            Ok(FetchOutcome::AlreadyInFlight) => Ok(NavOutcome::AwaitingFetch),
            Ok(_) => {
                let resolved = self.resolve_pending(&key).await;
                Ok(match resolved {
                    NavOutcome::Stayed => NavOutcome::FetchRequested,
                    moved => moved,
                })
            }
            Err(e) => {
                self.state.lock().await.lightbox.cancel_pending();
                Err(e)
            }
        }
    }

    /// Complete a pending advance for `key` if the next item is loaded now.
    async fn resolve_pending(&self, key: &QueryKey) -> NavOutcome {
        let mut state = self.state.lock().await;
        if state.key.as_ref() != Some(key) {
            return NavOutcome::Stayed;
        }
        let ctx = self.cache.nav_context(key).await;
        state.lightbox.resolve_pending(ctx)
    }

    async fn cancel_pending(&self, key: &QueryKey) {
        let mut state = self.state.lock().await;
        if state.key.as_ref() == Some(key) {
            state.lightbox.cancel_pending();
        }
    }
}

// ---------------------------------------------------------------------------
// Background tasks
// ---------------------------------------------------------------------------

/// Resolve or drop pending advances as the cache reports fetch results.
fn spawn_event_listener(inner: &Arc<Inner>) {
    let weak: Weak<Inner> = Arc::downgrade(inner);
    let cancel = inner.cancel.clone();
    let mut events = inner.cache.subscribe();

    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => break,
                received = events.recv() => received,
            };
            let Some(inner) = weak.upgrade() else { break };
            match received {
                Ok(CacheEvent::PageLoaded { key, .. }) => {
                    if let NavOutcome::Moved(index) = inner.resolve_pending(&key).await {
                        tracing::debug!(index, "Lightbox advanced after page load");
                    }
                }
                Ok(
                    CacheEvent::FetchFailed { key, .. } | CacheEvent::FetchAbandoned { key, .. },
                ) => inner.cancel_pending(&key).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Lightbox missed cache events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Call `next` every `autoplay_every` until `token` is cancelled.
fn spawn_autoplay(inner: &Arc<Inner>, token: CancellationToken) {
    let weak: Weak<Inner> = Arc::downgrade(inner);
    let period = inner.autoplay_every;

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(inner) = weak.upgrade() else { break };
                    if let Err(e) = inner.next().await {
                        tracing::warn!(error = %e, "Autoplay advance failed");
                    }
                }
            }
        }
    });
}
