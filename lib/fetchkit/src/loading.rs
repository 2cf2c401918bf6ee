//! In-flight call tracking for the loading indicator.
//!
//! Every call made with `show_loading` holds a [`LoadingGuard`] for its whole
//! lifetime. The indicator is shown when the first guard is taken and hidden
//! [`DEFAULT_HIDE_DELAY`] after the last one is dropped, unless another call
//! starts inside that window.
//!
//! ```ignore
//! use fetchkit::{LoadingIndicator, LoadingTracker};
//!
//! struct Spinner;
//!
//! impl LoadingIndicator for Spinner {
//!     fn show(&self) { /* ... */ }
//!     fn hide(&self) { /* ... */ }
//! }
//!
//! let tracker = LoadingTracker::new(Spinner);
//! let guard = tracker.acquire();
//! assert_eq!(tracker.in_flight(), 1);
//! drop(guard);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Debounce between the last call finishing and the indicator hiding.
pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_millis(300);

/// The visual side of the tracker.
///
/// Both methods are called with the tracker's lock held and must not call
/// back into the tracker.
pub trait LoadingIndicator: Send + Sync + 'static {
    /// The first tracked call started.
    fn show(&self);

    /// No tracked call is running and the debounce elapsed.
    fn hide(&self);
}

/// Indicator that does nothing, for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIndicator;

impl LoadingIndicator for NoopIndicator {
    fn show(&self) {}
    fn hide(&self) {}
}

#[derive(Default)]
struct State {
    count: usize,
    visible: bool,
    generation: u64,
    pending_hide: Option<JoinHandle<()>>,
}

struct Inner {
    indicator: Box<dyn LoadingIndicator>,
    hide_delay: Duration,
    state: Mutex<State>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hide_if_current(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation == generation && state.count == 0 && state.visible {
            state.visible = false;
            state.pending_hide = None;
            trace!("hiding loading indicator");
            self.indicator.hide();
        }
    }
}

/// Shared tally of in-flight calls that drive the loading indicator.
///
/// Cloning is cheap and every clone observes the same count.
#[derive(Clone)]
pub struct LoadingTracker {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for LoadingTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("LoadingTracker")
            .field("in_flight", &state.count)
            .field("visible", &state.visible)
            .field("hide_delay", &self.inner.hide_delay)
            .finish()
    }
}

impl Default for LoadingTracker {
    fn default() -> Self {
        Self::new(NoopIndicator)
    }
}

impl LoadingTracker {
    /// A tracker driving `indicator`, hiding after [`DEFAULT_HIDE_DELAY`].
    #[must_use]
    pub fn new(indicator: impl LoadingIndicator) -> Self {
        Self::with_hide_delay(indicator, DEFAULT_HIDE_DELAY)
    }

    /// A tracker with a custom hide debounce.
    #[must_use]
    pub fn with_hide_delay(indicator: impl LoadingIndicator, hide_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                indicator: Box::new(indicator),
                hide_delay,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Counts one more in-flight call until the guard is dropped.
    #[must_use = "the call is only tracked while the guard is alive"]
    pub fn acquire(&self) -> LoadingGuard {
        let mut state = self.inner.lock();
        state.count += 1;
        state.generation = state.generation.wrapping_add(1);

        if let Some(pending) = state.pending_hide.take() {
            pending.abort();
        }

        if !state.visible {
            state.visible = true;
            trace!("showing loading indicator");
            self.inner.indicator.show();
        }

        LoadingGuard {
            tracker: self.clone(),
        }
    }

    fn release(&self) {
        let mut state = self.inner.lock();
        state.count = state.count.saturating_sub(1);
        if state.count > 0 || !state.visible {
            return;
        }

        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;
        let delay = self.inner.hide_delay;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) if !delay.is_zero() => {
                trace!(?delay, "scheduling loading indicator hide");
                let inner = Arc::clone(&self.inner);
                state.pending_hide = Some(handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    inner.hide_if_current(generation);
                }));
            }
            _ => {
                state.visible = false;
                trace!("hiding loading indicator");
                self.inner.indicator.hide();
            }
        }
    }

    /// Number of calls currently holding a guard.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.lock().count
    }

    /// Whether the indicator is currently shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.inner.lock().visible
    }

    /// The hide debounce.
    #[must_use]
    pub fn hide_delay(&self) -> Duration {
        self.inner.hide_delay
    }
}

/// Keeps one call counted; see [`LoadingTracker::acquire`].
#[derive(Debug)]
pub struct LoadingGuard {
    tracker: LoadingTracker,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.tracker.release();
    }
}
