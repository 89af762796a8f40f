//! Explicit refresh capability
//!
//! A [`Refresher`] owns one screen and reloads it when asked and on a fixed
//! period. Results are published on a `watch` channel, so the latest load
//! always wins. Cancelling the handle stops the loop and drops any load that
//! is still in flight; nothing is published after cancellation.

use crate::screens::{load_cancellable, Loaded, Screen};
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use std::time::Duration;
use suivi_api::TrackingApi;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Source of the reference instant for each load
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Control handle of a running refresher
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    requests: Arc<Notify>,
    cancel: CancellationToken,
}

impl RefreshHandle {
    /// Ask for a reload as soon as the current one, if any, finishes
    #[inline]
    pub fn request(&self) {
        self.requests.notify_one();
    }

    /// Stop refreshing; an in-flight load is abandoned
    #[inline]
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether [`cancel`](Self::cancel) was called
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Periodic and on-demand loader for one screen
pub struct Refresher<S: Screen> {
    screen: Arc<S>,
    api: Arc<dyn TrackingApi>,
    period: Duration,
    clock: Clock,
}

impl<S: Screen + 'static> Refresher<S> {
    /// Refresher reloading every `period`, using local time
    #[must_use]
    pub fn new(screen: S, api: Arc<dyn TrackingApi>, period: Duration) -> Self {
        Self {
            screen: Arc::new(screen),
            api,
            period,
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// With a custom clock
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Start the loop.
    ///
    /// The first load happens immediately. The receiver holds `None` until
    /// then.
    pub fn spawn(
        self,
    ) -> (
        RefreshHandle,
        watch::Receiver<Option<Loaded<S::View>>>,
        JoinHandle<()>,
    ) {
        let (tx, rx) = watch::channel(None);
        let handle = RefreshHandle {
            requests: Arc::new(Notify::new()),
            cancel: CancellationToken::new(),
        };
        let task = tokio::spawn(self.run(handle.clone(), tx));
        (handle, rx, task)
    }

    async fn run(self, handle: RefreshHandle, tx: watch::Sender<Option<Loaded<S::View>>>) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let name = self.screen.name();

        loop {
            let trigger = tokio::select! {
                _ = handle.cancel.cancelled() => break,
                _ = ticker.tick() => "timer",
                _ = handle.requests.notified() => "request",
            };
            tracing::debug!(screen = name, trigger, "refreshing");

            let now = (self.clock)();
            let Some(loaded) =
                load_cancellable(self.screen.as_ref(), self.api.as_ref(), now, &handle.cancel).await
            else {
                break;
            };
            if tx.send(Some(loaded)).is_err() {
                tracing::debug!(screen = name, "no more subscribers");
                break;
            }
        }
        tracing::info!(screen = name, "refresher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_cancel_is_observable() {
        let handle = RefreshHandle {
            requests: Arc::new(Notify::new()),
            cancel: CancellationToken::new(),
        };
        let clone = handle.clone();
        assert!(!clone.is_cancelled());
        handle.cancel();
        assert!(clone.is_cancelled());
    }
}
