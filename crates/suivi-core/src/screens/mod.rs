//! Dashboard screens
//!
//! Each screen fetches what it needs concurrently, then hands the joined
//! payloads to the aggregator. A screen never renders partial input: if any
//! of its fetches fails, the caller gets the empty view and a message.

mod admin;
mod alerts;
mod phases;
mod projects;

pub use admin::{AdminScreen, AdminView};
pub use alerts::{AlertsScreen, AlertsView};
pub use phases::{PhasesScreen, PhasesView};
pub use projects::{ProjectsScreen, ProjectsView};

use crate::error::ScreenError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use suivi_api::TrackingApi;
use tokio_util::sync::CancellationToken;

/// A loadable view-model
#[async_trait]
pub trait Screen: Send + Sync {
    /// Data handed to the presentation layer
    type View: Clone + Default + Serialize + Send + Sync + 'static;

    /// Name used in logs and errors
    fn name(&self) -> &'static str;

    /// Fetch and derive the view relative to `now`
    async fn load(&self, api: &dyn TrackingApi, now: NaiveDateTime)
        -> Result<Self::View, ScreenError>;
}

/// Result of one load cycle
#[derive(Debug, Clone, Default, Serialize)]
pub struct Loaded<V> {
    /// The view; empty when `error` is set
    pub view: V,
    /// Message to display when the load failed
    pub error: Option<String>,
    /// Reference instant of the load
    pub loaded_at: Option<NaiveDateTime>,
}

impl<V> Loaded<V> {
    /// Whether the load failed
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Load `screen`, turning a failure into an empty view plus message
pub async fn load_screen<S: Screen + ?Sized>(
    screen: &S,
    api: &dyn TrackingApi,
    now: NaiveDateTime,
) -> Loaded<S::View> {
    tracing::info!(screen = screen.name(), "loading screen");
    match screen.load(api, now).await {
        Ok(view) => Loaded {
            view,
            error: None,
            loaded_at: Some(now),
        },
        Err(e) => {
            tracing::error!(screen = screen.name(), error = %e, "screen load failed");
            Loaded {
                view: S::View::default(),
                error: Some(e.user_message()),
                loaded_at: Some(now),
            }
        }
    }
}

/// Like [`load_screen`], but yields `None` if `cancel` fires first
pub async fn load_cancellable<S: Screen + ?Sized>(
    screen: &S,
    api: &dyn TrackingApi,
    now: NaiveDateTime,
    cancel: &CancellationToken,
) -> Option<Loaded<S::View>> {
    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!(screen = screen.name(), "load cancelled");
            None
        }
        loaded = load_screen(screen, api, now) => Some(loaded),
    }
}
