//! Suivi Core - dashboard screens
//!
//! Turns API payloads into ready-to-render view-models:
//! - phases board (grouped by project, with calendar spans)
//! - projects overview (one rollup per project)
//! - admin dashboard (counts and weekly leaderboard)
//! - alerts feed (late and soon-due phases)
//!
//! Screens are refreshed explicitly through a [`Refresher`]; the aggregation
//! itself knows nothing about time beyond the reference instant it is given.
//!
//! # Example
//!
//! ```rust,ignore
//! use suivi_core::{load_screen, PhasesScreen};
//!
//! let loaded = load_screen(&PhasesScreen::new(), &api, now).await;
//! if let Some(message) = &loaded.error {
//!     eprintln!("{message}");
//! }
//! ```

#![warn(unreachable_pub)]

pub mod actions;
pub mod config;
pub mod error;
pub mod refresh;
pub mod screens;

pub use actions::ActionError;
pub use config::{ConfigError, DashboardConfig};
pub use error::ScreenError;
pub use refresh::{Clock, RefreshHandle, Refresher};
pub use screens::{
    load_cancellable, load_screen, AdminScreen, AdminView, AlertsScreen, AlertsView, Loaded,
    PhasesScreen, PhasesView, ProjectsScreen, ProjectsView, Screen,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
