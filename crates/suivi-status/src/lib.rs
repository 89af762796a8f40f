//! Suivi status aggregation
//!
//! Pure derivations over API records. Nothing here performs I/O, keeps
//! state between calls, or mutates its inputs.
//!
//! # Core Concepts
//!
//! - [`classify`] / [`days_late`]: lifecycle of one phase at a reference instant
//! - [`progress`]: task completion percentage
//! - [`PhaseStatusAggregator`]: binds a reference instant and progress rows
//! - [`group_by_project`]: first-seen-order grouping of phase rows
//! - [`top_performers`]: weekly completion leaderboard
//!
//! # Example
//!
//! ```rust,ignore
//! use suivi_status::PhaseStatusAggregator;
//!
//! let agg = PhaseStatusAggregator::now().with_progress(&progress_rows);
//! for (project, group) in agg.group_by_project(&phases) {
//!     println!("{project}: {} phases", group.phases.len());
//! }
//! ```

#![warn(unreachable_pub)]

mod aggregator;
mod alerts;
mod grouping;
mod leaderboard;
mod progress;
mod rollup;
mod status;

pub use aggregator::{DerivedPhaseStatus, PhaseRow, PhaseStatusAggregator};
pub use alerts::{alerts, Alert, AlertKind};
pub use grouping::{calendar_entries, group_by_project, CalendarEntry, ProjectGroup};
pub use leaderboard::{top_performers, PerformerEntry, WeekWindow};
pub use progress::{mean_progress, progress, ProgressIndex};
pub use rollup::{project_status, rollup, ProjectRollup, StatusCounts};
pub use status::{classify, days_late, PhaseStatus};
