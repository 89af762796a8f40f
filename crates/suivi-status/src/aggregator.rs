//! Phase status aggregator
//!
//! Binds a reference instant and a task progress index, then derives the
//! display state of every phase handed to it. Derived values are never
//! cached: a new load builds a new aggregator.

use crate::grouping::{self, ProjectGroup};
use crate::leaderboard::{self, PerformerEntry, WeekWindow};
use crate::progress::ProgressIndex;
use crate::status::{self, PhaseStatus};
use chrono::{Local, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;
use suivi_model::{CompletionEvent, PhaseRecord, ProjectRef, TaskProgress, User};

/// Derived state of one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedPhaseStatus {
    /// Lifecycle status
    pub status: PhaseStatus,
    /// Whole days past the planned end; 0 unless late
    pub days_late: u32,
    /// Rounded task completion, 0-100
    pub progress_percent: u8,
}

/// A phase with its derived state, ready to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseRow {
    /// Source record, untouched
    #[serde(flatten)]
    pub phase: PhaseRecord,
    /// Derived state
    #[serde(flatten)]
    pub derived: DerivedPhaseStatus,
}

/// Derives phase state relative to a fixed reference instant
#[derive(Debug, Clone)]
pub struct PhaseStatusAggregator {
    reference: NaiveDateTime,
    progress: ProgressIndex,
}

impl PhaseStatusAggregator {
    /// Aggregator anchored at `reference`, with no task progress
    #[inline]
    #[must_use]
    pub fn new(reference: NaiveDateTime) -> Self {
        Self {
            reference,
            progress: ProgressIndex::default(),
        }
    }

    /// Aggregator anchored at the current local time
    #[inline]
    #[must_use]
    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// With task progress rows
    #[must_use]
    pub fn with_progress(mut self, rows: &[TaskProgress]) -> Self {
        self.progress = ProgressIndex::new(rows);
        self
    }

    /// Reference instant
    #[inline]
    #[must_use]
    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    /// Lifecycle status of `phase`
    #[inline]
    #[must_use]
    pub fn classify(&self, phase: &PhaseRecord) -> PhaseStatus {
        status::classify(phase, self.reference)
    }

    /// Raw whole-day difference between the planned end and the reference day
    #[inline]
    #[must_use]
    pub fn days_late(&self, phase: &PhaseRecord) -> Option<i64> {
        status::days_late(phase, self.reference)
    }

    /// Completion percentage of `phase` from the bound progress rows
    #[inline]
    #[must_use]
    pub fn progress(&self, phase: &PhaseRecord) -> u8 {
        self.progress.percent_for(phase)
    }

    /// Full derived state of `phase`
    #[must_use]
    pub fn derive(&self, phase: &PhaseRecord) -> DerivedPhaseStatus {
        let status = self.classify(phase);
        let days_late = match status {
            PhaseStatus::Late => self
                .days_late(phase)
                .and_then(|d| u32::try_from(d.max(0)).ok())
                .unwrap_or(0),
            _ => 0,
        };
        DerivedPhaseStatus {
            status,
            days_late,
            progress_percent: self.progress(phase),
        }
    }

    /// `phase` paired with its derived state
    #[must_use]
    pub fn row(&self, phase: &PhaseRecord) -> PhaseRow {
        PhaseRow {
            phase: phase.clone(),
            derived: self.derive(phase),
        }
    }

    /// Rows for every phase, in input order
    #[must_use]
    pub fn rows(&self, phases: &[PhaseRecord]) -> Vec<PhaseRow> {
        phases.iter().map(|p| self.row(p)).collect()
    }

    /// Rows grouped by project, projects and phases in first-seen order
    #[must_use]
    pub fn group_by_project(&self, phases: &[PhaseRecord]) -> IndexMap<ProjectRef, ProjectGroup> {
        grouping::group_by_project(self.rows(phases))
    }

    /// Completion leaderboard for the week containing the reference instant
    #[must_use]
    pub fn weekly_top_performers(
        &self,
        events: &[CompletionEvent],
        users: &[User],
    ) -> Vec<PerformerEntry> {
        let week = WeekWindow::containing(self.reference);
        leaderboard::top_performers(events, week.start, week.end, users)
    }
}
