//! Project-level rollups and status tallies

use crate::grouping::ProjectGroup;
use crate::progress::mean_progress;
use crate::status::PhaseStatus;
use serde::Serialize;
use suivi_model::ProjectRef;

/// Number of phases per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub completed: usize,
    pub late: usize,
    pub in_progress: usize,
    pub planned: usize,
}

impl StatusCounts {
    /// Count statuses
    #[must_use]
    pub fn tally(statuses: impl IntoIterator<Item = PhaseStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            counts.add(status);
        }
        counts
    }

    /// Count one more phase
    #[inline]
    pub fn add(&mut self, status: PhaseStatus) {
        match status {
            PhaseStatus::Completed => self.completed += 1,
            PhaseStatus::Late => self.late += 1,
            PhaseStatus::InProgress => self.in_progress += 1,
            PhaseStatus::Planned => self.planned += 1,
        }
    }

    /// Count for one status
    #[inline]
    #[must_use]
    pub fn get(&self, status: PhaseStatus) -> usize {
        match status {
            PhaseStatus::Completed => self.completed,
            PhaseStatus::Late => self.late,
            PhaseStatus::InProgress => self.in_progress,
            PhaseStatus::Planned => self.planned,
        }
    }

    /// Total phases counted
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed + self.late + self.in_progress + self.planned
    }
}

/// Summary line for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRollup {
    pub ref_projet: ProjectRef,
    pub nom_projet: String,
    /// Overall status derived from the phases
    pub status: PhaseStatus,
    /// Rounded mean of phase progress
    pub progress_percent: u8,
    pub counts: StatusCounts,
}

/// Overall status of a set of phases.
///
/// Completed only when every phase is, and a project with no phases is
/// planned. Otherwise the worst open status wins: late, then in progress.
#[must_use]
pub fn project_status(counts: &StatusCounts) -> PhaseStatus {
    if counts.total() > 0 && counts.completed == counts.total() {
        PhaseStatus::Completed
    } else if counts.late > 0 {
        PhaseStatus::Late
    } else if counts.in_progress > 0 {
        PhaseStatus::InProgress
    } else {
        PhaseStatus::Planned
    }
}

/// Roll a project's phases up into one line
#[must_use]
pub fn rollup(group: &ProjectGroup) -> ProjectRollup {
    let counts = StatusCounts::tally(group.statuses());
    let percents: Vec<u8> = group
        .phases
        .iter()
        .map(|row| row.derived.progress_percent)
        .collect();
    ProjectRollup {
        ref_projet: group.ref_projet.clone(),
        nom_projet: group.nom_projet.clone(),
        status: project_status(&counts),
        progress_percent: mean_progress(&percents),
        counts,
    }
}
