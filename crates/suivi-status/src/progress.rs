//! Task completion percentages

use std::collections::HashMap;
use suivi_model::{PhaseId, PhaseRecord, ProjectRef, TaskCounts, TaskProgress};

/// Rounded completion percentage, 0 when the phase has no tasks.
///
/// Counts where more tasks are finished than exist are capped at 100.
#[must_use]
pub fn progress(counts: &TaskCounts) -> u8 {
    if counts.total_taches == 0 {
        return 0;
    }
    let ratio = f64::from(counts.taches_terminees) / f64::from(counts.total_taches);
    (ratio * 100.0).round().min(100.0) as u8
}

/// Rounded mean of several percentages, 0 for an empty slice.
#[must_use]
pub fn mean_progress(percents: &[u8]) -> u8 {
    if percents.is_empty() {
        return 0;
    }
    let sum: u32 = percents.iter().map(|&p| u32::from(p)).sum();
    (f64::from(sum) / percents.len() as f64).round() as u8
}

/// Task counts looked up by `(ref_projet, id_phase)`
#[derive(Debug, Clone, Default)]
pub struct ProgressIndex {
    by_phase: HashMap<(ProjectRef, PhaseId), TaskCounts>,
}

impl ProgressIndex {
    /// Build from progress rows; a later row for the same phase replaces an
    /// earlier one.
    #[must_use]
    pub fn new(rows: &[TaskProgress]) -> Self {
        let by_phase = rows.iter().map(|row| (row.key(), row.counts)).collect();
        Self { by_phase }
    }

    /// Counts for `phase`, if the API reported any
    #[inline]
    #[must_use]
    pub fn counts_for(&self, phase: &PhaseRecord) -> Option<&TaskCounts> {
        self.by_phase.get(&phase.key())
    }

    /// Percentage for `phase`; phases without rows are at 0
    #[inline]
    #[must_use]
    pub fn percent_for(&self, phase: &PhaseRecord) -> u8 {
        self.counts_for(phase).map_or(0, progress)
    }

    /// Number of indexed phases
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_phase.len()
    }

    /// Whether nothing is indexed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_phase.is_empty()
    }
}
