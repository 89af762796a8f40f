//! Phase lifecycle classification
//!
//! Two different day normalizations are in play and they are not
//! interchangeable:
//! - [`classify`] compares end-of-day instants (23:59:59.999), so a phase due
//!   today is never late;
//! - [`days_late`] subtracts midnight from midnight and floors the result to
//!   whole days.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use suivi_model::date::{end_of_day, start_of_day};
use suivi_model::PhaseRecord;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Lifecycle status of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseStatus {
    /// Actual end recorded
    Completed,
    /// Planned end passed without an actual end
    Late,
    /// Started and not yet due
    InProgress,
    /// Not started yet
    Planned,
}

impl PhaseStatus {
    /// All statuses, in display order
    pub const ALL: [PhaseStatus; 4] = [
        PhaseStatus::Completed,
        PhaseStatus::Late,
        PhaseStatus::InProgress,
        PhaseStatus::Planned,
    ];

    /// Stable label used in reports
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PhaseStatus::Completed => "completed",
            PhaseStatus::Late => "late",
            PhaseStatus::InProgress => "in-progress",
            PhaseStatus::Planned => "planned",
        }
    }

    /// Whether the phase still needs work
    #[inline]
    #[must_use]
    pub fn is_open(self) -> bool {
        !matches!(self, PhaseStatus::Completed)
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `phase` relative to `reference`.
///
/// Rules, first match wins:
/// 1. actual end set: completed
/// 2. planned end (end of day) strictly before the end of the reference day: late
/// 3. planned start (midnight) <= reference <= planned end (end of day): in progress
/// 4. otherwise: planned
///
/// A missing or unparsable planned end never yields late or in progress.
#[must_use]
pub fn classify(phase: &PhaseRecord, reference: NaiveDateTime) -> PhaseStatus {
    if phase.is_completed() {
        return PhaseStatus::Completed;
    }

    let end = match phase.planned_end() {
        Ok(end) => end_of_day(end),
        Err(e) => {
            tracing::warn!(
                ref_projet = %phase.ref_projet,
                id_phase = %phase.id_phase,
                error = %e,
                "phase has no usable planned end, not checking lateness"
            );
            return PhaseStatus::Planned;
        }
    };

    if end < end_of_day(reference.date()) {
        return PhaseStatus::Late;
    }

    match phase.start_date() {
        Ok(start) if start_of_day(start) <= reference && reference <= end => {
            PhaseStatus::InProgress
        }
        _ => PhaseStatus::Planned,
    }
}

/// Whole days between the planned end and `reference`, both taken at midnight.
///
/// Zero means due on the reference day. Negative values mean not yet due;
/// callers only read this for late phases. `None` when the planned end is
/// missing or unparsable.
#[must_use]
pub fn days_late(phase: &PhaseRecord, reference: NaiveDateTime) -> Option<i64> {
    match phase.planned_end() {
        Ok(end) => {
            let delta = start_of_day(reference.date()) - start_of_day(end);
            Some(delta.num_milliseconds().div_euclid(MILLIS_PER_DAY))
        }
        Err(e) => {
            tracing::warn!(
                ref_projet = %phase.ref_projet,
                id_phase = %phase.id_phase,
                error = %e,
                "cannot compute days late"
            );
            None
        }
    }
}
