//! Late and soon-due phase alerts

use crate::aggregator::PhaseRow;
use crate::status::PhaseStatus;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Why a phase is flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AlertKind {
    /// Planned end is past
    Late {
        /// Whole days past the planned end
        days_late: u32,
    },
    /// Planned end falls within the horizon
    DueSoon {
        /// Whole days until the planned end; 0 means today
        days_remaining: u32,
    },
}

/// A flagged phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    #[serde(flatten)]
    pub kind: AlertKind,
    pub row: PhaseRow,
}

/// Late phases first, most overdue first, then open phases due within
/// `horizon_days` of `reference`, soonest first. Ties keep input order.
#[must_use]
pub fn alerts(rows: &[PhaseRow], reference: NaiveDateTime, horizon_days: u32) -> Vec<Alert> {
    let today = reference.date();

    let mut late: Vec<Alert> = rows
        .iter()
        .filter(|row| row.derived.status == PhaseStatus::Late)
        .map(|row| Alert {
            kind: AlertKind::Late {
                days_late: row.derived.days_late,
            },
            row: row.clone(),
        })
        .collect();
    late.sort_by(|a, b| days_late_of(b).cmp(&days_late_of(a)));

    let mut due_soon: Vec<Alert> = rows
        .iter()
        .filter(|row| {
            matches!(
                row.derived.status,
                PhaseStatus::InProgress | PhaseStatus::Planned
            )
        })
        .filter_map(|row| {
            let end = row.phase.planned_end().ok()?;
            let remaining = u32::try_from((end - today).num_days()).ok()?;
            (remaining <= horizon_days).then(|| Alert {
                kind: AlertKind::DueSoon {
                    days_remaining: remaining,
                },
                row: row.clone(),
            })
        })
        .collect();
    due_soon.sort_by_key(days_remaining_of);

    tracing::debug!(late = late.len(), due_soon = due_soon.len(), "computed alerts");
    late.extend(due_soon);
    late
}

fn days_late_of(alert: &Alert) -> u32 {
    match alert.kind {
        AlertKind::Late { days_late } => days_late,
        AlertKind::DueSoon { .. } => 0,
    }
}

fn days_remaining_of(alert: &Alert) -> u32 {
    match alert.kind {
        AlertKind::DueSoon { days_remaining } => days_remaining,
        AlertKind::Late { .. } => 0,
    }
}
