//! Grouping of phase rows by project

use crate::aggregator::PhaseRow;
use crate::status::PhaseStatus;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use suivi_model::{PhaseId, ProjectRef};

/// The phases of one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectGroup {
    /// Project reference
    pub ref_projet: ProjectRef,
    /// Project name as first seen
    pub nom_projet: String,
    /// Phases in input order
    pub phases: Vec<PhaseRow>,
}

impl ProjectGroup {
    /// Statuses of the group's phases
    pub fn statuses(&self) -> impl Iterator<Item = PhaseStatus> + '_ {
        self.phases.iter().map(|row| row.derived.status)
    }
}

/// Group rows by `ref_projet`.
///
/// Projects appear in the order their first phase appears. The project name
/// is taken from that first phase; later rows with a different name do not
/// override it. Phase order within a group is input order.
#[must_use]
pub fn group_by_project(rows: Vec<PhaseRow>) -> IndexMap<ProjectRef, ProjectGroup> {
    let mut groups: IndexMap<ProjectRef, ProjectGroup> = IndexMap::new();
    for row in rows {
        groups
            .entry(row.phase.ref_projet.clone())
            .or_insert_with(|| ProjectGroup {
                ref_projet: row.phase.ref_projet.clone(),
                nom_projet: row.phase.nom_projet.clone(),
                phases: Vec::new(),
            })
            .phases
            .push(row);
    }
    tracing::debug!(projects = groups.len(), "grouped phases by project");
    groups
}

/// One bar of the calendar view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    /// Owning project
    pub ref_projet: ProjectRef,
    /// Project name
    pub nom_projet: String,
    /// Phase
    pub id_phase: PhaseId,
    /// Phase name
    pub libelle_phase: String,
    /// First day
    pub start: NaiveDate,
    /// Last planned day
    pub end: NaiveDate,
    /// Derived status
    pub status: PhaseStatus,
}

/// Flatten groups into calendar spans.
///
/// Phases whose start or planned end cannot be read have no span and are
/// left out.
#[must_use]
pub fn calendar_entries<'a>(
    groups: impl IntoIterator<Item = &'a ProjectGroup>,
) -> Vec<CalendarEntry> {
    let mut entries = Vec::new();
    for group in groups {
        for row in &group.phases {
            let (Ok(start), Ok(end)) = (row.phase.start_date(), row.phase.planned_end()) else {
                tracing::debug!(
                    ref_projet = %row.phase.ref_projet,
                    id_phase = %row.phase.id_phase,
                    "phase has no calendar span"
                );
                continue;
            };
            entries.push(CalendarEntry {
                ref_projet: group.ref_projet.clone(),
                nom_projet: group.nom_projet.clone(),
                id_phase: row.phase.id_phase.clone(),
                libelle_phase: row.phase.libelle_phase.clone(),
                start,
                end,
                status: row.derived.status,
            });
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::PhaseStatusAggregator;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;
    use suivi_model::PhaseRecord;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn aggregator() -> PhaseStatusAggregator {
        PhaseStatusAggregator::new(ymd(2024, 6, 10).and_time(NaiveTime::MIN))
    }

    #[test]
    fn groups_in_first_seen_order() {
        let phases = vec![
            PhaseRecord::new("P1", "a").with_names("Alpha", "Cadrage"),
            PhaseRecord::new("P1", "b").with_names("Alpha renamed", "Recette"),
            PhaseRecord::new("P2", "a").with_names("Beta", "Cadrage"),
        ];
        let groups = aggregator().group_by_project(&phases);

        assert_eq!(groups.len(), 2);
        let keys: Vec<&str> = groups.keys().map(ProjectRef::as_str).collect();
        assert_eq!(keys, vec!["P1", "P2"]);

        let p1 = &groups[&ProjectRef::from("P1")];
        assert_eq!(p1.nom_projet, "Alpha");
        let ids: Vec<&str> = p1.phases.iter().map(|r| r.phase.id_phase.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(groups[&ProjectRef::from("P2")].phases.len(), 1);
    }

    #[test]
    fn interleaved_projects_keep_phase_order() {
        let phases = vec![
            PhaseRecord::new("P1", "1"),
            PhaseRecord::new("P2", "1"),
            PhaseRecord::new("P1", "2"),
        ];
        let groups = aggregator().group_by_project(&phases);
        let p1: Vec<&str> = groups[&ProjectRef::from("P1")]
            .phases
            .iter()
            .map(|r| r.phase.id_phase.as_str())
            .collect();
        assert_eq!(p1, vec!["1", "2"]);
    }

    #[test]
    fn calendar_skips_undated_phases() {
        let phases = vec![
            PhaseRecord::new("P1", "1").with_schedule(ymd(2024, 6, 1), ymd(2024, 6, 30)),
            PhaseRecord::new("P1", "2"),
        ];
        let groups = aggregator().group_by_project(&phases);
        let entries = calendar_entries(groups.values());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, PhaseStatus::InProgress);
        assert_eq!(entries[0].end, ymd(2024, 6, 30));
    }
}
