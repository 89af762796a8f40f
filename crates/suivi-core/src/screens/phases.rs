//! Phases board: every phase grouped by project, plus calendar spans

use super::Screen;
use crate::error::ScreenError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use suivi_api::TrackingApi;
use suivi_model::ProjectRef;
use suivi_status::{
    calendar_entries, CalendarEntry, PhaseStatusAggregator, ProjectGroup, StatusCounts,
};

/// Phases board data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhasesView {
    /// Projects in first-seen order
    pub projects: Vec<ProjectGroup>,
    /// Dated phases as calendar spans
    pub calendar: Vec<CalendarEntry>,
    /// Phases per status across all shown projects
    pub counts: StatusCounts,
    /// Records dropped as malformed
    pub skipped_records: usize,
}

/// Phases board, optionally restricted to one project
#[derive(Debug, Clone, Default)]
pub struct PhasesScreen {
    project: Option<ProjectRef>,
}

impl PhasesScreen {
    /// Board for all projects
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Board for one project
    #[inline]
    #[must_use]
    pub fn for_project(project: impl Into<ProjectRef>) -> Self {
        Self {
            project: Some(project.into()),
        }
    }
}

#[async_trait]
impl Screen for PhasesScreen {
    type View = PhasesView;

    fn name(&self) -> &'static str {
        "phases"
    }

    async fn load(
        &self,
        api: &dyn TrackingApi,
        now: NaiveDateTime,
    ) -> Result<PhasesView, ScreenError> {
        let (phases, progress) = tokio::try_join!(api.list_phases(), api.list_task_progress())
            .map_err(|e| ScreenError::fetch(self.name(), e))?;

        let mut records = phases.items;
        if let Some(project) = &self.project {
            records.retain(|p| &p.ref_projet == project);
        }

        let aggregator = PhaseStatusAggregator::new(now).with_progress(&progress.items);
        let projects: Vec<ProjectGroup> = aggregator
            .group_by_project(&records)
            .into_values()
            .collect();
        let counts = StatusCounts::tally(projects.iter().flat_map(|g| g.statuses()));
        let calendar = calendar_entries(&projects);
        tracing::debug!(
            projects = projects.len(),
            phases = counts.total(),
            late = counts.late,
            "phases board ready"
        );

        Ok(PhasesView {
            projects,
            calendar,
            counts,
            skipped_records: phases.skipped + progress.skipped,
        })
    }
}
