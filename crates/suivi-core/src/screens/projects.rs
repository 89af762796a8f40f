//! Projects overview: one rollup line per project

use super::Screen;
use crate::error::ScreenError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use suivi_api::TrackingApi;
use suivi_status::{rollup, PhaseStatusAggregator, ProjectGroup, ProjectRollup};

/// Projects overview data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectsView {
    /// Registered projects in API order, then projects only known from
    /// their phases
    pub projects: Vec<ProjectRollup>,
    /// Records dropped as malformed
    pub skipped_records: usize,
}

/// Projects overview
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectsScreen;

#[async_trait]
impl Screen for ProjectsScreen {
    type View = ProjectsView;

    fn name(&self) -> &'static str {
        "projects"
    }

    async fn load(
        &self,
        api: &dyn TrackingApi,
        now: NaiveDateTime,
    ) -> Result<ProjectsView, ScreenError> {
        let (projects, phases, progress) = tokio::try_join!(
            api.list_projects(),
            api.list_phases(),
            api.list_task_progress()
        )
        .map_err(|e| ScreenError::fetch(self.name(), e))?;

        let aggregator = PhaseStatusAggregator::new(now).with_progress(&progress.items);
        let mut groups = aggregator.group_by_project(&phases.items);

        let mut lines = Vec::with_capacity(projects.items.len().max(groups.len()));
        for project in &projects.items {
            let group = groups
                .shift_remove(&project.ref_projet)
                .unwrap_or_else(|| ProjectGroup {
                    ref_projet: project.ref_projet.clone(),
                    nom_projet: String::new(),
                    phases: Vec::new(),
                });
            let mut line = rollup(&group);
            if !project.nom_projet.is_empty() {
                line.nom_projet = project.nom_projet.clone();
            }
            lines.push(line);
        }
        if !groups.is_empty() {
            tracing::warn!(
                orphans = groups.len(),
                "phases reference projects missing from the project listing"
            );
        }
        lines.extend(groups.values().map(rollup));

        Ok(ProjectsView {
            projects: lines,
            skipped_records: projects.skipped + phases.skipped + progress.skipped,
        })
    }
}
