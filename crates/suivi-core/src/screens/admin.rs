//! Admin dashboard: headline counts and the weekly leaderboard

use super::Screen;
use crate::error::ScreenError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use suivi_api::TrackingApi;
use suivi_status::{PerformerEntry, PhaseStatusAggregator, StatusCounts, WeekWindow};

/// Admin dashboard data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminView {
    pub total_users: usize,
    pub total_projects: usize,
    pub total_modules: usize,
    /// Phases per status
    pub phase_counts: StatusCounts,
    /// Week the leaderboard covers
    pub week: Option<WeekWindow>,
    /// Best performers of the week, most completions first
    pub leaderboard: Vec<PerformerEntry>,
    /// Records dropped as malformed
    pub skipped_records: usize,
}

/// Admin dashboard
#[derive(Debug, Clone, Copy)]
pub struct AdminScreen {
    leaderboard_size: usize,
}

impl AdminScreen {
    /// Dashboard showing the top `leaderboard_size` users
    #[inline]
    #[must_use]
    pub fn new(leaderboard_size: usize) -> Self {
        Self { leaderboard_size }
    }
}

impl Default for AdminScreen {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl Screen for AdminScreen {
    type View = AdminView;

    fn name(&self) -> &'static str {
        "admin"
    }

    async fn load(
        &self,
        api: &dyn TrackingApi,
        now: NaiveDateTime,
    ) -> Result<AdminView, ScreenError> {
        let (users, projects, modules, phases, events) = tokio::try_join!(
            api.list_users(),
            api.list_projects(),
            api.list_modules(),
            api.list_phases(),
            api.list_completion_events()
        )
        .map_err(|e| ScreenError::fetch(self.name(), e))?;

        let aggregator = PhaseStatusAggregator::new(now);
        let phase_counts =
            StatusCounts::tally(phases.items.iter().map(|p| aggregator.classify(p)));

        let mut leaderboard = aggregator.weekly_top_performers(&events.items, &users.items);
        leaderboard.truncate(self.leaderboard_size);

        Ok(AdminView {
            total_users: users.items.len(),
            total_projects: projects.items.len(),
            total_modules: modules.items.len(),
            phase_counts,
            week: Some(WeekWindow::containing(now)),
            leaderboard,
            skipped_records: users.skipped
                + projects.skipped
                + modules.skipped
                + phases.skipped
                + events.skipped,
        })
    }
}
