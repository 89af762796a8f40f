//! Alerts feed: overdue phases, then phases due soon

use super::Screen;
use crate::error::ScreenError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use suivi_api::TrackingApi;
use suivi_status::{alerts, Alert, PhaseStatusAggregator};

/// Alerts feed data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertsView {
    pub alerts: Vec<Alert>,
    /// Records dropped as malformed
    pub skipped_records: usize,
}

impl AlertsView {
    /// Number of overdue phases
    #[must_use]
    pub fn late_count(&self) -> usize {
        self.alerts
            .iter()
            .filter(|a| matches!(a.kind, suivi_status::AlertKind::Late { .. }))
            .count()
    }
}

/// Alerts feed
#[derive(Debug, Clone, Copy)]
pub struct AlertsScreen {
    upcoming_days: u32,
}

impl AlertsScreen {
    /// Feed flagging open phases due within `upcoming_days`
    #[inline]
    #[must_use]
    pub fn new(upcoming_days: u32) -> Self {
        Self { upcoming_days }
    }
}

impl Default for AlertsScreen {
    fn default() -> Self {
        Self::new(7)
    }
}

#[async_trait]
impl Screen for AlertsScreen {
    type View = AlertsView;

    fn name(&self) -> &'static str {
        "alerts"
    }

    async fn load(
        &self,
        api: &dyn TrackingApi,
        now: NaiveDateTime,
    ) -> Result<AlertsView, ScreenError> {
        let (phases, progress) = tokio::try_join!(api.list_phases(), api.list_task_progress())
            .map_err(|e| ScreenError::fetch(self.name(), e))?;

        let aggregator = PhaseStatusAggregator::new(now).with_progress(&progress.items);
        let rows = aggregator.rows(&phases.items);

        Ok(AlertsView {
            alerts: alerts(&rows, now, self.upcoming_days),
            skipped_records: phases.skipped + progress.skipped,
        })
    }
}
