//! Plain-text rendering of screen views

use chrono::NaiveDate;
use suivi_core::{AdminView, AlertsView, Loaded, PhasesView, ProjectsView};
use suivi_model::date::DateError;
use suivi_status::{AlertKind, PhaseRow, PhaseStatus, StatusCounts};

/// Views that can be printed as text
pub(crate) trait TextView {
    fn lines(&self) -> Vec<String>;
}

/// Text for a load result, including its error and skipped-record notes
pub(crate) fn text<V: TextView>(loaded: &Loaded<V>) -> String {
    let mut out = Vec::new();
    if let Some(at) = loaded.loaded_at {
        out.push(format!("as of {}", at.format("%Y-%m-%d %H:%M")));
    }
    match &loaded.error {
        Some(message) => out.push(format!("error: {message}")),
        None => out.extend(loaded.view.lines()),
    }
    out.join("\n")
}

fn day(date: Result<NaiveDate, DateError>) -> String {
    date.map_or_else(|_| "?".to_string(), |d| d.to_string())
}

fn dates(row: &PhaseRow) -> String {
    format!(
        "{}..{}",
        day(row.phase.start_date()),
        day(row.phase.planned_end())
    )
}

fn status(row: &PhaseRow) -> String {
    let derived = &row.derived;
    if !derived.status.is_open() {
        return match row.phase.actual_end() {
            Ok(on) => format!("{} {on}", derived.status),
            Err(_) => derived.status.to_string(),
        };
    }
    if derived.days_late > 0 {
        format!("{} ({} d)", derived.status, derived.days_late)
    } else {
        derived.status.to_string()
    }
}

/// Per-status counts in display order
fn counts(c: &StatusCounts) -> String {
    PhaseStatus::ALL
        .iter()
        .map(|&s| format!("{} {s}", c.get(s)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn skipped(n: usize) -> Option<String> {
    (n > 0).then(|| format!("{n} malformed record(s) skipped"))
}

impl TextView for PhasesView {
    fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        for group in &self.projects {
            out.push(format!("{}  {}", group.ref_projet, group.nom_projet));
            for row in &group.phases {
                out.push(format!(
                    "  {:<6} {:<24} {}  {:<20} {:>3}%",
                    row.phase.id_phase.as_str(),
                    row.phase.libelle_phase,
                    dates(row),
                    status(row),
                    row.derived.progress_percent
                ));
            }
        }
        if self.projects.is_empty() {
            out.push("no phases".to_string());
        }
        out.push(counts(&self.counts));
        out.extend(skipped(self.skipped_records));
        out
    }
}

impl TextView for ProjectsView {
    fn lines(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .projects
            .iter()
            .map(|p| {
                format!(
                    "{:<8} {:<24} {:<12} {:>3}%  ({})",
                    p.ref_projet.as_str(),
                    p.nom_projet,
                    p.status.as_str(),
                    p.progress_percent,
                    counts(&p.counts)
                )
            })
            .collect();
        if out.is_empty() {
            out.push("no projects".to_string());
        }
        out.extend(skipped(self.skipped_records));
        out
    }
}

impl TextView for AlertsView {
    fn lines(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .alerts
            .iter()
            .map(|a| {
                let what = match a.kind {
                    AlertKind::Late { days_late } => format!("LATE  {days_late} d"),
                    AlertKind::DueSoon { days_remaining: 0 } => "DUE   today".to_string(),
                    AlertKind::DueSoon { days_remaining } => {
                        format!("DUE   in {days_remaining} d")
                    }
                };
                let phase = &a.row.phase;
                format!(
                    "{:<12} {}/{}  {}",
                    what, phase.ref_projet, phase.id_phase, phase.libelle_phase
                )
            })
            .collect();
        if out.is_empty() {
            out.push("nothing to report".to_string());
        }
        out.extend(skipped(self.skipped_records));
        out
    }
}

impl TextView for AdminView {
    fn lines(&self) -> Vec<String> {
        let mut out = vec![
            format!("users:    {}", self.total_users),
            format!("projects: {}", self.total_projects),
            format!("modules:  {}", self.total_modules),
            format!("phases:   {}", counts(&self.phase_counts)),
        ];
        if let Some(week) = &self.week {
            out.push(format!(
                "top performers {}..{}",
                week.start.date(),
                week.end.date()
            ));
        }
        for (rank, entry) in self.leaderboard.iter().enumerate() {
            out.push(format!(
                "  {}. {} {} ({})  {}",
                rank + 1,
                entry.prenom,
                entry.nom,
                entry.matricule,
                entry.completed
            ));
        }
        out.extend(skipped(self.skipped_records));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use suivi_status::PhaseStatusAggregator;
    use suivi_test_utils::{at, phase, ymd};

    #[test]
    fn phases_text_shows_lateness_and_progress() {
        let now = at(ymd(2024, 5, 15), 10, 0);
        let agg = PhaseStatusAggregator::new(now);
        let view = PhasesView {
            projects: agg
                .group_by_project(&[phase("P1", "1", ymd(2024, 5, 1), ymd(2024, 5, 10))])
                .into_values()
                .collect(),
            counts: StatusCounts::tally([PhaseStatus::Late]),
            ..PhasesView::default()
        };
        let lines = view.lines();
        assert_eq!(lines[0], "P1  Projet P1");
        assert!(lines[1].contains("2024-05-01..2024-05-10"));
        assert!(lines[1].contains("late (5 d)"));
        assert!(lines[1].ends_with("0%"));
        assert_eq!(lines[2], "0 completed, 1 late, 0 in-progress, 0 planned");
    }

    #[test]
    fn completed_phase_shows_its_actual_end() {
        let now = at(ymd(2024, 5, 15), 10, 0);
        let done =
            phase("P2", "4", ymd(2024, 4, 1), ymd(2024, 4, 30)).completed_on(ymd(2024, 4, 29));
        let mut unparsable = phase("P2", "5", ymd(2024, 4, 1), ymd(2024, 4, 30));
        unparsable.date_fin_reelle = Some("soon".to_string());

        let agg = PhaseStatusAggregator::new(now);
        assert_eq!(status(&agg.row(&done)), "completed 2024-04-29");
        // unparsable actual end still counts as completed, without a date
        assert_eq!(status(&agg.row(&unparsable)), "completed");
    }

    #[test]
    fn error_replaces_the_view() {
        let loaded = Loaded {
            view: AlertsView::default(),
            error: Some("Server unreachable, try refreshing later".to_string()),
            loaded_at: None,
        };
        assert_eq!(text(&loaded), "error: Server unreachable, try refreshing later");
    }

    #[test]
    fn empty_views_say_so() {
        assert_eq!(
            ProjectsView::default().lines(),
            ["no projects".to_string()]
        );
        let alerts = AlertsView {
            skipped_records: 2,
            ..AlertsView::default()
        };
        assert_eq!(
            alerts.lines(),
            [
                "nothing to report".to_string(),
                "2 malformed record(s) skipped".to_string()
            ]
        );
    }
}
