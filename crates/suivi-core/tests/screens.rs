//! Screen loading against the in-memory API.

use chrono::NaiveDateTime;
use pretty_assertions::assert_eq;
use suivi_core::{
    load_screen, AdminScreen, AdminView, AlertsScreen, PhasesScreen, ProjectsScreen, Screen,
    ScreenError,
};
use suivi_model::{CompletionEvent, Module, ModuleId, ProjectRef, TaskProgress, User};
use suivi_status::{AlertKind, PhaseStatus};
use suivi_test_utils::{at, phase, project, ymd, ApiState, InMemoryApi};

/// Wednesday 15 May 2024, mid-morning
fn now() -> NaiveDateTime {
    at(ymd(2024, 5, 15), 10, 0)
}

fn sample_state() -> ApiState {
    ApiState {
        phases: vec![
            phase("P1", "1", ymd(2024, 5, 1), ymd(2024, 5, 10)),
            phase("P1", "2", ymd(2024, 5, 10), ymd(2024, 5, 20)),
            phase("P2", "1", ymd(2024, 6, 1), ymd(2024, 6, 30)),
            phase("P2", "2", ymd(2024, 4, 1), ymd(2024, 4, 30)).completed_on(ymd(2024, 4, 29)),
        ],
        progress: vec![TaskProgress::new("P1", "2", 4, 2)],
        events: vec![
            CompletionEvent::new("A", at(ymd(2024, 5, 13), 9, 0)),
            CompletionEvent::new("C", at(ymd(2024, 5, 14), 16, 30)),
            CompletionEvent::new("A", at(ymd(2024, 5, 15), 8, 0)),
            // previous week
            CompletionEvent::new("B", at(ymd(2024, 5, 12), 23, 0)),
        ],
        users: vec![
            User::new("A", "Alpha", "Ann"),
            User::new("B", "Bravo", "Ben"),
            User::new("C", "Charlie", "Cyd"),
        ],
        modules: vec![Module {
            id_module: ModuleId::from("planning"),
            libelle_module: "Planning".to_string(),
        }],
        projects: vec![project("P1", "Migration"), project("P3", "Archivage")],
        skipped: 0,
    }
}

#[tokio::test]
async fn phases_board_groups_and_derives() {
    let api = InMemoryApi::new(sample_state());
    let loaded = load_screen(&PhasesScreen::new(), &api, now()).await;

    assert!(!loaded.is_error());
    assert_eq!(loaded.loaded_at, Some(now()));
    let view = loaded.view;

    let refs: Vec<&str> = view.projects.iter().map(|g| g.ref_projet.as_str()).collect();
    assert_eq!(refs, ["P1", "P2"]);

    let p1 = &view.projects[0];
    assert_eq!(p1.nom_projet, "Projet P1");
    let derived: Vec<(PhaseStatus, u32, u8)> = p1
        .phases
        .iter()
        .map(|r| (r.derived.status, r.derived.days_late, r.derived.progress_percent))
        .collect();
    assert_eq!(
        derived,
        [(PhaseStatus::Late, 5, 0), (PhaseStatus::InProgress, 0, 50)]
    );

    assert_eq!(view.counts.total(), 4);
    assert_eq!(view.counts.late, 1);
    assert_eq!(view.counts.completed, 1);
    assert_eq!(view.calendar.len(), 4);
    assert_eq!(view.skipped_records, 0);
}

#[tokio::test]
async fn phases_board_filters_one_project() {
    let api = InMemoryApi::new(sample_state());
    let view = load_screen(&PhasesScreen::for_project("P2"), &api, now())
        .await
        .view;

    assert_eq!(view.projects.len(), 1);
    assert_eq!(view.projects[0].ref_projet, ProjectRef::from("P2"));
    assert_eq!(view.counts.planned, 1);
    assert_eq!(view.counts.completed, 1);
}

#[tokio::test]
async fn projects_overview_lists_registered_then_orphans() {
    let api = InMemoryApi::new(sample_state());
    let view = load_screen(&ProjectsScreen, &api, now()).await.view;

    let lines: Vec<(&str, &str, PhaseStatus, u8)> = view
        .projects
        .iter()
        .map(|p| {
            (
                p.ref_projet.as_str(),
                p.nom_projet.as_str(),
                p.status,
                p.progress_percent,
            )
        })
        .collect();
    assert_eq!(
        lines,
        [
            ("P1", "Migration", PhaseStatus::Late, 25),
            ("P3", "Archivage", PhaseStatus::Planned, 0),
            ("P2", "Projet P2", PhaseStatus::Planned, 0),
        ]
    );
    assert_eq!(view.projects[2].counts.completed, 1);
}

#[tokio::test]
async fn admin_dashboard_counts_and_ranks_the_week() {
    let api = InMemoryApi::new(sample_state());
    let view = load_screen(&AdminScreen::new(2), &api, now()).await.view;

    assert_eq!(view.total_users, 3);
    assert_eq!(view.total_projects, 2);
    assert_eq!(view.total_modules, 1);
    assert_eq!(view.phase_counts.total(), 4);

    let week = view.week.expect("week window");
    assert_eq!(week.start, at(ymd(2024, 5, 13), 0, 0));

    let board: Vec<(&str, u32)> = view
        .leaderboard
        .iter()
        .map(|e| (e.matricule.as_str(), e.completed))
        .collect();
    assert_eq!(board, [("A", 2), ("C", 1)]);
}

#[tokio::test]
async fn alerts_put_late_before_due_soon() {
    let api = InMemoryApi::new(sample_state());
    let view = load_screen(&AlertsScreen::default(), &api, now()).await.view;

    let kinds: Vec<AlertKind> = view.alerts.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        [
            AlertKind::Late { days_late: 5 },
            AlertKind::DueSoon { days_remaining: 5 },
        ]
    );
    assert_eq!(view.late_count(), 1);

    let narrow = load_screen(&AlertsScreen::new(3), &api, now()).await.view;
    assert_eq!(narrow.alerts.len(), 1);
}

#[tokio::test]
async fn failed_fetch_yields_empty_view_and_message() {
    for listing in ["users", "projects", "modules", "phases", "completion events"] {
        let api = InMemoryApi::new(sample_state());
        api.fail_listing(listing);

        let admin = load_screen(&AdminScreen::default(), &api, now()).await;
        assert!(admin.is_error(), "admin should fail when {listing} fails");
        assert_eq!(admin.view, AdminView::default());
        assert_eq!(
            admin.error.as_deref(),
            Some("Could not load data from the server")
        );
    }
}

#[tokio::test]
async fn screen_error_names_the_screen() {
    let api = InMemoryApi::new(sample_state());
    api.fail_listing("task progress");

    let err = PhasesScreen::new()
        .load(&api, now())
        .await
        .expect_err("progress listing is down");
    assert!(matches!(err, ScreenError::Fetch { screen: "phases", .. }));
    assert!(!err.requires_login());
}

#[tokio::test]
async fn skipped_records_are_reported() {
    let mut state = sample_state();
    state.skipped = 2;
    let api = InMemoryApi::new(state);

    // phases and progress listings each report two
    let view = load_screen(&PhasesScreen::new(), &api, now()).await.view;
    assert_eq!(view.skipped_records, 4);
}

#[tokio::test]
async fn views_serialize_flat_phase_rows() {
    let api = InMemoryApi::new(sample_state());
    let loaded = load_screen(&PhasesScreen::for_project("P1"), &api, now()).await;

    let json = serde_json::to_value(&loaded).unwrap();
    let row = &json["view"]["projects"][0]["phases"][0];
    assert_eq!(row["ref_projet"], "P1");
    assert_eq!(row["libelle_phase"], "Phase 1");
    assert_eq!(row["status"], "late");
    assert_eq!(row["days_late"], 5);
    assert_eq!(json["error"], serde_json::Value::Null);
}
