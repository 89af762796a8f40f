//! Testing utilities for the Suivi workspace
//!
//! Shared fixtures and an in-memory [`TrackingApi`].

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;
use suivi_api::{ApiError, TrackingApi};
use suivi_model::{
    Batch, CompletionEvent, Matricule, Module, ModuleId, NewUser, PhaseCompletion, PhaseDraft,
    PhaseId, PhaseRecord, Project, ProjectRef, TaskProgress, User,
};

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
}

pub fn phase(
    ref_projet: &str,
    id_phase: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> PhaseRecord {
    PhaseRecord::new(ref_projet, id_phase)
        .with_names(format!("Projet {ref_projet}"), format!("Phase {id_phase}"))
        .with_schedule(start, end)
}

pub fn project(ref_projet: &str, nom: &str) -> Project {
    Project {
        ref_projet: ProjectRef::from(ref_projet),
        nom_projet: nom.to_string(),
        description: None,
        date_debut: None,
        date_fin: None,
    }
}

/// Listing names accepted by [`InMemoryApi::fail_listing`]
pub const LISTINGS: &[&str] = &[
    "phases",
    "task progress",
    "completion events",
    "users",
    "modules",
    "projects",
];

#[derive(Debug, Default, Clone)]
pub struct ApiState {
    pub phases: Vec<PhaseRecord>,
    pub progress: Vec<TaskProgress>,
    pub events: Vec<CompletionEvent>,
    pub users: Vec<User>,
    pub modules: Vec<Module>,
    pub projects: Vec<Project>,
    /// Elements reported as skipped on every listing
    pub skipped: usize,
}

/// [`TrackingApi`] backed by vectors, with failure injection
#[derive(Debug, Default)]
pub struct InMemoryApi {
    state: Mutex<ApiState>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
}

impl InMemoryApi {
    pub fn new(state: ApiState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    /// Make `listing` answer HTTP 503
    pub fn fail_listing(&self, listing: &'static str) {
        assert!(LISTINGS.contains(&listing), "unknown listing {listing}");
        self.failing.lock().insert(listing);
    }

    /// Delay every call by `delay`
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn state(&self) -> ApiState {
        self.state.lock().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut ApiState)) {
        f(&mut self.state.lock());
    }

    /// Names of the calls made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    async fn enter(&self, call: &str) {
        self.calls.lock().push(call.to_string());
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn listing<T: Clone>(
        &self,
        what: &'static str,
        pick: impl FnOnce(&ApiState) -> &Vec<T>,
    ) -> Result<Batch<T>, ApiError> {
        self.enter(what).await;
        if self.failing.lock().contains(what) {
            return Err(ApiError::Status {
                endpoint: what.to_string(),
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        let state = self.state.lock();
        Ok(Batch {
            items: pick(&state).clone(),
            skipped: state.skipped,
        })
    }
}

#[async_trait]
impl TrackingApi for InMemoryApi {
    async fn list_phases(&self) -> Result<Batch<PhaseRecord>, ApiError> {
        self.listing("phases", |s| &s.phases).await
    }

    async fn list_task_progress(&self) -> Result<Batch<TaskProgress>, ApiError> {
        self.listing("task progress", |s| &s.progress).await
    }

    async fn list_completion_events(&self) -> Result<Batch<CompletionEvent>, ApiError> {
        self.listing("completion events", |s| &s.events).await
    }

    async fn list_users(&self) -> Result<Batch<User>, ApiError> {
        self.listing("users", |s| &s.users).await
    }

    async fn list_modules(&self) -> Result<Batch<Module>, ApiError> {
        self.listing("modules", |s| &s.modules).await
    }

    async fn list_projects(&self) -> Result<Batch<Project>, ApiError> {
        self.listing("projects", |s| &s.projects).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<(), ApiError> {
        self.enter("create user").await;
        self.state.lock().users.push(user.user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), ApiError> {
        self.enter("update user").await;
        let mut state = self.state.lock();
        if let Some(existing) = state
            .users
            .iter_mut()
            .find(|u| u.matricule == user.matricule)
        {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn delete_user(&self, matricule: &Matricule) -> Result<(), ApiError> {
        self.enter("delete user").await;
        self.state.lock().users.retain(|u| &u.matricule != matricule);
        Ok(())
    }

    async fn create_module(&self, module: &Module) -> Result<(), ApiError> {
        self.enter("create module").await;
        self.state.lock().modules.push(module.clone());
        Ok(())
    }

    async fn update_module(&self, module: &Module) -> Result<(), ApiError> {
        self.enter("update module").await;
        let mut state = self.state.lock();
        if let Some(existing) = state
            .modules
            .iter_mut()
            .find(|m| m.id_module == module.id_module)
        {
            *existing = module.clone();
        }
        Ok(())
    }

    async fn delete_module(&self, id: &ModuleId) -> Result<(), ApiError> {
        self.enter("delete module").await;
        self.state.lock().modules.retain(|m| &m.id_module != id);
        Ok(())
    }

    async fn create_project(&self, project: &Project) -> Result<(), ApiError> {
        self.enter("create project").await;
        self.state.lock().projects.push(project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> Result<(), ApiError> {
        self.enter("update project").await;
        let mut state = self.state.lock();
        if let Some(existing) = state
            .projects
            .iter_mut()
            .find(|p| p.ref_projet == project.ref_projet)
        {
            *existing = project.clone();
        }
        Ok(())
    }

    async fn delete_project(&self, project: &ProjectRef) -> Result<(), ApiError> {
        self.enter("delete project").await;
        let mut state = self.state.lock();
        state.projects.retain(|p| &p.ref_projet != project);
        state.phases.retain(|p| &p.ref_projet != project);
        Ok(())
    }

    async fn add_phase(&self, project: &ProjectRef, phase: &PhaseDraft) -> Result<(), ApiError> {
        self.enter("add phase").await;
        let mut state = self.state.lock();
        let name = state
            .projects
            .iter()
            .find(|p| &p.ref_projet == project)
            .map(|p| p.nom_projet.clone())
            .unwrap_or_default();
        state.phases.push(
            PhaseRecord::new(project.clone(), phase.id_phase.clone())
                .with_names(name, String::new())
                .with_schedule(phase.date_debut, phase.date_fin),
        );
        Ok(())
    }

    async fn update_phase(
        &self,
        project: &ProjectRef,
        phase: &PhaseDraft,
    ) -> Result<(), ApiError> {
        self.enter("update phase").await;
        let mut state = self.state.lock();
        for record in state
            .phases
            .iter_mut()
            .filter(|p| &p.ref_projet == project && p.id_phase == phase.id_phase)
        {
            let rescheduled = record
                .clone()
                .with_schedule(phase.date_debut, phase.date_fin);
            *record = rescheduled;
        }
        Ok(())
    }

    async fn delete_phase(&self, project: &ProjectRef, phase: &PhaseId) -> Result<(), ApiError> {
        self.enter("delete phase").await;
        self.state
            .lock()
            .phases
            .retain(|p| !(&p.ref_projet == project && &p.id_phase == phase));
        Ok(())
    }

    async fn set_phase_completion(
        &self,
        project: &ProjectRef,
        phase: &PhaseId,
        completion: PhaseCompletion,
    ) -> Result<(), ApiError> {
        self.enter("set phase completion").await;
        let mut state = self.state.lock();
        for record in state
            .phases
            .iter_mut()
            .filter(|p| &p.ref_projet == project && &p.id_phase == phase)
        {
            record.date_fin_reelle = completion
                .date_fin_reelle
                .map(|d| d.format("%Y-%m-%d").to_string());
        }
        Ok(())
    }
}
