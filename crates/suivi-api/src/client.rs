//! The API surface the dashboard depends on
//!
//! Screens talk to [`TrackingApi`], never to HTTP directly, so they can be
//! exercised against an in-memory implementation.

use crate::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use suivi_model::{
    Batch, CompletionEvent, Matricule, Module, ModuleId, NewUser, PhaseCompletion, PhaseDraft,
    PhaseId, PhaseRecord, Project, ProjectRef, TaskProgress, User,
};

/// Connection settings for the tracking API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root URL, e.g. `https://suivi.example.org/api`
    pub base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Operations offered by the tracking API.
///
/// Listings decode leniently: malformed elements are skipped and counted in
/// the returned [`Batch`]. Writes are explicit user edits; nothing here
/// retries.
#[async_trait]
pub trait TrackingApi: Send + Sync {
    /// All project phases
    async fn list_phases(&self) -> Result<Batch<PhaseRecord>, ApiError>;

    /// Task counts per phase
    async fn list_task_progress(&self) -> Result<Batch<TaskProgress>, ApiError>;

    /// Finished tasks with the user who closed them
    async fn list_completion_events(&self) -> Result<Batch<CompletionEvent>, ApiError>;

    /// User accounts
    async fn list_users(&self) -> Result<Batch<User>, ApiError>;

    /// Access-controlled modules
    async fn list_modules(&self) -> Result<Batch<Module>, ApiError>;

    /// Projects
    async fn list_projects(&self) -> Result<Batch<Project>, ApiError>;

    /// Create a user account
    async fn create_user(&self, user: &NewUser) -> Result<(), ApiError>;

    /// Replace a user account's details and module grants
    async fn update_user(&self, user: &User) -> Result<(), ApiError>;

    /// Delete a user account
    async fn delete_user(&self, matricule: &Matricule) -> Result<(), ApiError>;

    /// Create a module
    async fn create_module(&self, module: &Module) -> Result<(), ApiError>;

    /// Rename a module
    async fn update_module(&self, module: &Module) -> Result<(), ApiError>;

    /// Delete a module
    async fn delete_module(&self, id: &ModuleId) -> Result<(), ApiError>;

    /// Create a project
    async fn create_project(&self, project: &Project) -> Result<(), ApiError>;

    /// Update a project
    async fn update_project(&self, project: &Project) -> Result<(), ApiError>;

    /// Delete a project and its phases
    async fn delete_project(&self, project: &ProjectRef) -> Result<(), ApiError>;

    /// Attach a phase to a project
    async fn add_phase(&self, project: &ProjectRef, phase: &PhaseDraft) -> Result<(), ApiError>;

    /// Reschedule a project phase
    async fn update_phase(&self, project: &ProjectRef, phase: &PhaseDraft)
        -> Result<(), ApiError>;

    /// Detach a phase from a project
    async fn delete_phase(&self, project: &ProjectRef, phase: &PhaseId) -> Result<(), ApiError>;

    /// Record or clear a phase's actual end
    async fn set_phase_completion(
        &self,
        project: &ProjectRef,
        phase: &PhaseId,
        completion: PhaseCompletion,
    ) -> Result<(), ApiError>;
}

/// Endpoint paths, as segments relative to the base URL
pub mod endpoints {
    pub const LOGIN: &[&str] = &["auth", "login"];
    pub const PHASES: &[&str] = &["projets", "phases"];
    pub const TASK_PROGRESS: &[&str] = &["taches", "progression"];
    pub const COMPLETION_EVENTS: &[&str] = &["taches", "terminees"];
    pub const USERS: &[&str] = &["utilisateurs"];
    pub const MODULES: &[&str] = &["modules"];
    pub const PROJECTS: &[&str] = &["projets"];
    pub const ACTUAL_END: &str = "fin-reelle";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = ApiConfig::new()
            .with_base_url("https://suivi.example.org/api")
            .with_timeout_secs(5);
        assert_eq!(config.base_url, "https://suivi.example.org/api");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: ApiConfig = serde_json::from_str(r#"{"timeout_secs": 9}"#).unwrap();
        assert_eq!(config.timeout_secs, 9);
        assert_eq!(config.base_url, ApiConfig::default().base_url);
    }
}
