//! Records exchanged with the tracking API
//!
//! Date columns are kept as their raw wire strings. A phase with a broken
//! `date_fin` is still a phase: it must reach the aggregator so it can be
//! shown, it just cannot be classified as late. Parsing happens through the
//! accessor methods.

use crate::date::{self, DateError};
use crate::ids::{self, Matricule, ModuleId, PhaseId, ProjectRef};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One row of the project-phase listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    /// Owning project
    pub ref_projet: ProjectRef,
    /// Phase definition
    pub id_phase: PhaseId,
    /// Project display name
    #[serde(default)]
    pub nom_projet: String,
    /// Phase display name
    #[serde(default)]
    pub libelle_phase: String,
    /// Planned start
    #[serde(default)]
    pub date_debut: Option<String>,
    /// Planned end
    #[serde(default)]
    pub date_fin: Option<String>,
    /// Actual end; set means completed
    #[serde(default)]
    pub date_fin_reelle: Option<String>,
}

impl PhaseRecord {
    /// Create a phase with no dates
    #[must_use]
    pub fn new(ref_projet: impl Into<ProjectRef>, id_phase: impl Into<PhaseId>) -> Self {
        Self {
            ref_projet: ref_projet.into(),
            id_phase: id_phase.into(),
            nom_projet: String::new(),
            libelle_phase: String::new(),
            date_debut: None,
            date_fin: None,
            date_fin_reelle: None,
        }
    }

    /// With display names
    #[must_use]
    pub fn with_names(mut self, project: impl Into<String>, phase: impl Into<String>) -> Self {
        self.nom_projet = project.into();
        self.libelle_phase = phase.into();
        self
    }

    /// With planned start and end
    #[must_use]
    pub fn with_schedule(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_debut = Some(start.format("%Y-%m-%d").to_string());
        self.date_fin = Some(end.format("%Y-%m-%d").to_string());
        self
    }

    /// With actual completion date
    #[must_use]
    pub fn completed_on(mut self, date: NaiveDate) -> Self {
        self.date_fin_reelle = Some(date.format("%Y-%m-%d").to_string());
        self
    }

    /// Parsed planned start
    pub fn start_date(&self) -> Result<NaiveDate, DateError> {
        date::parse_date(self.date_debut.as_deref())
    }

    /// Parsed planned end
    pub fn planned_end(&self) -> Result<NaiveDate, DateError> {
        date::parse_date(self.date_fin.as_deref())
    }

    /// Parsed actual end, if any
    pub fn actual_end(&self) -> Result<NaiveDate, DateError> {
        date::parse_date(self.date_fin_reelle.as_deref())
    }

    /// Whether an actual end has been recorded
    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        date::is_set(self.date_fin_reelle.as_deref())
    }

    /// Join key against task progress rows
    #[inline]
    #[must_use]
    pub fn key(&self) -> (ProjectRef, PhaseId) {
        (self.ref_projet.clone(), self.id_phase.clone())
    }
}

/// Task counts for one `(ref_projet, id_phase)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskCounts {
    /// Number of tasks in the phase
    #[serde(deserialize_with = "ids::count")]
    pub total_taches: u32,
    /// Number of finished tasks
    #[serde(deserialize_with = "ids::count")]
    pub taches_terminees: u32,
}

/// One row of the task-progress listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    /// Owning project
    pub ref_projet: ProjectRef,
    /// Phase the tasks belong to
    pub id_phase: PhaseId,
    /// Counts
    #[serde(flatten)]
    pub counts: TaskCounts,
}

impl TaskProgress {
    /// Create a progress row
    #[must_use]
    pub fn new(
        ref_projet: impl Into<ProjectRef>,
        id_phase: impl Into<PhaseId>,
        total_taches: u32,
        taches_terminees: u32,
    ) -> Self {
        Self {
            ref_projet: ref_projet.into(),
            id_phase: id_phase.into(),
            counts: TaskCounts {
                total_taches,
                taches_terminees,
            },
        }
    }

    /// Join key against phase rows
    #[inline]
    #[must_use]
    pub fn key(&self) -> (ProjectRef, PhaseId) {
        (self.ref_projet.clone(), self.id_phase.clone())
    }
}

/// A finished task, attributed to the user who closed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// User who completed the task; events without one are not attributable
    #[serde(default)]
    pub matricule: Option<Matricule>,
    /// Completion timestamp
    #[serde(default, alias = "completed_at", alias = "date_fin_reelle")]
    pub date_fin: Option<String>,
    /// Project of the task
    #[serde(default)]
    pub ref_projet: Option<ProjectRef>,
    /// Phase of the task
    #[serde(default)]
    pub id_phase: Option<PhaseId>,
    /// Task label
    #[serde(default)]
    pub libelle_tache: Option<String>,
}

impl CompletionEvent {
    /// Create an event for `matricule` at `at`
    #[must_use]
    pub fn new(matricule: impl Into<Matricule>, at: NaiveDateTime) -> Self {
        Self {
            matricule: Some(matricule.into()),
            date_fin: Some(at.format("%Y-%m-%dT%H:%M:%S").to_string()),
            ref_projet: None,
            id_phase: None,
            libelle_tache: None,
        }
    }

    /// Parsed completion timestamp
    pub fn completed_at(&self) -> Result<NaiveDateTime, DateError> {
        date::parse_timestamp(self.date_fin.as_deref())
    }
}

/// A user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Employee number
    pub matricule: Matricule,
    /// Family name
    #[serde(default)]
    pub nom: String,
    /// Given name
    #[serde(default)]
    pub prenom: String,
    /// Contact address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role label as stored by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Modules the user may access
    #[serde(default)]
    pub modules: Vec<ModuleId>,
}

impl User {
    /// Create a user with no role or modules
    #[must_use]
    pub fn new(
        matricule: impl Into<Matricule>,
        nom: impl Into<String>,
        prenom: impl Into<String>,
    ) -> Self {
        Self {
            matricule: matricule.into(),
            nom: nom.into(),
            prenom: prenom.into(),
            email: None,
            role: None,
            modules: Vec::new(),
        }
    }

    /// "Prenom Nom", trimmed when either part is empty
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom).trim().to_string()
    }

    /// Whether the user was granted `module`
    #[inline]
    #[must_use]
    pub fn can_access(&self, module: &ModuleId) -> bool {
        self.modules.contains(module)
    }
}

/// Payload for creating a user
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    /// The account itself
    #[serde(flatten)]
    pub user: User,
    /// Initial password
    pub mot_de_passe: String,
}

/// An access-controlled area of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Identifier
    pub id_module: ModuleId,
    /// Display name
    #[serde(default)]
    pub libelle_module: String,
}

/// A project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Reference
    pub ref_projet: ProjectRef,
    /// Display name
    #[serde(default)]
    pub nom_projet: String,
    /// Free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Planned start
    #[serde(default)]
    pub date_debut: Option<String>,
    /// Planned end
    #[serde(default)]
    pub date_fin: Option<String>,
}

/// Payload for creating or rescheduling a phase of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseDraft {
    /// Phase definition
    pub id_phase: PhaseId,
    /// Planned start
    pub date_debut: NaiveDate,
    /// Planned end
    pub date_fin: NaiveDate,
}

/// Payload for recording or clearing a phase's actual end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseCompletion {
    /// `None` reopens the phase
    pub date_fin_reelle: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn phase_decodes_with_numeric_phase_id() {
        let json = r#"{
            "ref_projet": "P1",
            "id_phase": 2,
            "nom_projet": "Migration",
            "libelle_phase": "Recette",
            "date_debut": "2024-05-01",
            "date_fin": "2024-05-31T00:00:00.000Z",
            "date_fin_reelle": null
        }"#;
        let phase: PhaseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(phase.id_phase, PhaseId::from("2"));
        assert_eq!(phase.libelle_phase, "Recette");
        assert!(!phase.is_completed());
        assert!(phase.start_date().is_ok());
    }

    #[test]
    fn phase_without_ref_is_malformed() {
        let json = r#"{"id_phase": 2, "nom_projet": "X"}"#;
        assert!(serde_json::from_str::<PhaseRecord>(json).is_err());
    }

    #[test]
    fn blank_actual_end_is_not_completed() {
        let mut phase = PhaseRecord::new("P1", "1");
        phase.date_fin_reelle = Some(String::new());
        assert!(!phase.is_completed());
    }

    #[test]
    fn task_progress_accepts_string_counts() {
        let json = r#"{"ref_projet":"P1","id_phase":"3","total_taches":"4","taches_terminees":2}"#;
        let row: TaskProgress = serde_json::from_str(json).unwrap();
        assert_eq!(row, TaskProgress::new("P1", "3", 4, 2));
    }

    #[test]
    fn completion_event_accepts_alias() {
        let json = r#"{"matricule":"M1","completed_at":"2024-05-06T10:00:00"}"#;
        let event: CompletionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.matricule, Some(Matricule::from("M1")));
        assert!(event.completed_at().is_ok());
    }

    #[test]
    fn user_display_name() {
        assert_eq!(User::new("M1", "Durand", "Alice").display_name(), "Alice Durand");
        assert_eq!(User::new("M2", "Martin", "").display_name(), "Martin");
    }

    #[test]
    fn phase_completion_serializes_null_to_reopen() {
        let body = serde_json::to_value(PhaseCompletion {
            date_fin_reelle: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "date_fin_reelle": null }));
    }

    #[test]
    fn new_user_flattens_account() {
        let body = serde_json::to_value(NewUser {
            user: User::new("M3", "Petit", "Leo"),
            mot_de_passe: "secret".into(),
        })
        .unwrap();
        assert_eq!(body["matricule"], "M3");
        assert_eq!(body["mot_de_passe"], "secret");
    }
}
