//! User edits dispatched to the API
//!
//! These are the only paths that change a phase's actual end or a user's
//! module grants. The aggregator never does either.

use chrono::NaiveDate;
use suivi_api::{ApiError, TrackingApi};
use suivi_model::{Matricule, ModuleId, PhaseCompletion, PhaseDraft, PhaseId, ProjectRef, User};

/// Errors from edit actions
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// API rejected or failed the edit
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Target user is not in the user listing
    #[error("unknown user {0}")]
    UnknownUser(Matricule),

    /// Planned end before planned start
    #[error("phase would end on {end}, before its start on {start}")]
    InvertedSchedule {
        /// Requested start
        start: NaiveDate,
        /// Requested end
        end: NaiveDate,
    },
}

/// Record `on` as the actual end of a phase
pub async fn complete_phase(
    api: &dyn TrackingApi,
    project: &ProjectRef,
    phase: &PhaseId,
    on: NaiveDate,
) -> Result<(), ActionError> {
    api.set_phase_completion(
        project,
        phase,
        PhaseCompletion {
            date_fin_reelle: Some(on),
        },
    )
    .await?;
    tracing::info!(ref_projet = %project, id_phase = %phase, %on, "phase marked completed");
    Ok(())
}

/// Clear a phase's actual end so it is classified from its dates again
pub async fn reopen_phase(
    api: &dyn TrackingApi,
    project: &ProjectRef,
    phase: &PhaseId,
) -> Result<(), ActionError> {
    api.set_phase_completion(
        project,
        phase,
        PhaseCompletion {
            date_fin_reelle: None,
        },
    )
    .await?;
    tracing::info!(ref_projet = %project, id_phase = %phase, "phase reopened");
    Ok(())
}

/// Move a phase's planned dates
pub async fn reschedule_phase(
    api: &dyn TrackingApi,
    project: &ProjectRef,
    phase: &PhaseId,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), ActionError> {
    if end < start {
        return Err(ActionError::InvertedSchedule { start, end });
    }
    let draft = PhaseDraft {
        id_phase: phase.clone(),
        date_debut: start,
        date_fin: end,
    };
    api.update_phase(project, &draft).await?;
    tracing::info!(ref_projet = %project, id_phase = %phase, %start, %end, "phase rescheduled");
    Ok(())
}

async fn find_user(api: &dyn TrackingApi, matricule: &Matricule) -> Result<User, ActionError> {
    api.list_users()
        .await?
        .into_items()
        .into_iter()
        .find(|u| &u.matricule == matricule)
        .ok_or_else(|| ActionError::UnknownUser(matricule.clone()))
}

/// Grant `module` to a user; granting twice is a no-op
pub async fn grant_module(
    api: &dyn TrackingApi,
    matricule: &Matricule,
    module: &ModuleId,
) -> Result<(), ActionError> {
    let mut user = find_user(api, matricule).await?;
    if user.can_access(module) {
        tracing::debug!(%matricule, %module, "module already granted");
        return Ok(());
    }
    user.modules.push(module.clone());
    api.update_user(&user).await?;
    tracing::info!(%matricule, %module, "module granted");
    Ok(())
}

/// Revoke `module` from a user; revoking a missing grant is a no-op
pub async fn revoke_module(
    api: &dyn TrackingApi,
    matricule: &Matricule,
    module: &ModuleId,
) -> Result<(), ActionError> {
    let mut user = find_user(api, matricule).await?;
    if !user.can_access(module) {
        tracing::debug!(%matricule, %module, "module not granted");
        return Ok(());
    }
    user.modules.retain(|m| m != module);
    api.update_user(&user).await?;
    tracing::info!(%matricule, %module, "module revoked");
    Ok(())
}
