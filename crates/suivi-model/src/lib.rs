//! Suivi data model
//!
//! Records returned by the project tracking API and the helpers needed to
//! read them safely.
//!
//! # Core Concepts
//!
//! - [`PhaseRecord`]: one phase of one project, with raw date columns
//! - [`TaskProgress`]: task counts per `(ref_projet, id_phase)`
//! - [`CompletionEvent`]: a finished task attributed to a user
//! - [`User`], [`Module`], [`Project`]: administration records
//! - [`decode_batch`]: array decoding that skips malformed elements

#![warn(unreachable_pub)]

pub mod date;
mod decode;
mod ids;
mod records;

pub use date::DateError;
pub use decode::{decode_batch, Batch, DecodeError};
pub use ids::{Matricule, ModuleId, PhaseId, ProjectRef};
pub use records::{
    CompletionEvent, Module, NewUser, PhaseCompletion, PhaseDraft, PhaseRecord, Project,
    TaskCounts, TaskProgress, User,
};
