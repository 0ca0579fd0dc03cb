//! Public-housing allocation: eligibility, unit inventory, the application lifecycle,
//! officer assignments and withdrawals.
//!
//! `AllocationEngine` owns every record and exposes synchronous operations; each either
//! fully succeeds or returns an `AllocationError` with nothing changed. `AllocationService`
//! wraps the engine for concurrent callers and `allocation_router` puts it behind HTTP.

mod catalog;
pub mod domain;
mod eligibility;
mod engine;
mod error;
mod inventory;
mod lifecycle;
mod officers;
pub mod router;
pub mod service;
mod snapshot;
mod withdrawal;

#[cfg(test)]
mod tests;

pub use catalog::ProjectDraft;
pub use domain::{
    Applicant, Application, ApplicationId, ApplicationStatus, ApplicationWindow,
    BookingReceipt, FlatType, MaritalStatus, Officer, OfficerRegistration, Project,
    ProjectListing, ProjectName, RegistrationId, RegistrationStatus, UserId, WithdrawalOutcome,
};
pub use eligibility::EligibilityPolicy;
pub use engine::AllocationEngine;
pub use error::AllocationError;
pub use inventory::InventoryLedger;
pub use router::allocation_router;
pub use service::AllocationService;
pub use snapshot::{AllocationSnapshot, SnapshotError, SnapshotStore};
