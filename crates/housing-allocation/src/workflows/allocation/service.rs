use std::sync::{Mutex, MutexGuard};

use tracing::{info, warn};

use super::catalog::ProjectDraft;
use super::domain::{
    Application, ApplicationId, BookingReceipt, FlatType, OfficerRegistration, Project,
    ProjectListing, ProjectName, RegistrationId, UserId, WithdrawalOutcome,
};
use super::engine::AllocationEngine;
use super::error::AllocationError;
use super::snapshot::{AllocationSnapshot, SnapshotError, SnapshotStore};
use crate::config::AllocationConfig;

/// Thread-safe facade over the engine for request handlers.
///
/// One lock guards the whole record set, so every operation is serialized. That covers
/// both the per-project ordering inventory needs and the per-officer ordering overlap
/// exclusion needs.
pub struct AllocationService {
    engine: Mutex<AllocationEngine>,
}

fn refused(action: &'static str, error: &AllocationError) {
    warn!(action, kind = error.kind(), %error, "allocation request refused");
}

fn application_record(
    engine: &AllocationEngine,
    id: &ApplicationId,
) -> Result<Application, AllocationError> {
    engine
        .application(id)
        .cloned()
        .ok_or_else(|| AllocationError::UnknownApplication(id.clone()))
}

fn project_record(
    engine: &AllocationEngine,
    name: &ProjectName,
) -> Result<Project, AllocationError> {
    engine
        .project(name)
        .cloned()
        .ok_or_else(|| AllocationError::UnknownProject(name.clone()))
}

impl AllocationService {
    pub fn new(engine: AllocationEngine) -> Self {
        Self {
            engine: Mutex::new(engine),
        }
    }

    pub fn from_store<S>(config: &AllocationConfig, store: &S) -> Result<Self, SnapshotError>
    where
        S: SnapshotStore + ?Sized,
    {
        let snapshot = store.load()?;
        let engine = AllocationEngine::from_snapshot(config, snapshot)?;
        info!(
            projects = engine.projects().count(),
            applications = engine.applications().count(),
            "allocation records hydrated"
        );
        Ok(Self::new(engine))
    }

    pub fn persist<S>(&self, store: &S) -> Result<(), SnapshotError>
    where
        S: SnapshotStore + ?Sized,
    {
        store.save(&self.snapshot())
    }

    fn engine(&self) -> MutexGuard<'_, AllocationEngine> {
        self.engine.lock().expect("allocation engine mutex poisoned")
    }

    /// Run a read-only query against the current record set.
    pub fn read<T>(&self, query: impl FnOnce(&AllocationEngine) -> T) -> T {
        query(&self.engine())
    }

    pub fn snapshot(&self) -> AllocationSnapshot {
        self.engine().snapshot()
    }

    pub fn apply(
        &self,
        applicant: &UserId,
        project: &ProjectName,
        flat_type: FlatType,
    ) -> Result<Application, AllocationError> {
        let mut engine = self.engine();
        let id = engine
            .apply(applicant, project, flat_type)
            .inspect_err(|error| refused("apply", error))?;
        info!(application = %id, %applicant, %project, %flat_type, "application submitted");
        application_record(&engine, &id)
    }

    pub fn decide(
        &self,
        application: &ApplicationId,
        approve: bool,
    ) -> Result<Application, AllocationError> {
        let mut engine = self.engine();
        let status = engine
            .decide(application, approve)
            .inspect_err(|error| refused("decide", error))?;
        info!(%application, status = status.label(), "application decided");
        application_record(&engine, application)
    }

    /// Book a flat, optionally on behalf of an officer handling the project.
    pub fn book(
        &self,
        application: &ApplicationId,
        officer: Option<&UserId>,
    ) -> Result<Application, AllocationError> {
        let mut engine = self.engine();
        let remaining = match officer {
            Some(officer) => engine.book_as(officer, application),
            None => engine.book(application),
        }
        .inspect_err(|error| refused("book", error))?;
        info!(%application, remaining, "flat booked");
        application_record(&engine, application)
    }

    pub fn request_withdrawal(&self, applicant: &UserId) -> Result<Application, AllocationError> {
        let mut engine = self.engine();
        let id = engine
            .request_withdrawal(applicant)
            .inspect_err(|error| refused("request_withdrawal", error))?;
        info!(application = %id, %applicant, "withdrawal requested");
        application_record(&engine, &id)
    }

    pub fn decide_withdrawal(
        &self,
        application: &ApplicationId,
        approve: bool,
    ) -> Result<WithdrawalOutcome, AllocationError> {
        let outcome = self
            .engine()
            .decide_withdrawal(application, approve)
            .inspect_err(|error| refused("decide_withdrawal", error))?;
        match outcome {
            WithdrawalOutcome::Approved {
                released: Some(flat_type),
            } => info!(%application, %flat_type, "withdrawal approved, unit released"),
            WithdrawalOutcome::Approved { released: None } => {
                info!(%application, "withdrawal approved")
            }
            WithdrawalOutcome::Rejected => info!(%application, "withdrawal rejected"),
        }
        Ok(outcome)
    }

    pub fn register(
        &self,
        officer: &UserId,
        project: &ProjectName,
    ) -> Result<OfficerRegistration, AllocationError> {
        let mut engine = self.engine();
        let id = engine
            .register(officer, project)
            .inspect_err(|error| refused("register", error))?;
        info!(registration = %id, %officer, %project, "officer registration submitted");
        registration_record(&engine, &id)
    }

    pub fn decide_registration(
        &self,
        registration: &RegistrationId,
        approve: bool,
    ) -> Result<OfficerRegistration, AllocationError> {
        let mut engine = self.engine();
        if approve {
            engine
                .approve_registration(registration)
                .inspect_err(|error| refused("approve_registration", error))?;
        } else {
            engine
                .reject_registration(registration)
                .inspect_err(|error| refused("reject_registration", error))?;
        }
        let record = registration_record(&engine, registration)?;
        info!(%registration, status = record.status.label(), "officer registration decided");
        Ok(record)
    }

    pub fn create_project(&self, draft: ProjectDraft) -> Result<Project, AllocationError> {
        let mut engine = self.engine();
        let name = engine
            .create_project(draft)
            .inspect_err(|error| refused("create_project", error))?;
        info!(project = %name, "project created");
        project_record(&engine, &name)
    }

    pub fn set_inventory(
        &self,
        project: &ProjectName,
        flat_type: FlatType,
        count: i64,
    ) -> Result<Project, AllocationError> {
        let mut engine = self.engine();
        engine
            .set_inventory(project, flat_type, count)
            .inspect_err(|error| refused("set_inventory", error))?;
        info!(%project, %flat_type, count, "inventory updated");
        project_record(&engine, project)
    }

    pub fn toggle_visibility(&self, project: &ProjectName) -> Result<Project, AllocationError> {
        let mut engine = self.engine();
        let visible = engine
            .toggle_visibility(project)
            .inspect_err(|error| refused("toggle_visibility", error))?;
        info!(%project, visible, "project visibility toggled");
        project_record(&engine, project)
    }

    pub fn delete_project(&self, project: &ProjectName) -> Result<Project, AllocationError> {
        let removed = self
            .engine()
            .delete_project(project)
            .inspect_err(|error| refused("delete_project", error))?;
        info!(%project, "project deleted");
        Ok(removed)
    }

    pub fn project(&self, project: &ProjectName) -> Result<Project, AllocationError> {
        project_record(&self.engine(), project)
    }

    pub fn application_of(&self, applicant: &UserId) -> Result<Option<Application>, AllocationError> {
        Ok(self.engine().application_of(applicant)?.cloned())
    }

    pub fn projects_for_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<ProjectListing>, AllocationError> {
        self.engine().projects_for_applicant(applicant)
    }

    pub fn receipt(
        &self,
        officer: &UserId,
        applicant: &UserId,
    ) -> Result<BookingReceipt, AllocationError> {
        self.engine().receipt(officer, applicant)
    }

    pub fn pending_withdrawals(&self) -> Vec<Application> {
        self.engine()
            .pending_withdrawals()
            .into_iter()
            .cloned()
            .collect()
    }
}

fn registration_record(
    engine: &AllocationEngine,
    id: &RegistrationId,
) -> Result<OfficerRegistration, AllocationError> {
    engine
        .registration(id)
        .cloned()
        .ok_or_else(|| AllocationError::UnknownRegistration(id.clone()))
}
