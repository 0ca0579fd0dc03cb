use std::collections::BTreeMap;

use super::domain::{
    Applicant, Application, ApplicationId, Officer, OfficerRegistration, Project, ProjectName,
    RegistrationId, UserId,
};
use super::eligibility::EligibilityPolicy;
use super::error::AllocationError;
use crate::config::AllocationConfig;

pub(super) const DEFAULT_OFFICER_SLOT_LIMIT: u32 = 10;

/// The authoritative in-memory record set.
///
/// Operations are grouped by concern across sibling modules (`lifecycle`, `officers`,
/// `withdrawal`, `catalog`, `snapshot`); every one of them is a synchronous
/// check-then-mutate step on `&mut self`.
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    pub(super) policy: EligibilityPolicy,
    pub(super) officer_slot_limit: u32,
    pub(super) applicants: BTreeMap<UserId, Applicant>,
    pub(super) officers: BTreeMap<UserId, Officer>,
    pub(super) projects: BTreeMap<ProjectName, Project>,
    pub(super) applications: BTreeMap<ApplicationId, Application>,
    pub(super) registrations: BTreeMap<RegistrationId, OfficerRegistration>,
    pub(super) application_sequence: u64,
    pub(super) registration_sequence: u64,
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::with_policy(EligibilityPolicy::default(), DEFAULT_OFFICER_SLOT_LIMIT)
    }
}

impl AllocationEngine {
    pub fn new(config: &AllocationConfig) -> Self {
        Self::with_policy(EligibilityPolicy::from(config), config.officer_slot_limit)
    }

    pub fn with_policy(policy: EligibilityPolicy, officer_slot_limit: u32) -> Self {
        Self {
            policy,
            officer_slot_limit,
            applicants: BTreeMap::new(),
            officers: BTreeMap::new(),
            projects: BTreeMap::new(),
            applications: BTreeMap::new(),
            registrations: BTreeMap::new(),
            application_sequence: 0,
            registration_sequence: 0,
        }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    /// Register an applicant at load time. Applicants start without an application.
    pub fn add_applicant(&mut self, applicant: Applicant) -> Result<(), AllocationError> {
        if applicant.application.is_some() {
            return Err(AllocationError::InvalidArgument(format!(
                "applicant {} must be added without an application",
                applicant.id
            )));
        }
        if self.applicants.contains_key(&applicant.id) {
            return Err(AllocationError::InvalidArgument(format!(
                "applicant {} already exists",
                applicant.id
            )));
        }
        self.applicants.insert(applicant.id.clone(), applicant);
        Ok(())
    }

    pub fn add_officer(&mut self, id: UserId) -> Result<(), AllocationError> {
        if self.officers.contains_key(&id) {
            return Err(AllocationError::InvalidArgument(format!(
                "officer {id} already exists"
            )));
        }
        self.officers.insert(id.clone(), Officer::new(id));
        Ok(())
    }

    pub fn applicant(&self, id: &UserId) -> Option<&Applicant> {
        self.applicants.get(id)
    }

    pub fn officer(&self, id: &UserId) -> Option<&Officer> {
        self.officers.get(id)
    }

    pub fn project(&self, name: &ProjectName) -> Option<&Project> {
        self.projects.get(name)
    }

    pub fn application(&self, id: &ApplicationId) -> Option<&Application> {
        self.applications.get(id)
    }

    pub fn registration(&self, id: &RegistrationId) -> Option<&OfficerRegistration> {
        self.registrations.get(id)
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn applications(&self) -> impl Iterator<Item = &Application> {
        self.applications.values()
    }

    pub fn registrations(&self) -> impl Iterator<Item = &OfficerRegistration> {
        self.registrations.values()
    }

    pub(super) fn applicant_ref(&self, id: &UserId) -> Result<&Applicant, AllocationError> {
        self.applicants
            .get(id)
            .ok_or_else(|| AllocationError::UnknownApplicant(id.clone()))
    }

    pub(super) fn officer_ref(&self, id: &UserId) -> Result<&Officer, AllocationError> {
        self.officers
            .get(id)
            .ok_or_else(|| AllocationError::UnknownOfficer(id.clone()))
    }

    pub(super) fn project_ref(&self, name: &ProjectName) -> Result<&Project, AllocationError> {
        self.projects
            .get(name)
            .ok_or_else(|| AllocationError::UnknownProject(name.clone()))
    }

    pub(super) fn application_ref(
        &self,
        id: &ApplicationId,
    ) -> Result<&Application, AllocationError> {
        self.applications
            .get(id)
            .ok_or_else(|| AllocationError::UnknownApplication(id.clone()))
    }

    /// Clear the applicant side of the link, only if it still points at `application`.
    pub(super) fn detach_application(&mut self, applicant: &UserId, application: &ApplicationId) {
        if let Some(record) = self.applicants.get_mut(applicant) {
            if record.application.as_ref() == Some(application) {
                record.application = None;
            }
        }
    }

    pub(super) fn next_application_id(&mut self) -> ApplicationId {
        loop {
            self.application_sequence += 1;
            let id = ApplicationId(format!("app-{:06}", self.application_sequence));
            if !self.applications.contains_key(&id) {
                return id;
            }
        }
    }

    pub(super) fn next_registration_id(&mut self) -> RegistrationId {
        loop {
            self.registration_sequence += 1;
            let id = RegistrationId(format!("reg-{:06}", self.registration_sequence));
            if !self.registrations.contains_key(&id) {
                return id;
            }
        }
    }
}
