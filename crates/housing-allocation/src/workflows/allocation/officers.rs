use super::domain::{
    ApplicationWindow, OfficerRegistration, Project, ProjectName, RegistrationId,
    RegistrationStatus, UserId,
};
use super::engine::AllocationEngine;
use super::error::AllocationError;

impl AllocationEngine {
    /// Request to handle a project. Creates a pending registration.
    pub fn register(
        &mut self,
        officer_id: &UserId,
        project_name: &ProjectName,
    ) -> Result<RegistrationId, AllocationError> {
        self.officer_ref(officer_id)?;
        let window = self.project_ref(project_name)?.window;

        if self.has_applied_for(officer_id, project_name) {
            return Err(AllocationError::SelfConflict {
                officer: officer_id.clone(),
                project: project_name.clone(),
            });
        }
        if let Some(conflicting) = self.overlapping_assignment(officer_id, project_name, &window) {
            return Err(AllocationError::OverlappingAssignment {
                holder: officer_id.clone(),
                conflicting,
            });
        }
        let already_open = self.registrations.values().any(|registration| {
            &registration.officer == officer_id
                && &registration.project == project_name
                && registration.status != RegistrationStatus::Rejected
        });
        if already_open {
            return Err(AllocationError::DuplicateRegistration {
                officer: officer_id.clone(),
                project: project_name.clone(),
            });
        }

        let id = self.next_registration_id();
        self.registrations.insert(
            id.clone(),
            OfficerRegistration {
                id: id.clone(),
                officer: officer_id.clone(),
                project: project_name.clone(),
                status: RegistrationStatus::Pending,
            },
        );
        Ok(id)
    }

    /// Approve a pending registration, consuming one officer slot on the project.
    pub fn approve_registration(
        &mut self,
        registration_id: &RegistrationId,
    ) -> Result<(), AllocationError> {
        let registration = self.registration_ref(registration_id)?;
        if registration.status != RegistrationStatus::Pending {
            return Err(AllocationError::InvalidTransition {
                status: registration.status.label(),
                action: "approve a registration",
            });
        }
        let officer_id = registration.officer.clone();
        let project_name = registration.project.clone();
        let window = self.project_ref(&project_name)?.window;

        if self.has_applied_for(&officer_id, &project_name) {
            return Err(AllocationError::SelfConflict {
                officer: officer_id,
                project: project_name,
            });
        }
        if let Some(conflicting) = self.overlapping_assignment(&officer_id, &project_name, &window)
        {
            return Err(AllocationError::OverlappingAssignment {
                holder: officer_id,
                conflicting,
            });
        }

        let project = self
            .projects
            .get_mut(&project_name)
            .ok_or_else(|| AllocationError::UnknownProject(project_name.clone()))?;
        if project.remaining_officer_slots() == 0 {
            return Err(AllocationError::NoSlotsAvailable(project_name));
        }
        let officer = self
            .officers
            .get_mut(&officer_id)
            .ok_or_else(|| AllocationError::UnknownOfficer(officer_id.clone()))?;

        project.officers.insert(officer_id.clone());
        officer.handled_projects.insert(project_name);
        if let Some(registration) = self.registrations.get_mut(registration_id) {
            registration.status = RegistrationStatus::Approved;
        }
        Ok(())
    }

    pub fn reject_registration(
        &mut self,
        registration_id: &RegistrationId,
    ) -> Result<(), AllocationError> {
        let registration = self
            .registrations
            .get_mut(registration_id)
            .ok_or_else(|| AllocationError::UnknownRegistration(registration_id.clone()))?;
        if registration.status != RegistrationStatus::Pending {
            return Err(AllocationError::InvalidTransition {
                status: registration.status.label(),
                action: "reject a registration",
            });
        }
        registration.status = RegistrationStatus::Rejected;
        Ok(())
    }

    pub fn registrations_for_officer(&self, officer_id: &UserId) -> Vec<&OfficerRegistration> {
        self.registrations
            .values()
            .filter(|registration| &registration.officer == officer_id)
            .collect()
    }

    /// Registrations against every project the manager owns.
    pub fn registrations_for_manager(&self, manager: &UserId) -> Vec<&OfficerRegistration> {
        self.registrations
            .values()
            .filter(|registration| {
                self.projects
                    .get(&registration.project)
                    .is_some_and(|project| project.is_managed_by(manager))
            })
            .collect()
    }

    pub fn handled_projects(&self, officer_id: &UserId) -> Result<Vec<&Project>, AllocationError> {
        let officer = self.officer_ref(officer_id)?;
        Ok(officer
            .handled_projects
            .iter()
            .filter_map(|name| self.projects.get(name))
            .collect())
    }

    fn registration_ref(
        &self,
        id: &RegistrationId,
    ) -> Result<&OfficerRegistration, AllocationError> {
        self.registrations
            .get(id)
            .ok_or_else(|| AllocationError::UnknownRegistration(id.clone()))
    }

    fn has_applied_for(&self, user: &UserId, project: &ProjectName) -> bool {
        self.applicants
            .get(user)
            .and_then(|applicant| applicant.application.as_ref())
            .and_then(|id| self.applications.get(id))
            .is_some_and(|application| &application.project == project)
    }

    /// First approved assignment of `officer` on another project overlapping `window`.
    fn overlapping_assignment(
        &self,
        officer: &UserId,
        project: &ProjectName,
        window: &ApplicationWindow,
    ) -> Option<ProjectName> {
        self.registrations
            .values()
            .filter(|registration| {
                &registration.officer == officer
                    && registration.status == RegistrationStatus::Approved
                    && &registration.project != project
            })
            .find(|registration| {
                self.projects
                    .get(&registration.project)
                    .is_some_and(|other| other.window.overlaps(window))
            })
            .map(|registration| registration.project.clone())
    }
}
