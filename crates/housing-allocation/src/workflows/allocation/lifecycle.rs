use super::domain::{
    Application, ApplicationId, ApplicationStatus, BookingReceipt, FlatType, ProjectName, UserId,
};
use super::engine::AllocationEngine;
use super::error::AllocationError;

impl AllocationEngine {
    /// Submit a new application. Units are checked here but only reserved at booking.
    pub fn apply(
        &mut self,
        applicant_id: &UserId,
        project_name: &ProjectName,
        flat_type: FlatType,
    ) -> Result<ApplicationId, AllocationError> {
        let applicant = self.applicant_ref(applicant_id)?;
        let project = self.project_ref(project_name)?;

        if applicant.application.is_some() {
            return Err(AllocationError::AlreadyApplied(applicant_id.clone()));
        }
        if !self
            .policy
            .is_eligible(applicant.age, applicant.marital_status, flat_type)
        {
            return Err(AllocationError::NotEligible {
                applicant: applicant_id.clone(),
                flat_type,
            });
        }
        if !project.visible {
            return Err(AllocationError::ProjectNotVisible(project_name.clone()));
        }
        if project.inventory.available(flat_type) == 0 {
            return Err(AllocationError::NoUnitsAvailable(flat_type));
        }

        let id = self.next_application_id();
        let application = Application::new(
            id.clone(),
            applicant_id.clone(),
            project_name.clone(),
            flat_type,
        );
        if let Some(applicant) = self.applicants.get_mut(applicant_id) {
            applicant.application = Some(id.clone());
        }
        self.applications.insert(id.clone(), application);

        Ok(id)
    }

    /// Staff approval or rejection of a pending application.
    pub fn decide(
        &mut self,
        application_id: &ApplicationId,
        approve: bool,
    ) -> Result<ApplicationStatus, AllocationError> {
        let application = self
            .applications
            .get_mut(application_id)
            .ok_or_else(|| AllocationError::UnknownApplication(application_id.clone()))?;

        if application.status != ApplicationStatus::Pending {
            return Err(AllocationError::InvalidTransition {
                status: application.status.label(),
                action: "decide on an application",
            });
        }

        if approve {
            application.status = ApplicationStatus::Successful;
            return Ok(application.status);
        }

        application.status = ApplicationStatus::Unsuccessful;
        application.withdrawal_requested = false;
        let applicant = application.applicant.clone();
        self.detach_application(&applicant, application_id);
        Ok(ApplicationStatus::Unsuccessful)
    }

    /// Consume one unit for a successful application. Returns the units left.
    pub fn book(&mut self, application_id: &ApplicationId) -> Result<u32, AllocationError> {
        let application = self
            .applications
            .get_mut(application_id)
            .ok_or_else(|| AllocationError::UnknownApplication(application_id.clone()))?;

        if application.status != ApplicationStatus::Successful {
            return Err(AllocationError::InvalidTransition {
                status: application.status.label(),
                action: "book a flat",
            });
        }

        let project = self
            .projects
            .get_mut(&application.project)
            .ok_or_else(|| AllocationError::UnknownProject(application.project.clone()))?;
        let remaining = project.inventory.reserve(application.flat_type)?;
        application.status = ApplicationStatus::Booked;

        Ok(remaining)
    }

    /// Booking performed by an officer, who must handle the application's project.
    pub fn book_as(
        &mut self,
        officer_id: &UserId,
        application_id: &ApplicationId,
    ) -> Result<u32, AllocationError> {
        let officer = self.officer_ref(officer_id)?;
        let application = self.application_ref(application_id)?;
        if !officer.handles(&application.project) {
            return Err(AllocationError::NotHandlingProject {
                officer: officer_id.clone(),
                project: application.project.clone(),
            });
        }
        self.book(application_id)
    }

    pub fn application_of(
        &self,
        applicant_id: &UserId,
    ) -> Result<Option<&Application>, AllocationError> {
        let applicant = self.applicant_ref(applicant_id)?;
        Ok(applicant
            .application
            .as_ref()
            .and_then(|id| self.applications.get(id)))
    }

    pub fn receipt(
        &self,
        officer_id: &UserId,
        applicant_id: &UserId,
    ) -> Result<BookingReceipt, AllocationError> {
        let officer = self.officer_ref(officer_id)?;
        let applicant = self.applicant_ref(applicant_id)?;
        let application = self
            .application_of(applicant_id)?
            .ok_or_else(|| AllocationError::NoActiveApplication(applicant_id.clone()))?;

        if !officer.handles(&application.project) {
            return Err(AllocationError::NotHandlingProject {
                officer: officer_id.clone(),
                project: application.project.clone(),
            });
        }
        if application.status != ApplicationStatus::Booked {
            return Err(AllocationError::InvalidTransition {
                status: application.status.label(),
                action: "issue a booking receipt",
            });
        }

        let project = self.project_ref(&application.project)?;
        Ok(BookingReceipt {
            applicant: applicant.id.clone(),
            age: applicant.age,
            marital_status: applicant.marital_status,
            flat_type: application.flat_type,
            project: project.name.clone(),
            neighborhood: project.neighborhood.clone(),
        })
    }
}
