use super::domain::{Application, ApplicationId, ApplicationStatus, UserId, WithdrawalOutcome};
use super::engine::AllocationEngine;
use super::error::AllocationError;

impl AllocationEngine {
    /// Flag the applicant's live application for withdrawal. Status and inventory are untouched.
    pub fn request_withdrawal(
        &mut self,
        applicant_id: &UserId,
    ) -> Result<ApplicationId, AllocationError> {
        let application_id = self
            .applicant_ref(applicant_id)?
            .application
            .clone()
            .ok_or_else(|| AllocationError::NoActiveApplication(applicant_id.clone()))?;
        let application = self
            .applications
            .get_mut(&application_id)
            .ok_or_else(|| AllocationError::UnknownApplication(application_id.clone()))?;

        if application.withdrawal_requested {
            return Err(AllocationError::AlreadyRequested(application_id));
        }
        application.withdrawal_requested = true;
        Ok(application_id)
    }

    /// Staff decision on a flagged application.
    ///
    /// Approval closes the application and, when it had been booked, returns its unit to
    /// the project ledger. A booked application can only be closed once, so the unit is
    /// released at most once. Rejection clears the flag and leaves the lifecycle where it
    /// was.
    pub fn decide_withdrawal(
        &mut self,
        application_id: &ApplicationId,
        approve: bool,
    ) -> Result<WithdrawalOutcome, AllocationError> {
        let application = self
            .applications
            .get_mut(application_id)
            .ok_or_else(|| AllocationError::UnknownApplication(application_id.clone()))?;

        if !application.withdrawal_requested {
            return Err(AllocationError::NotRequested(application_id.clone()));
        }
        if !approve {
            application.withdrawal_requested = false;
            return Ok(WithdrawalOutcome::Rejected);
        }

        let released = if application.status == ApplicationStatus::Booked {
            let project = self
                .projects
                .get_mut(&application.project)
                .ok_or_else(|| AllocationError::UnknownProject(application.project.clone()))?;
            project.inventory.release(application.flat_type);
            Some(application.flat_type)
        } else {
            None
        };

        application.status = ApplicationStatus::Withdrawn;
        application.withdrawal_requested = false;
        let applicant = application.applicant.clone();
        self.detach_application(&applicant, application_id);

        Ok(WithdrawalOutcome::Approved { released })
    }

    /// Live applications waiting on a withdrawal decision.
    pub fn pending_withdrawals(&self) -> Vec<&Application> {
        self.applications
            .values()
            .filter(|application| application.withdrawal_requested && application.status.is_live())
            .collect()
    }
}
