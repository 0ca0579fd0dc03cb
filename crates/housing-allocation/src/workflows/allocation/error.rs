use super::domain::{ApplicationId, FlatType, ProjectName, RegistrationId, UserId};

/// Recoverable failures returned by engine operations.
///
/// Every variant is produced before any state is touched, so a failed call leaves the
/// record set exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("applicant {applicant} is not eligible for a {flat_type} flat")]
    NotEligible {
        applicant: UserId,
        flat_type: FlatType,
    },
    #[error("applicant {0} already holds a live application")]
    AlreadyApplied(UserId),
    #[error("project {0} is not open to applicants")]
    ProjectNotVisible(ProjectName),
    #[error("no {0} units available")]
    NoUnitsAvailable(FlatType),
    #[error("cannot {action} while status is {status}")]
    InvalidTransition {
        status: &'static str,
        action: &'static str,
    },
    #[error("officer {officer} has applied for {project} and cannot handle it")]
    SelfConflict {
        officer: UserId,
        project: ProjectName,
    },
    #[error("{holder} is already assigned to {conflicting}, whose application window overlaps")]
    OverlappingAssignment {
        holder: UserId,
        conflicting: ProjectName,
    },
    #[error("project {0} has no remaining officer slots")]
    NoSlotsAvailable(ProjectName),
    #[error("applicant {0} has no active application")]
    NoActiveApplication(UserId),
    #[error("withdrawal already requested for application {0}")]
    AlreadyRequested(ApplicationId),
    #[error("no withdrawal was requested for application {0}")]
    NotRequested(ApplicationId),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unknown applicant {0}")]
    UnknownApplicant(UserId),
    #[error("unknown officer {0}")]
    UnknownOfficer(UserId),
    #[error("unknown project {0}")]
    UnknownProject(ProjectName),
    #[error("unknown application {0}")]
    UnknownApplication(ApplicationId),
    #[error("unknown officer registration {0}")]
    UnknownRegistration(RegistrationId),
    #[error("a project named {0} already exists")]
    DuplicateProject(ProjectName),
    #[error("officer {officer} already has an open registration for {project}")]
    DuplicateRegistration {
        officer: UserId,
        project: ProjectName,
    },
    #[error("project {0} is still referenced by applications or registrations")]
    ProjectInUse(ProjectName),
    #[error("officer {officer} does not handle project {project}")]
    NotHandlingProject {
        officer: UserId,
        project: ProjectName,
    },
}

impl AllocationError {
    /// Stable machine-readable code for API payloads.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotEligible { .. } => "not_eligible",
            Self::AlreadyApplied(_) => "already_applied",
            Self::ProjectNotVisible(_) => "project_not_visible",
            Self::NoUnitsAvailable(_) => "no_units_available",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::SelfConflict { .. } => "self_conflict",
            Self::OverlappingAssignment { .. } => "overlapping_assignment",
            Self::NoSlotsAvailable(_) => "no_slots_available",
            Self::NoActiveApplication(_) => "no_active_application",
            Self::AlreadyRequested(_) => "already_requested",
            Self::NotRequested(_) => "not_requested",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::UnknownApplicant(_) => "unknown_applicant",
            Self::UnknownOfficer(_) => "unknown_officer",
            Self::UnknownProject(_) => "unknown_project",
            Self::UnknownApplication(_) => "unknown_application",
            Self::UnknownRegistration(_) => "unknown_registration",
            Self::DuplicateProject(_) => "duplicate_project",
            Self::DuplicateRegistration { .. } => "duplicate_registration",
            Self::ProjectInUse(_) => "project_in_use",
            Self::NotHandlingProject { .. } => "not_handling_project",
        }
    }
}
