use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::inventory::InventoryLedger;

/// Identity of any user in the program (applicant, officer or manager), NRIC style.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique project key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(pub String);

impl ProjectName {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn matches_ignore_case(&self, other: &str) -> bool {
        self.0.trim().eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for flat applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for officer registrations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(pub String);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlatType {
    TwoRoom,
    ThreeRoom,
}

impl FlatType {
    pub const ALL: [Self; 2] = [Self::TwoRoom, Self::ThreeRoom];

    /// The only type open to single applicants.
    pub const fn smallest() -> Self {
        Self::TwoRoom
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TwoRoom => "2-Room",
            Self::ThreeRoom => "3-Room",
        }
    }
}

impl fmt::Display for FlatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
}

impl MaritalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Married => "Married",
        }
    }
}

/// Status tracked throughout the application lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Successful,
    Unsuccessful,
    Booked,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Unsuccessful => "unsuccessful",
            Self::Booked => "booked",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Live applications count against the one-application-per-applicant rule.
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Successful | Self::Booked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Inclusive date range during which a project accepts applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationWindow {
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
}

impl ApplicationWindow {
    pub const fn new(opens_on: NaiveDate, closes_on: NaiveDate) -> Self {
        Self {
            opens_on,
            closes_on,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.closes_on >= self.opens_on
    }

    /// Boundaries are inclusive: windows sharing a single day overlap.
    pub fn overlaps(&self, other: &ApplicationWindow) -> bool {
        !(self.closes_on < other.opens_on || self.opens_on > other.closes_on)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: UserId,
    pub age: u8,
    pub marital_status: MaritalStatus,
    #[serde(default)]
    pub application: Option<ApplicationId>,
}

impl Applicant {
    pub fn new(id: UserId, age: u8, marital_status: MaritalStatus) -> Self {
        Self {
            id,
            age,
            marital_status,
            application: None,
        }
    }
}

/// Officer profile; the handled set is derived from approved assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Officer {
    pub id: UserId,
    pub handled_projects: BTreeSet<ProjectName>,
}

impl Officer {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            handled_projects: BTreeSet::new(),
        }
    }

    pub fn handles(&self, project: &ProjectName) -> bool {
        self.handled_projects.contains(project)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: ProjectName,
    pub neighborhood: String,
    pub window: ApplicationWindow,
    pub manager: UserId,
    pub visible: bool,
    /// Total officer slots; remaining slots are derived from `officers`.
    pub officer_slots: u32,
    #[serde(default)]
    pub officers: BTreeSet<UserId>,
    pub inventory: InventoryLedger,
}

impl Project {
    pub fn remaining_officer_slots(&self) -> u32 {
        let assigned = u32::try_from(self.officers.len()).unwrap_or(u32::MAX);
        self.officer_slots.saturating_sub(assigned)
    }

    pub fn is_managed_by(&self, manager: &UserId) -> bool {
        &self.manager == manager
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub applicant: UserId,
    pub project: ProjectName,
    pub flat_type: FlatType,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub withdrawal_requested: bool,
}

impl Application {
    pub(crate) fn new(
        id: ApplicationId,
        applicant: UserId,
        project: ProjectName,
        flat_type: FlatType,
    ) -> Self {
        Self {
            id,
            applicant,
            project,
            flat_type,
            status: ApplicationStatus::Pending,
            withdrawal_requested: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerRegistration {
    pub id: RegistrationId,
    pub officer: UserId,
    pub project: ProjectName,
    pub status: RegistrationStatus,
}

/// Staff-facing confirmation of a finalized booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingReceipt {
    pub applicant: UserId,
    pub age: u8,
    pub marital_status: MaritalStatus,
    pub flat_type: FlatType,
    pub project: ProjectName,
    pub neighborhood: String,
}

/// Project summary restricted to the flat types a given applicant may apply for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectListing {
    pub name: ProjectName,
    pub neighborhood: String,
    pub window: ApplicationWindow,
    pub units: Vec<(FlatType, u32)>,
}

/// Result of a staff decision on a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum WithdrawalOutcome {
    Approved { released: Option<FlatType> },
    Rejected,
}
