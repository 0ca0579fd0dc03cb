use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::domain::{
    Applicant, Application, Officer, OfficerRegistration, Project, ProjectName,
    RegistrationStatus, UserId,
};
use super::engine::AllocationEngine;
use crate::config::AllocationConfig;

/// Full export of the record set handed to the persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSnapshot {
    #[serde(default)]
    pub applicants: Vec<Applicant>,
    #[serde(default)]
    pub officers: Vec<UserId>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub registrations: Vec<OfficerRegistration>,
}

impl AllocationSnapshot {
    pub fn from_json_str(raw: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot integrity violation: {0}")]
    Integrity(String),
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence seam: where snapshots come from and go to is the caller's business.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<AllocationSnapshot, SnapshotError>;
    fn save(&self, snapshot: &AllocationSnapshot) -> Result<(), SnapshotError>;
}

fn integrity(message: String) -> SnapshotError {
    SnapshotError::Integrity(message)
}

fn index_unique<K, V, F>(
    records: Vec<V>,
    key: F,
    kind: &str,
) -> Result<BTreeMap<K, V>, SnapshotError>
where
    K: Ord + std::fmt::Display,
    F: Fn(&V) -> K,
{
    let mut indexed = BTreeMap::new();
    for record in records {
        let id = key(&record);
        if indexed.contains_key(&id) {
            return Err(integrity(format!("duplicate {kind} {id}")));
        }
        indexed.insert(id, record);
    }
    Ok(indexed)
}

/// Project names are unique regardless of case, as at creation time.
fn reject_case_variants(projects: &[Project]) -> Result<(), SnapshotError> {
    for (index, project) in projects.iter().enumerate() {
        if let Some(other) = projects[index + 1..]
            .iter()
            .find(|other| other.name.matches_ignore_case(&project.name.0))
        {
            return Err(integrity(format!(
                "duplicate project {} (also listed as {})",
                project.name, other.name
            )));
        }
    }
    Ok(())
}

impl AllocationEngine {
    /// Hydrate an engine, rejecting records that break the cross-record invariants.
    pub fn from_snapshot(
        config: &AllocationConfig,
        snapshot: AllocationSnapshot,
    ) -> Result<Self, SnapshotError> {
        let AllocationSnapshot {
            applicants,
            officers,
            projects,
            applications,
            registrations,
        } = snapshot;

        let mut engine = Self::new(config);
        engine.applicants = index_unique(applicants, |a: &Applicant| a.id.clone(), "applicant")?;
        engine.officers = index_unique(
            officers.into_iter().map(Officer::new).collect(),
            |o: &Officer| o.id.clone(),
            "officer",
        )?;
        reject_case_variants(&projects)?;
        engine.projects = index_unique(projects, |p: &Project| p.name.clone(), "project")?;
        engine.applications =
            index_unique(applications, |a: &Application| a.id.clone(), "application")?;
        engine.registrations = index_unique(
            registrations,
            |r: &OfficerRegistration| r.id.clone(),
            "registration",
        )?;

        engine.validate_links()?;
        engine.validate_assignments()?;

        let assignments: Vec<(UserId, ProjectName)> = engine
            .registrations
            .values()
            .filter(|registration| registration.status == RegistrationStatus::Approved)
            .map(|registration| (registration.officer.clone(), registration.project.clone()))
            .collect();
        for (officer_id, project_name) in assignments {
            if let Some(officer) = engine.officers.get_mut(&officer_id) {
                officer.handled_projects.insert(project_name);
            }
        }

        engine.application_sequence = engine.applications.len() as u64;
        engine.registration_sequence = engine.registrations.len() as u64;
        Ok(engine)
    }

    /// Export every record, including mutated counters, statuses and flags.
    pub fn snapshot(&self) -> AllocationSnapshot {
        AllocationSnapshot {
            applicants: self.applicants.values().cloned().collect(),
            officers: self.officers.keys().cloned().collect(),
            projects: self.projects.values().cloned().collect(),
            applications: self.applications.values().cloned().collect(),
            registrations: self.registrations.values().cloned().collect(),
        }
    }

    fn validate_links(&self) -> Result<(), SnapshotError> {
        for application in self.applications.values() {
            if !self.applicants.contains_key(&application.applicant) {
                return Err(integrity(format!(
                    "application {} references unknown applicant {}",
                    application.id, application.applicant
                )));
            }
            if !self.projects.contains_key(&application.project) {
                return Err(integrity(format!(
                    "application {} references unknown project {}",
                    application.id, application.project
                )));
            }
            let linked = self
                .applicants
                .get(&application.applicant)
                .and_then(|applicant| applicant.application.as_ref())
                == Some(&application.id);
            if application.status.is_live() != linked {
                return Err(integrity(format!(
                    "application {} is {} but {} linked to applicant {}",
                    application.id,
                    application.status.label(),
                    if linked { "is" } else { "is not" },
                    application.applicant
                )));
            }
        }

        for applicant in self.applicants.values() {
            if let Some(id) = &applicant.application {
                match self.applications.get(id) {
                    Some(application) if application.applicant == applicant.id => {}
                    Some(application) => {
                        return Err(integrity(format!(
                            "applicant {} points at application {} owned by {}",
                            applicant.id, id, application.applicant
                        )))
                    }
                    None => {
                        return Err(integrity(format!(
                            "applicant {} points at unknown application {}",
                            applicant.id, id
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_assignments(&self) -> Result<(), SnapshotError> {
        let mut approved: BTreeMap<&UserId, Vec<&Project>> = BTreeMap::new();
        let mut staffed: BTreeMap<&ProjectName, BTreeSet<&UserId>> = BTreeMap::new();
        for registration in self.registrations.values() {
            if !self.officers.contains_key(&registration.officer) {
                return Err(integrity(format!(
                    "registration {} references unknown officer {}",
                    registration.id, registration.officer
                )));
            }
            let project = self.projects.get(&registration.project).ok_or_else(|| {
                integrity(format!(
                    "registration {} references unknown project {}",
                    registration.id, registration.project
                ))
            })?;
            if registration.status == RegistrationStatus::Approved {
                let fresh = staffed
                    .entry(&project.name)
                    .or_default()
                    .insert(&registration.officer);
                if !fresh {
                    return Err(integrity(format!(
                        "officer {} is approved twice for project {}",
                        registration.officer, project.name
                    )));
                }
                approved.entry(&registration.officer).or_default().push(project);
            }
        }

        for project in self.projects.values() {
            let officers = staffed.remove(&project.name).unwrap_or_default();
            if officers.len() as u64 > u64::from(project.officer_slots) {
                return Err(integrity(format!(
                    "project {} has {} approved officers for {} slots",
                    project.name,
                    officers.len(),
                    project.officer_slots
                )));
            }
            if !project.officers.iter().eq(officers.iter().copied()) {
                return Err(integrity(format!(
                    "project {} lists officers that differ from its approved registrations",
                    project.name
                )));
            }
        }

        for (officer, projects) in approved {
            for (index, project) in projects.iter().enumerate() {
                let clash = projects[index + 1..].iter().find(|other| {
                    other.name != project.name && other.window.overlaps(&project.window)
                });
                if let Some(other) = clash {
                    return Err(integrity(format!(
                        "officer {} is approved for overlapping projects {} and {}",
                        officer, project.name, other.name
                    )));
                }
            }
        }
        Ok(())
    }
}
