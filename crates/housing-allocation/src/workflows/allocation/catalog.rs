use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationWindow, FlatType, Project, ProjectListing, ProjectName, UserId};
use super::engine::AllocationEngine;
use super::error::AllocationError;
use super::inventory::InventoryLedger;

/// Staff-supplied fields for a new project, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    pub neighborhood: String,
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
    pub manager: UserId,
    pub officer_slots: i64,
    #[serde(default)]
    pub units: BTreeMap<FlatType, i64>,
}

impl AllocationEngine {
    /// Validate and insert a project. New projects start hidden from applicants.
    pub fn create_project(&mut self, draft: ProjectDraft) -> Result<ProjectName, AllocationError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(AllocationError::InvalidArgument(
                "project name cannot be empty".to_string(),
            ));
        }
        if let Some(existing) = self
            .projects
            .keys()
            .find(|existing| existing.matches_ignore_case(name))
        {
            return Err(AllocationError::DuplicateProject(existing.clone()));
        }

        let neighborhood = draft.neighborhood.trim();
        if neighborhood.is_empty() {
            return Err(AllocationError::InvalidArgument(
                "neighborhood cannot be empty".to_string(),
            ));
        }

        let window = ApplicationWindow::new(draft.opens_on, draft.closes_on);
        if !window.is_well_formed() {
            return Err(AllocationError::InvalidArgument(format!(
                "close date {} is before open date {}",
                window.closes_on, window.opens_on
            )));
        }

        let officer_slots = u32::try_from(draft.officer_slots)
            .ok()
            .filter(|slots| *slots < self.officer_slot_limit)
            .ok_or_else(|| {
                AllocationError::InvalidArgument(format!(
                    "officer slots must be between 0 and {}, got {}",
                    self.officer_slot_limit.saturating_sub(1),
                    draft.officer_slots
                ))
            })?;

        let mut inventory = InventoryLedger::empty();
        for (flat_type, count) in &draft.units {
            inventory.set_capacity(*flat_type, *count)?;
        }

        if let Some(conflicting) = self
            .projects
            .values()
            .find(|project| project.is_managed_by(&draft.manager) && project.window.overlaps(&window))
        {
            return Err(AllocationError::OverlappingAssignment {
                holder: draft.manager.clone(),
                conflicting: conflicting.name.clone(),
            });
        }

        let project_name = ProjectName::new(name);
        self.projects.insert(
            project_name.clone(),
            Project {
                name: project_name.clone(),
                neighborhood: neighborhood.to_string(),
                window,
                manager: draft.manager,
                visible: false,
                officer_slots,
                officers: BTreeSet::new(),
                inventory,
            },
        );
        Ok(project_name)
    }

    /// Staff override of a project's unit count for one flat type.
    pub fn set_inventory(
        &mut self,
        project_name: &ProjectName,
        flat_type: FlatType,
        count: i64,
    ) -> Result<(), AllocationError> {
        self.projects
            .get_mut(project_name)
            .ok_or_else(|| AllocationError::UnknownProject(project_name.clone()))?
            .inventory
            .set_capacity(flat_type, count)
    }

    /// Flip applicant visibility and return the new value.
    pub fn toggle_visibility(&mut self, project_name: &ProjectName) -> Result<bool, AllocationError> {
        let project = self
            .projects
            .get_mut(project_name)
            .ok_or_else(|| AllocationError::UnknownProject(project_name.clone()))?;
        project.visible = !project.visible;
        Ok(project.visible)
    }

    /// Remove a project nothing refers to. Registrations are kept forever, so a project
    /// that ever received one can no longer be deleted.
    pub fn delete_project(&mut self, project_name: &ProjectName) -> Result<Project, AllocationError> {
        self.project_ref(project_name)?;

        let referenced = self
            .applications
            .values()
            .any(|application| &application.project == project_name)
            || self
                .registrations
                .values()
                .any(|registration| &registration.project == project_name);
        if referenced {
            return Err(AllocationError::ProjectInUse(project_name.clone()));
        }

        self.projects
            .remove(project_name)
            .ok_or_else(|| AllocationError::UnknownProject(project_name.clone()))
    }

    /// Visible projects, showing only the flat types this applicant may apply for.
    pub fn projects_for_applicant(
        &self,
        applicant_id: &UserId,
    ) -> Result<Vec<ProjectListing>, AllocationError> {
        let applicant = self.applicant_ref(applicant_id)?;
        let flat_types = self
            .policy
            .eligible_flat_types(applicant.age, applicant.marital_status);
        if flat_types.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .projects
            .values()
            .filter(|project| project.visible)
            .map(|project| ProjectListing {
                name: project.name.clone(),
                neighborhood: project.neighborhood.clone(),
                window: project.window,
                units: flat_types
                    .iter()
                    .map(|flat_type| (*flat_type, project.inventory.available(*flat_type)))
                    .collect(),
            })
            .collect())
    }

    pub fn projects_managed_by(&self, manager: &UserId) -> Vec<&Project> {
        self.projects
            .values()
            .filter(|project| project.is_managed_by(manager))
            .collect()
    }
}
