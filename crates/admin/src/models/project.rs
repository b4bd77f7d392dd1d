//! Project domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use ledgerline_core::{ClientId, ProjectId, ProjectStatus};

use super::{ValidationError, optional_text, required_text};
use crate::db::{Collection, Document};

/// A body of work performed for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub client: ClientId,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Project {
    const COLLECTION: Collection = Collection::Projects;
    type Id = ProjectId;

    fn id(&self) -> ProjectId {
        self.id
    }
}

/// Input for creating a project.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    pub name: String,
    pub description: Option<String>,
    pub client: ClientId,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Input for updating a project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client: Option<ClientId>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Project {
    /// Build a new project. The client reference is checked by the caller.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is blank or the dates are reversed.
    pub fn create(input: CreateProjectInput, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let project = Self {
            id: ProjectId::generate(),
            name: required_text("name", &input.name)?,
            description: optional_text(input.description),
            client: input.client,
            status: input.status.unwrap_or_default(),
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: now,
            updated_at: now,
        };
        project.check_dates()?;
        Ok(project)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if a supplied name is blank or the resulting
    /// dates are reversed.
    pub fn apply(
        &mut self,
        input: UpdateProjectInput,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if let Some(name) = input.name {
            self.name = required_text("name", &name)?;
        }
        if input.description.is_some() {
            self.description = optional_text(input.description);
        }
        if let Some(client) = input.client {
            self.client = client;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if input.start_date.is_some() {
            self.start_date = input.start_date;
        }
        if input.end_date.is_some() {
            self.end_date = input.end_date;
        }
        self.check_dates()?;
        self.updated_at = now;
        Ok(())
    }

    fn check_dates(&self) -> Result<(), ValidationError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end < start => Err(ValidationError(
                "endDate must not be before startDate".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(json: serde_json::Value) -> CreateProjectInput {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_create_requires_client() {
        let missing: Result<CreateProjectInput, _> =
            serde_json::from_value(serde_json::json!({"name": "Website"}));
        assert!(missing.is_err());
    }

    #[test]
    fn test_reversed_dates_rejected() {
        let client = ClientId::generate();
        let err = Project::create(
            input(serde_json::json!({
                "name": "Website",
                "client": client,
                "startDate": "2026-03-01",
                "endDate": "2026-02-01",
            })),
            Utc::now(),
        )
        .unwrap_err();
        assert!(err.0.contains("endDate"));
    }

    #[test]
    fn test_apply_checks_merged_dates() {
        let client = ClientId::generate();
        let mut project = Project::create(
            input(serde_json::json!({
                "name": "Website",
                "client": client,
                "startDate": "2026-03-01",
            })),
            Utc::now(),
        )
        .unwrap();

        let update: UpdateProjectInput =
            serde_json::from_value(serde_json::json!({"endDate": "2026-01-15"})).unwrap();
        assert!(project.apply(update, Utc::now()).is_err());

        let update: UpdateProjectInput =
            serde_json::from_value(serde_json::json!({"status": "on_hold"})).unwrap();
        project.apply(update, Utc::now()).unwrap();
        assert_eq!(project.status, ProjectStatus::OnHold);
    }
}
