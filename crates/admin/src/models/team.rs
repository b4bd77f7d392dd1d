//! Team member domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerline_core::{Email, TeamMemberId, TeamMemberStatus};

use super::{ValidationError, optional_text, required_text};
use crate::db::{Collection, Document};

/// A person on the team; tickets may be assigned to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: TeamMemberId,
    pub name: String,
    pub email: Email,
    pub role: Option<String>,
    pub status: TeamMemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for TeamMember {
    const COLLECTION: Collection = Collection::TeamMembers;
    type Id = TeamMemberId;

    fn id(&self) -> TeamMemberId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamMemberInput {
    pub name: String,
    pub email: Email,
    pub role: Option<String>,
    pub status: Option<TeamMemberStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamMemberInput {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub role: Option<String>,
    pub status: Option<TeamMemberStatus>,
}

impl TeamMember {
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is blank.
    pub fn create(
        input: CreateTeamMemberInput,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: TeamMemberId::generate(),
            name: required_text("name", &input.name)?,
            email: input.email,
            role: optional_text(input.role),
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `ValidationError` if a supplied name is blank.
    pub fn apply(
        &mut self,
        input: UpdateTeamMemberInput,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if let Some(name) = input.name {
            self.name = required_text("name", &name)?;
        }
        if let Some(email) = input.email {
            self.email = email;
        }
        if input.role.is_some() {
            self.role = optional_text(input.role);
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        self.updated_at = now;
        Ok(())
    }
}
