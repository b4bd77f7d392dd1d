//! Support ticket domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerline_core::{ClientId, ProjectId, TeamMemberId, TicketId, TicketPriority, TicketStatus};

use super::{ValidationError, optional_text, required_text};
use crate::db::{Collection, Document};

/// A support request, optionally tied to a client, project, and assignee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub subject: String,
    pub description: Option<String>,
    pub client: Option<ClientId>,
    pub project: Option<ProjectId>,
    pub assignee: Option<TeamMemberId>,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Ticket {
    const COLLECTION: Collection = Collection::Tickets;
    type Id = TicketId;

    fn id(&self) -> TicketId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketInput {
    pub subject: String,
    pub description: Option<String>,
    pub client: Option<ClientId>,
    pub project: Option<ProjectId>,
    pub assignee: Option<TeamMemberId>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketInput {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub client: Option<ClientId>,
    pub project: Option<ProjectId>,
    pub assignee: Option<TeamMemberId>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
}

impl Ticket {
    /// Build a new ticket. References are checked by the caller.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the subject is blank.
    pub fn create(input: CreateTicketInput, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: TicketId::generate(),
            subject: required_text("subject", &input.subject)?,
            description: optional_text(input.description),
            client: input.client,
            project: input.project,
            assignee: input.assignee,
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if a supplied subject is blank.
    pub fn apply(
        &mut self,
        input: UpdateTicketInput,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if let Some(subject) = input.subject {
            self.subject = required_text("subject", &subject)?;
        }
        if input.description.is_some() {
            self.description = optional_text(input.description);
        }
        if input.client.is_some() {
            self.client = input.client;
        }
        if input.project.is_some() {
            self.project = input.project;
        }
        if input.assignee.is_some() {
            self.assignee = input.assignee;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(priority) = input.priority {
            self.priority = priority;
        }
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let input: CreateTicketInput =
            serde_json::from_str(r#"{"subject": "Login broken"}"#).unwrap();
        let ticket = Ticket::create(input, Utc::now()).unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, TicketPriority::Medium);
        assert!(ticket.assignee.is_none());
    }

    #[test]
    fn test_unknown_priority_rejected() {
        let result: Result<CreateTicketInput, _> =
            serde_json::from_str(r#"{"subject": "x", "priority": "critical"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_moves_status() {
        let input: CreateTicketInput = serde_json::from_str(r#"{"subject": "x"}"#).unwrap();
        let mut ticket = Ticket::create(input, Utc::now()).unwrap();
        let update: UpdateTicketInput =
            serde_json::from_str(r#"{"status": "in_progress", "priority": "urgent"}"#).unwrap();
        ticket.apply(update, Utc::now()).unwrap();

        assert_eq!(ticket.status, TicketStatus::InProgress);
        assert_eq!(ticket.priority, TicketPriority::Urgent);
        assert_eq!(ticket.subject, "x");
    }
}
