//! Referential checks shared by the resource handlers.

use thiserror::Error;

use ledgerline_core::{ClientId, ProjectId, TeamMemberId};

use crate::db::{Repository, RepositoryError, Store};
use crate::models::{Client, Project, TeamMember};

/// A referenced document is missing or inconsistent.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("client {0} does not exist")]
    UnknownClient(ClientId),

    #[error("project {0} does not exist")]
    UnknownProject(ProjectId),

    #[error("team member {0} does not exist")]
    UnknownTeamMember(TeamMemberId),

    #[error("project {project} does not belong to client {client}")]
    ProjectClientMismatch { project: ProjectId, client: ClientId },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Looks up referenced documents in the store.
pub struct References<'a> {
    store: &'a Store,
}

impl<'a> References<'a> {
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `ReferenceError::UnknownClient` if the client does not exist.
    pub async fn client(&self, id: ClientId) -> Result<(), ReferenceError> {
        if Repository::<Client>::new(self.store).exists(id).await? {
            Ok(())
        } else {
            Err(ReferenceError::UnknownClient(id))
        }
    }

    /// # Errors
    ///
    /// Returns `ReferenceError::UnknownProject` if the project does not exist.
    pub async fn project(&self, id: ProjectId) -> Result<Project, ReferenceError> {
        Repository::<Project>::new(self.store)
            .get(id)
            .await?
            .ok_or(ReferenceError::UnknownProject(id))
    }

    /// # Errors
    ///
    /// Returns `ReferenceError::UnknownTeamMember` if the member does not exist.
    pub async fn team_member(&self, id: TeamMemberId) -> Result<(), ReferenceError> {
        if Repository::<TeamMember>::new(self.store).exists(id).await? {
            Ok(())
        } else {
            Err(ReferenceError::UnknownTeamMember(id))
        }
    }

    /// Check an optional client/project pair: each must exist, and when both
    /// are given the project must belong to the client.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub async fn client_project(
        &self,
        client: Option<ClientId>,
        project: Option<ProjectId>,
    ) -> Result<(), ReferenceError> {
        if let Some(client) = client {
            self.client(client).await?;
        }
        if let Some(project_id) = project {
            let project = self.project(project_id).await?;
            if let Some(client) = client
                && project.client != client
            {
                return Err(ReferenceError::ProjectClientMismatch {
                    project: project_id,
                    client,
                });
            }
        }
        Ok(())
    }
}
