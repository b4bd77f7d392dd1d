//! Work-session stopwatch.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::instrument;

use ledgerline_core::WorkSessionId;

use super::references::{ReferenceError, References};
use crate::db::{Repository, RepositoryError, Store};
use crate::models::{BillableHours, StartWorkSessionInput, WorkSession};

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("work session not found")]
    NotFound,

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Starts and stops work sessions.
pub struct TimerService<'a> {
    store: &'a Store,
}

impl<'a> TimerService<'a> {
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Open sessions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn running(&self) -> Result<Vec<WorkSession>, TimerError> {
        Ok(Repository::<WorkSession>::new(self.store).list().await?)
    }

    /// Start a stopwatch for a client's project.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::Reference` if the client or project is unknown or
    /// the project belongs to another client.
    #[instrument(skip(self, input), fields(client = %input.client, project = %input.project))]
    pub async fn start(&self, input: StartWorkSessionInput) -> Result<WorkSession, TimerError> {
        References::new(self.store)
            .client_project(Some(input.client), Some(input.project))
            .await?;

        let session = WorkSession::start(input, Utc::now());
        Repository::new(self.store).insert(&session).await?;
        Ok(session)
    }

    /// Stop a session, recording its elapsed time as billable hours.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::NotFound` if no such session is running.
    pub async fn stop(&self, id: WorkSessionId) -> Result<BillableHours, TimerError> {
        self.stop_at(id, Utc::now()).await
    }

    /// Stop a session as of `now`.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::NotFound` if no such session is running.
    #[instrument(skip(self), fields(session_id = %id))]
    pub async fn stop_at(
        &self,
        id: WorkSessionId,
        now: DateTime<Utc>,
    ) -> Result<BillableHours, TimerError> {
        let sessions = Repository::<WorkSession>::new(self.store);
        let session = sessions.get(id).await?.ok_or(TimerError::NotFound)?;

        let record = session.stop(now);
        Repository::new(self.store).insert(&record).await?;
        sessions.delete(id).await?;

        tracing::info!(
            billable_id = %record.id,
            total_hours = %record.total_hours,
            "Work session stopped"
        );
        Ok(record)
    }

    /// Discard a running session without recording hours.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::NotFound` if no such session is running.
    pub async fn discard(&self, id: WorkSessionId) -> Result<(), TimerError> {
        if Repository::<WorkSession>::new(self.store).delete(id).await? {
            Ok(())
        } else {
            Err(TimerError::NotFound)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{Client, CreateClientInput, CreateProjectInput, Project};

    async fn project(store: &Store) -> Project {
        let client = Client::create(
            CreateClientInput {
                name: "Acme".to_string(),
                email: None,
                company: None,
                phone: None,
                address: None,
                status: None,
            },
            Utc::now(),
        )
        .unwrap();
        Repository::new(store).insert(&client).await.unwrap();

        let project = Project::create(
            CreateProjectInput {
                name: "Website".to_string(),
                description: None,
                client: client.id,
                status: None,
                start_date: None,
                end_date: None,
            },
            Utc::now(),
        )
        .unwrap();
        Repository::new(store).insert(&project).await.unwrap();
        project
    }

    #[tokio::test]
    async fn test_start_then_stop_records_hours() {
        let store = Store::memory();
        let project = project(&store).await;
        let timer = TimerService::new(&store);

        let session = timer
            .start(StartWorkSessionInput {
                client: project.client,
                project: project.id,
                description: None,
                billable: None,
            })
            .await
            .unwrap();
        assert_eq!(timer.running().await.unwrap().len(), 1);

        let record = timer
            .stop_at(session.id, session.started_at + Duration::minutes(45))
            .await
            .unwrap();
        assert_eq!(record.total_hours, Decimal::new(75, 2));
        assert!(timer.running().await.unwrap().is_empty());

        let stored = Repository::<BillableHours>::new(&store)
            .get(record.id)
            .await
            .unwrap();
        assert_eq!(stored, Some(record));

        assert!(matches!(
            timer.stop(session.id).await,
            Err(TimerError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_start_rejects_foreign_project() {
        let store = Store::memory();
        let mine = project(&store).await;
        let other = project(&store).await;

        let result = TimerService::new(&store)
            .start(StartWorkSessionInput {
                client: other.client,
                project: mine.id,
                description: None,
                billable: None,
            })
            .await;
        assert!(matches!(
            result,
            Err(TimerError::Reference(ReferenceError::ProjectClientMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn test_discard() {
        let store = Store::memory();
        let project = project(&store).await;
        let timer = TimerService::new(&store);
        let session = timer
            .start(StartWorkSessionInput {
                client: project.client,
                project: project.id,
                description: None,
                billable: Some(false),
            })
            .await
            .unwrap();

        timer.discard(session.id).await.unwrap();
        assert!(matches!(
            timer.discard(session.id).await,
            Err(TimerError::NotFound)
        ));
    }
}
