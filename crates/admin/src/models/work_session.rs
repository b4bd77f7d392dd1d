//! Work-session stopwatch model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerline_core::{BillableHoursId, ClientId, ProjectId, WorkSessionId, hours_between};

use super::billable::BillableHours;
use super::optional_text;
use crate::db::{Collection, Document};

/// A running stopwatch. Stopping it yields a [`BillableHours`] record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    pub id: WorkSessionId,
    pub client: ClientId,
    pub project: ProjectId,
    pub description: Option<String>,
    pub started_at: DateTime<Utc>,
    pub billable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for WorkSession {
    const COLLECTION: Collection = Collection::WorkSessions;
    type Id = WorkSessionId;

    fn id(&self) -> WorkSessionId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkSessionInput {
    pub client: ClientId,
    pub project: ProjectId,
    pub description: Option<String>,
    pub billable: Option<bool>,
}

impl WorkSession {
    #[must_use]
    pub fn start(input: StartWorkSessionInput, now: DateTime<Utc>) -> Self {
        Self {
            id: WorkSessionId::generate(),
            client: input.client,
            project: input.project,
            description: optional_text(input.description),
            started_at: now,
            billable: input.billable.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    /// Close the stopwatch at `now`.
    ///
    /// A clock that moved backwards yields zero hours rather than a
    /// reversed record.
    #[must_use]
    pub fn stop(&self, now: DateTime<Utc>) -> BillableHours {
        let end_time = now.max(self.started_at);
        let total_hours = hours_between(self.started_at, end_time).unwrap_or_default();

        BillableHours {
            id: BillableHoursId::generate(),
            start_time: self.started_at,
            end_time,
            billable: self.billable,
            total_hours,
            project: self.project,
            client: self.client,
            description: self.description.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}
