//! Billable-hours domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_core::{BillableHoursId, ClientId, ProjectId, hours_between};

use super::{ValidationError, optional_text};
use crate::db::{Collection, Document};

/// One timed block of work for a client's project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillableHours {
    pub id: BillableHoursId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub billable: bool,
    pub total_hours: Decimal,
    pub project: ProjectId,
    pub client: ClientId,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for BillableHours {
    const COLLECTION: Collection = Collection::BillableHours;
    type Id = BillableHoursId;

    fn id(&self) -> BillableHoursId {
        self.id
    }
}

/// Input for recording billable hours directly.
///
/// `totalHours` is derived from the times when omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillableInput {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub billable: Option<bool>,
    pub total_hours: Option<Decimal>,
    pub project: ProjectId,
    pub client: ClientId,
    pub description: Option<String>,
}

/// Input for editing billable hours.
///
/// Changing either time without supplying `totalHours` re-derives it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBillableInput {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub billable: Option<bool>,
    pub total_hours: Option<Decimal>,
    pub project: Option<ProjectId>,
    pub client: Option<ClientId>,
    pub description: Option<String>,
}

impl BillableHours {
    /// Build a new record. References are checked by the caller.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the times are reversed or the hours are
    /// negative.
    pub fn create(input: CreateBillableInput, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let measured = measure(input.start_time, input.end_time)?;
        let total_hours = checked_hours(input.total_hours.unwrap_or(measured))?;

        Ok(Self {
            id: BillableHoursId::generate(),
            start_time: input.start_time,
            end_time: input.end_time,
            billable: input.billable.unwrap_or(true),
            total_hours,
            project: input.project,
            client: input.client,
            description: optional_text(input.description),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the resulting times are reversed or the
    /// hours are negative.
    pub fn apply(
        &mut self,
        input: UpdateBillableInput,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let times_changed = input.start_time.is_some() || input.end_time.is_some();
        if let Some(start) = input.start_time {
            self.start_time = start;
        }
        if let Some(end) = input.end_time {
            self.end_time = end;
        }
        let measured = measure(self.start_time, self.end_time)?;

        match input.total_hours {
            Some(hours) => self.total_hours = checked_hours(hours)?,
            None if times_changed => self.total_hours = measured,
            None => {}
        }
        if let Some(billable) = input.billable {
            self.billable = billable;
        }
        if let Some(project) = input.project {
            self.project = project;
        }
        if let Some(client) = input.client {
            self.client = client;
        }
        if input.description.is_some() {
            self.description = optional_text(input.description);
        }
        self.updated_at = now;
        Ok(())
    }
}

fn measure(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Decimal, ValidationError> {
    hours_between(start, end)
        .ok_or_else(|| ValidationError("endTime must not be before startTime".to_string()))
}

fn checked_hours(hours: Decimal) -> Result<Decimal, ValidationError> {
    if hours < Decimal::ZERO {
        return Err(ValidationError("totalHours must not be negative".to_string()));
    }
    Ok(hours)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn input(extra: serde_json::Value) -> CreateBillableInput {
        let mut body = json!({
            "startTime": "2026-05-04T09:00:00Z",
            "endTime": "2026-05-04T10:30:00Z",
            "project": ProjectId::generate(),
            "client": ClientId::generate(),
        });
        if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            body.extend(extra.clone());
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_hours_derived_from_times() {
        let record = BillableHours::create(input(json!({})), Utc::now()).unwrap();
        assert_eq!(record.total_hours, Decimal::new(150, 2));
        assert!(record.billable);
    }

    #[test]
    fn test_explicit_hours_accepts_numbers_and_strings() {
        let record =
            BillableHours::create(input(json!({"totalHours": 1.25})), Utc::now()).unwrap();
        assert_eq!(record.total_hours, Decimal::new(125, 2));

        let record =
            BillableHours::create(input(json!({"totalHours": "2.5"})), Utc::now()).unwrap();
        assert_eq!(record.total_hours, Decimal::new(25, 1));
    }

    #[test]
    fn test_reversed_times_rejected() {
        let err = BillableHours::create(
            input(json!({"endTime": "2026-05-04T08:00:00Z"})),
            Utc::now(),
        )
        .unwrap_err();
        assert!(err.0.contains("endTime"));
    }

    #[test]
    fn test_negative_hours_rejected() {
        assert!(BillableHours::create(input(json!({"totalHours": "-1"})), Utc::now()).is_err());
    }

    #[test]
    fn test_apply_rederives_hours_when_times_change() {
        let mut record = BillableHours::create(input(json!({})), Utc::now()).unwrap();
        let update: UpdateBillableInput =
            serde_json::from_value(json!({"endTime": "2026-05-04T12:00:00Z"})).unwrap();
        record.apply(update, Utc::now()).unwrap();
        assert_eq!(record.total_hours, Decimal::new(300, 2));

        let update: UpdateBillableInput =
            serde_json::from_value(json!({"description": "review"})).unwrap();
        record.apply(update, Utc::now()).unwrap();
        assert_eq!(record.total_hours, Decimal::new(300, 2));
    }

    #[test]
    fn test_serializes_hours_as_string() {
        let record = BillableHours::create(input(json!({})), Utc::now()).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["totalHours"], "1.50");
    }
}
