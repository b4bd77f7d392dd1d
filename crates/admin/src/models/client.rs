//! Client domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerline_core::{ClientId, ClientStatus, Email};

use super::{ValidationError, optional_text, required_text};
use crate::db::{Collection, Document};

/// A customer the business bills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: Option<Email>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Client {
    const COLLECTION: Collection = Collection::Clients;
    type Id = ClientId;

    fn id(&self) -> ClientId {
        self.id
    }
}

/// Input for creating a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientInput {
    pub name: String,
    pub email: Option<Email>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<ClientStatus>,
}

/// Input for updating a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<ClientStatus>,
}

impl Client {
    /// Build a new client from validated input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is blank.
    pub fn create(input: CreateClientInput, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: ClientId::generate(),
            name: required_text("name", &input.name)?,
            email: input.email,
            company: optional_text(input.company),
            phone: optional_text(input.phone),
            address: optional_text(input.address),
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if a supplied name is blank.
    pub fn apply(
        &mut self,
        input: UpdateClientInput,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if let Some(name) = input.name {
            self.name = required_text("name", &name)?;
        }
        if input.email.is_some() {
            self.email = input.email;
        }
        if input.company.is_some() {
            self.company = optional_text(input.company);
        }
        if input.phone.is_some() {
            self.phone = optional_text(input.phone);
        }
        if input.address.is_some() {
            self.address = optional_text(input.address);
        }
        if let Some(status) = input.status {
            self.status = status;
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
    fn test_create_defaults_status_and_trims() {
        let input: CreateClientInput =
            serde_json::from_str(r#"{"name": " Acme ", "company": ""}"#).unwrap();
        let client = Client::create(input, Utc::now()).unwrap();

        assert_eq!(client.name, "Acme");
        assert_eq!(client.company, None);
        assert_eq!(client.status, ClientStatus::Active);
    }

    #[test]
    fn test_create_requires_name_field() {
        let missing: Result<CreateClientInput, _> = serde_json::from_str(r#"{"email": "a@b.c"}"#);
        assert!(missing.is_err());

        let blank: CreateClientInput = serde_json::from_str(r#"{"name": "  "}"#).unwrap();
        assert!(Client::create(blank, Utc::now()).is_err());
    }

    #[test]
    fn test_apply_keeps_absent_fields() {
        let input: CreateClientInput =
            serde_json::from_str(r#"{"name": "Acme", "phone": "555-0100"}"#).unwrap();
        let mut client = Client::create(input, Utc::now()).unwrap();

        let update: UpdateClientInput = serde_json::from_str(r#"{"status": "inactive"}"#).unwrap();
        client.apply(update, Utc::now()).unwrap();

        assert_eq!(client.name, "Acme");
        assert_eq!(client.phone.as_deref(), Some("555-0100"));
        assert_eq!(client.status, ClientStatus::Inactive);
    }

    #[test]
    fn test_serializes_camel_case() {
        let input: CreateClientInput = serde_json::from_str(r#"{"name": "Acme"}"#).unwrap();
        let json = serde_json::to_value(Client::create(input, Utc::now()).unwrap()).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["status"], "active");
    }
}
