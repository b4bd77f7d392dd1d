//! Announcement domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerline_core::{AnnouncementId, AnnouncementStatus};

use super::{ValidationError, required_text};
use crate::db::{Collection, Document};

/// An internal notice shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub body: String,
    pub status: AnnouncementStatus,
    /// Set the first time the status becomes `published`; never cleared.
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Announcement {
    const COLLECTION: Collection = Collection::Announcements;
    type Id = AnnouncementId;

    fn id(&self) -> AnnouncementId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementInput {
    pub title: String,
    pub body: String,
    pub status: Option<AnnouncementStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnnouncementInput {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<AnnouncementStatus>,
}

impl Announcement {
    /// # Errors
    ///
    /// Returns `ValidationError` if the title or body is blank.
    pub fn create(
        input: CreateAnnouncementInput,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let mut announcement = Self {
            id: AnnouncementId::generate(),
            title: required_text("title", &input.title)?,
            body: required_text("body", &input.body)?,
            status: input.status.unwrap_or_default(),
            published_at: None,
            created_at: now,
            updated_at: now,
        };
        announcement.stamp_published(now);
        Ok(announcement)
    }

    /// # Errors
    ///
    /// Returns `ValidationError` if a supplied title or body is blank.
    pub fn apply(
        &mut self,
        input: UpdateAnnouncementInput,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if let Some(title) = input.title {
            self.title = required_text("title", &title)?;
        }
        if let Some(body) = input.body {
            self.body = required_text("body", &body)?;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        self.stamp_published(now);
        self.updated_at = now;
        Ok(())
    }

    fn stamp_published(&mut self, now: DateTime<Utc>) {
        if self.status == AnnouncementStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn draft() -> Announcement {
        let input: CreateAnnouncementInput =
            serde_json::from_str(r#"{"title": "Holiday", "body": "Office closed"}"#).unwrap();
        Announcement::create(input, Utc::now()).unwrap()
    }

    #[test]
    fn test_draft_has_no_published_at() {
        let announcement = draft();
        assert_eq!(announcement.status, AnnouncementStatus::Draft);
        assert!(announcement.published_at.is_none());
    }

    #[test]
    fn test_published_at_set_once() {
        let mut announcement = draft();
        let first = Utc::now();
        announcement
            .apply(
                UpdateAnnouncementInput {
                    status: Some(AnnouncementStatus::Published),
                    ..Default::default()
                },
                first,
            )
            .unwrap();
        assert_eq!(announcement.published_at, Some(first));

        announcement
            .apply(
                UpdateAnnouncementInput {
                    status: Some(AnnouncementStatus::Archived),
                    ..Default::default()
                },
                first + Duration::hours(1),
            )
            .unwrap();
        announcement
            .apply(
                UpdateAnnouncementInput {
                    status: Some(AnnouncementStatus::Published),
                    ..Default::default()
                },
                first + Duration::hours(2),
            )
            .unwrap();
        assert_eq!(announcement.published_at, Some(first));
    }

    #[test]
    fn test_create_published_stamps_immediately() {
        let input: CreateAnnouncementInput = serde_json::from_str(
            r#"{"title": "Launch", "body": "We shipped", "status": "published"}"#,
        )
        .unwrap();
        let now = Utc::now();
        let announcement = Announcement::create(input, now).unwrap();
        assert_eq!(announcement.published_at, Some(now));
    }
}
