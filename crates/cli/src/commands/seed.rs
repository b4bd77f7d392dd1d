//! Seed the document store with clients, projects and team members.
//!
//! The YAML file looks like:
//!
//! ```yaml
//! clients:
//!   - name: Acme Corp
//!     email: billing@acme.test
//!     projects:
//!       - name: Website
//!         status: active
//!         startDate: 2026-01-05
//! team:
//!   - name: Dana
//!     email: dana@ledgerline.dev
//!     role: Developer
//! ```
//!
//! Clients whose name already exists and team members whose email already
//! exists are skipped, so the same file can be applied repeatedly.

use std::collections::HashSet;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use ledgerline_admin::db::{Repository, RepositoryError, Store};
use ledgerline_admin::models::{
    Client, CreateClientInput, CreateProjectInput, CreateTeamMemberInput, Project, TeamMember,
    ValidationError,
};
use ledgerline_core::ProjectStatus;

/// Top-level layout of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub clients: Vec<SeedClient>,
    pub team: Vec<CreateTeamMemberInput>,
}

#[derive(Debug, Deserialize)]
pub struct SeedClient {
    #[serde(flatten)]
    pub client: CreateClientInput,
    #[serde(default)]
    pub projects: Vec<SeedProject>,
}

/// A project nested under its client; the client id is filled in on insert.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProject {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Counts of what a seed run inserted and skipped.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub clients: usize,
    pub projects: usize,
    pub team: usize,
    pub skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] super::ConnectError),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Read a YAML seed file and load it into the admin database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a record fails
/// validation, or the database is unreachable.
pub async fn from_file(file_path: &str) -> Result<SeedSummary, SeedError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading seed data from file");

    let content = tokio::fs::read_to_string(path).await?;
    let file: SeedFile = serde_yaml::from_str(&content)?;

    let store = Store::postgres(super::connect().await?);
    let summary = apply(&store, file).await?;

    info!("Seeding complete!");
    info!("  Clients inserted: {}", summary.clients);
    info!("  Projects inserted: {}", summary.projects);
    info!("  Team members inserted: {}", summary.team);
    info!("  Skipped (already exist): {}", summary.skipped);
    Ok(summary)
}

/// Insert everything in `file` that is not already present.
///
/// # Errors
///
/// Returns an error if a record fails validation or the store fails.
pub async fn apply(store: &Store, file: SeedFile) -> Result<SeedSummary, SeedError> {
    let clients = Repository::<Client>::new(store);
    let projects = Repository::<Project>::new(store);
    let team = Repository::<TeamMember>::new(store);
    let now = Utc::now();
    let mut summary = SeedSummary::default();

    let mut client_names: HashSet<String> = clients
        .list()
        .await?
        .into_iter()
        .map(|c| c.name.to_lowercase())
        .collect();

    for seed in file.clients {
        let client = Client::create(seed.client, now)?;
        if !client_names.insert(client.name.to_lowercase()) {
            info!(name = %client.name, "Client exists, skipping");
            summary.skipped += 1;
            continue;
        }
        clients.insert(&client).await?;
        summary.clients += 1;

        for project in seed.projects {
            let project = Project::create(
                CreateProjectInput {
                    name: project.name,
                    description: project.description,
                    client: client.id,
                    status: project.status,
                    start_date: project.start_date,
                    end_date: project.end_date,
                },
                now,
            )?;
            projects.insert(&project).await?;
            summary.projects += 1;
        }
    }

    let mut emails: HashSet<String> = team
        .list()
        .await?
        .into_iter()
        .map(|m| m.email.to_string())
        .collect();

    for input in file.team {
        let member = TeamMember::create(input, now)?;
        if !emails.insert(member.email.to_string()) {
            info!(email = %member.email, "Team member exists, skipping");
            summary.skipped += 1;
            continue;
        }
        team.insert(&member).await?;
        summary.team += 1;
    }

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SEED: &str = r"
clients:
  - name: Acme Corp
    email: billing@acme.test
    projects:
      - name: Website
        status: active
        startDate: 2026-01-05
      - name: Mobile app
  - name: Globex
team:
  - name: Dana
    email: dana@ledgerline.dev
    role: Developer
";

    #[test]
    fn test_parse_seed_file() {
        let file: SeedFile = serde_yaml::from_str(SEED).unwrap();
        assert_eq!(file.clients.len(), 2);
        assert_eq!(file.clients[0].client.name, "Acme Corp");
        assert_eq!(file.clients[0].projects.len(), 2);
        assert!(file.clients[1].projects.is_empty());
        assert_eq!(file.team.len(), 1);
    }

    #[tokio::test]
    async fn test_apply_is_repeatable() {
        let store = Store::memory();

        let first = apply(&store, serde_yaml::from_str(SEED).unwrap())
            .await
            .unwrap();
        assert_eq!(
            first,
            SeedSummary {
                clients: 2,
                projects: 2,
                team: 1,
                skipped: 0,
            }
        );

        let second = apply(&store, serde_yaml::from_str(SEED).unwrap())
            .await
            .unwrap();
        assert_eq!(second.clients, 0);
        assert_eq!(second.projects, 0);
        assert_eq!(second.skipped, 3);

        let projects = Repository::<Project>::new(&store).list().await.unwrap();
        let acme = Repository::<Client>::new(&store)
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == "Acme Corp")
            .unwrap();
        assert!(projects.iter().all(|p| p.client == acme.id));
    }
}
