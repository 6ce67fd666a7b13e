//! src/model/records.rs
//! ============================================================================
//! # Recruiting records shown in the data tables
//!
//! Status, role and kind values are closed enums checked by serde when a
//! workspace file is parsed; once loaded, nothing downstream re-validates.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs as TokioFs;
use tracing::{info, instrument};

use crate::{
    error::AppError,
    model::field::{FieldValue, Record},
};

/// Workspace bundled with the binary, used when no data file is configured.
pub const SAMPLE_WORKSPACE: &str = include_str!("../../data/sample_workspace.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Interview,
    Offered,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Reviewing,
        Self::Interview,
        Self::Offered,
        Self::Hired,
        Self::Rejected,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::Interview => "interview",
            Self::Offered => "offered",
            Self::Hired => "hired",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Open,
    Paused,
    Closed,
}

impl JobStatus {
    pub const ALL: [Self; 4] = [Self::Draft, Self::Open, Self::Paused, Self::Closed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Paused => "paused",
            Self::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl EmploymentType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullTime => "full_time",
            Self::PartTime => "part_time",
            Self::Contract => "contract",
            Self::Internship => "internship",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Recruiter,
    HiringManager,
    Interviewer,
    Candidate,
}

impl Role {
    pub const ALL: [Self; 5] = [
        Self::Admin,
        Self::Recruiter,
        Self::HiringManager,
        Self::Interviewer,
        Self::Candidate,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Recruiter => "recruiter",
            Self::HiringManager => "hiring_manager",
            Self::Interviewer => "interviewer",
            Self::Candidate => "candidate",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: u32,
    pub candidate_name: CompactString,
    pub email: CompactString,
    pub job_title: CompactString,
    pub department: CompactString,
    pub status: ApplicationStatus,
    /// Interview score from the scoring service, if already assessed
    #[serde(default)]
    pub score: Option<f64>,
    pub applied_at: DateTime<Utc>,
}

impl Record for Application {
    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => Some(self.id.into()),
            "candidate_name" => Some(self.candidate_name.clone().into()),
            "email" => Some(self.email.clone().into()),
            "job_title" => Some(self.job_title.clone().into()),
            "department" => Some(self.department.clone().into()),
            "status" => Some(self.status.as_str().into()),
            "score" => self.score.map(FieldValue::from),
            "applied_at" => Some(self.applied_at.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: u32,
    pub title: CompactString,
    pub department: CompactString,
    pub location: CompactString,
    pub employment_type: EmploymentType,
    pub status: JobStatus,
    pub openings: u32,
    pub posted_at: DateTime<Utc>,
}

impl Record for Job {
    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.clone().into()),
            "department" => Some(self.department.clone().into()),
            "location" => Some(self.location.clone().into()),
            "employment_type" => Some(self.employment_type.as_str().into()),
            "status" => Some(self.status.as_str().into()),
            "openings" => Some(self.openings.into()),
            "posted_at" => Some(self.posted_at.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: CompactString,
    pub email: CompactString,
    pub role: Role,
    #[serde(default)]
    pub department: Option<CompactString>,
    pub active: bool,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl Record for User {
    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "email" => Some(self.email.clone().into()),
            "role" => Some(self.role.as_str().into()),
            "department" => self.department.clone().map(FieldValue::from),
            "active" => Some(self.active.into()),
            "last_login" => self.last_login.map(FieldValue::from),
            _ => None,
        }
    }
}

/// One line of the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: u32,
    pub actor: CompactString,
    pub action: CompactString,
    pub target: CompactString,
    pub at: DateTime<Utc>,
}

impl Record for ActivityEntry {
    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => Some(self.id.into()),
            "actor" => Some(self.actor.clone().into()),
            "action" => Some(self.action.clone().into()),
            "target" => Some(self.target.clone().into()),
            "at" => Some(self.at.into()),
            _ => None,
        }
    }
}

/// Everything the console shows, as returned by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Workspace {
    pub applications: Vec<Application>,
    pub jobs: Vec<Job>,
    pub users: Vec<User>,
    pub activity: Vec<ActivityEntry>,
}

impl Workspace {
    pub fn from_json(text: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(text)?)
    }

    #[must_use = "the bundled sample is only useful if shown"]
    pub fn sample() -> Self {
        // The bundled file is covered by `test_sample_workspace_parses`.
        serde_json::from_str(SAMPLE_WORKSPACE).unwrap_or_default()
    }

    #[instrument(level = "info", fields(marker = "WORKSPACE_LOAD"))]
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let text = TokioFs::read_to_string(path)
            .await
            .map_err(|e| AppError::dataset(path, e.to_string()))?;

        let workspace: Self =
            serde_json::from_str(&text).map_err(|e| AppError::dataset(path, e.to_string()))?;

        info!(
            applications = workspace.applications.len(),
            jobs = workspace.jobs.len(),
            users = workspace.users.len(),
            activity = workspace.activity.len(),
            "Workspace loaded"
        );

        Ok(workspace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sample_workspace_parses() {
        let ws = Workspace::from_json(SAMPLE_WORKSPACE).unwrap();
        assert!(ws.applications.len() > 20);
        assert!(!ws.jobs.is_empty());
        assert!(!ws.users.is_empty());
        assert!(!ws.activity.is_empty());
    }

    #[test]
    fn test_unknown_status_rejected_at_boundary() {
        let text = r#"{"applications":[{"id":1,"candidate_name":"A","email":"a@x.io",
            "job_title":"SRE","department":"Engineering","status":"ghosted",
            "applied_at":"2024-05-01T09:00:00Z"}]}"#;
        assert!(matches!(Workspace::from_json(text), Err(AppError::Serde(_))));
    }

    #[test]
    fn test_optional_fields_map_to_missing() {
        let text = r#"{"users":[{"id":7,"name":"Kim","email":"kim@x.io","role":"hiring_manager","active":true}]}"#;
        let ws = Workspace::from_json(text).unwrap();
        let user = &ws.users[0];

        assert_eq!(user.field("role"), Some(FieldValue::from("hiring_manager")));
        assert_eq!(user.field("department"), None);
        assert_eq!(user.field("last_login"), None);
        assert_eq!(user.field("no_such_field"), None);
        assert!(ws.jobs.is_empty());
    }

    #[tokio::test]
    async fn test_load_reports_path_on_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = Workspace::load(file.path()).await.unwrap_err();
        assert!(matches!(err, AppError::Dataset { ref path, .. } if path == file.path()));
    }

    #[tokio::test]
    async fn test_load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_WORKSPACE.as_bytes()).unwrap();

        let ws = Workspace::load(file.path()).await.unwrap();
        assert_eq!(ws.applications.len(), Workspace::sample().applications.len());
    }
}
