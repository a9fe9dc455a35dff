use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An uploaded requirement document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Upload {
    pub id: i64,
    pub filename: String,
    /// Extracted requirement text; the searchable content of the upload.
    pub requirement: String,
    pub confluence_page_id: Option<String>,
    /// Owning user id when the upload is user-scoped.
    pub user_id: Option<i64>,
    pub created_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUpload {
    pub filename: String,
    pub requirement: String,
    pub confluence_page_id: Option<String>,
    pub user_id: Option<i64>,
}

/// A generated epic, owned by one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Epic {
    pub id: i64,
    pub upload_id: i64,
    pub name: String,
    pub description: String,
    pub acceptance_criteria: String,
    pub confluence_page_id: Option<String>,
    pub created_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEpic {
    pub upload_id: i64,
    pub name: String,
    pub description: String,
    pub acceptance_criteria: String,
}

/// A generated user story, owned by one epic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Story {
    pub id: i64,
    pub epic_id: i64,
    pub name: String,
    pub story_type: String,
    pub description: String,
    pub acceptance_criteria: String,
    pub created_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStory {
    pub epic_id: i64,
    pub name: String,
    pub story_type: String,
    pub description: String,
    pub acceptance_criteria: String,
}

/// A generated test plan, owned by one epic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TestPlan {
    pub id: i64,
    pub epic_id: i64,
    pub title: String,
    pub objective: String,
    pub confluence_page_id: Option<String>,
    pub created_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTestPlan {
    pub epic_id: i64,
    pub title: String,
    pub objective: String,
}

/// Epic row joined with its upload's display name, for result metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EpicWithUpload {
    pub id: i64,
    pub upload_id: i64,
    pub name: String,
    pub description: String,
    pub acceptance_criteria: String,
    pub confluence_page_id: Option<String>,
    pub upload_filename: String,
}

/// Story row joined up to its epic and upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StoryWithUpload {
    pub id: i64,
    pub epic_id: i64,
    pub upload_id: i64,
    pub epic_name: String,
    pub name: String,
    pub story_type: String,
    pub description: String,
    pub acceptance_criteria: String,
    pub upload_filename: String,
}

/// Test plan row joined up to its epic and upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TestPlanWithUpload {
    pub id: i64,
    pub epic_id: i64,
    pub upload_id: i64,
    pub epic_name: String,
    pub title: String,
    pub objective: String,
    pub confluence_page_id: Option<String>,
    pub upload_filename: String,
}
