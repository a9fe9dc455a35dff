#[cfg(test)]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::artifacts::models::{EpicWithUpload, StoryWithUpload, TestPlanWithUpload, Upload};
use crate::artifacts::{Database, EpicQueries, StoryQueries, TestPlanQueries, UploadQueries};

/// The record kinds the aggregator can search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Requirement,
    Epic,
    Story,
    TestPlan,
}

impl ArtifactKind {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Requirement => "requirement",
            ArtifactKind::Epic => "epic",
            ArtifactKind::Story => "story",
            ArtifactKind::TestPlan => "test_plan",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrows which records a query considers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    /// Only records belonging to this uploaded document.
    pub upload_id: Option<i64>,
    /// Only records whose upload belongs to this user.
    pub user_id: Option<i64>,
}

/// A source record reduced to its canonical searchable text, plus the
/// references needed to rebuild result metadata and group by upload.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub document_id: String,
    pub kind: ArtifactKind,
    pub text: String,
    pub upload_id: Option<i64>,
    pub upload_name: Option<String>,
    pub confluence_page_id: Option<String>,
    pub metadata: Map<String, Value>,
}

/// One heterogeneous record kind the aggregator pulls candidates from.
///
/// Each implementation owns the rule for turning its records into searchable
/// text, keeping the aggregator itself source-agnostic.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    fn kind(&self) -> ArtifactKind;

    /// Retrieve the source's current corpus, narrowed by `scope`.
    async fn fetch(&self, db: &Database, scope: &ScopeFilter) -> Result<Vec<SourceDocument>>;
}

/// The standard source set: uploads, epics, stories, and test plans.
#[inline]
pub fn default_sources() -> Vec<Box<dyn ArtifactSource>> {
    vec![
        Box::new(UploadSource),
        Box::new(EpicSource),
        Box::new(StorySource),
        Box::new(TestPlanSource),
    ]
}

pub struct UploadSource;

pub struct EpicSource;

pub struct StorySource;

pub struct TestPlanSource;

#[async_trait]
impl ArtifactSource for UploadSource {
    #[inline]
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Requirement
    }

    #[inline]
    async fn fetch(&self, db: &Database, scope: &ScopeFilter) -> Result<Vec<SourceDocument>> {
        let uploads =
            UploadQueries::list_scoped(db.pool(), scope.upload_id, scope.user_id).await?;
        Ok(uploads.iter().map(upload_document).collect())
    }
}

#[async_trait]
impl ArtifactSource for EpicSource {
    #[inline]
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Epic
    }

    #[inline]
    async fn fetch(&self, db: &Database, scope: &ScopeFilter) -> Result<Vec<SourceDocument>> {
        let epics = EpicQueries::list_scoped(db.pool(), scope.upload_id, scope.user_id).await?;
        Ok(epics.iter().map(epic_document).collect())
    }
}

#[async_trait]
impl ArtifactSource for StorySource {
    #[inline]
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Story
    }

    #[inline]
    async fn fetch(&self, db: &Database, scope: &ScopeFilter) -> Result<Vec<SourceDocument>> {
        let stories = StoryQueries::list_scoped(db.pool(), scope.upload_id, scope.user_id).await?;
        Ok(stories.iter().map(story_document).collect())
    }
}

#[async_trait]
impl ArtifactSource for TestPlanSource {
    #[inline]
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::TestPlan
    }

    #[inline]
    async fn fetch(&self, db: &Database, scope: &ScopeFilter) -> Result<Vec<SourceDocument>> {
        let plans =
            TestPlanQueries::list_scoped(db.pool(), scope.upload_id, scope.user_id).await?;
        Ok(plans.iter().map(test_plan_document).collect())
    }
}

fn upload_document(upload: &Upload) -> SourceDocument {
    let mut metadata = Map::new();
    metadata.insert("type".to_string(), json!("requirement"));
    metadata.insert("upload_id".to_string(), json!(upload.id));
    metadata.insert("filename".to_string(), json!(upload.filename));

    SourceDocument {
        document_id: format!("upload_{}", upload.id),
        kind: ArtifactKind::Requirement,
        text: upload_text(upload),
        upload_id: Some(upload.id),
        upload_name: Some(upload.filename.clone()),
        confluence_page_id: upload.confluence_page_id.clone(),
        metadata,
    }
}

fn epic_document(epic: &EpicWithUpload) -> SourceDocument {
    let mut metadata = Map::new();
    metadata.insert("type".to_string(), json!("epic"));
    metadata.insert("epic_id".to_string(), json!(epic.id));
    metadata.insert("epic_name".to_string(), json!(epic.name));
    metadata.insert("upload_id".to_string(), json!(epic.upload_id));

    SourceDocument {
        document_id: format!("epic_{}", epic.id),
        kind: ArtifactKind::Epic,
        text: epic_text(&epic.name, &epic.description),
        upload_id: Some(epic.upload_id),
        upload_name: Some(epic.upload_filename.clone()),
        confluence_page_id: epic.confluence_page_id.clone(),
        metadata,
    }
}

fn story_document(story: &StoryWithUpload) -> SourceDocument {
    let mut metadata = Map::new();
    metadata.insert("type".to_string(), json!("story"));
    metadata.insert("story_id".to_string(), json!(story.id));
    metadata.insert("story_name".to_string(), json!(story.name));
    metadata.insert("epic_id".to_string(), json!(story.epic_id));
    metadata.insert("epic_name".to_string(), json!(story.epic_name));
    metadata.insert("upload_id".to_string(), json!(story.upload_id));

    SourceDocument {
        document_id: format!("story_{}", story.id),
        kind: ArtifactKind::Story,
        text: story_text(&story.name, &story.description, &story.acceptance_criteria),
        upload_id: Some(story.upload_id),
        upload_name: Some(story.upload_filename.clone()),
        confluence_page_id: None,
        metadata,
    }
}

fn test_plan_document(plan: &TestPlanWithUpload) -> SourceDocument {
    let mut metadata = Map::new();
    metadata.insert("type".to_string(), json!("test_plan"));
    metadata.insert("test_plan_id".to_string(), json!(plan.id));
    metadata.insert("test_plan_title".to_string(), json!(plan.title));
    metadata.insert("epic_id".to_string(), json!(plan.epic_id));
    metadata.insert("epic_name".to_string(), json!(plan.epic_name));
    metadata.insert("upload_id".to_string(), json!(plan.upload_id));

    SourceDocument {
        document_id: format!("test_plan_{}", plan.id),
        kind: ArtifactKind::TestPlan,
        text: test_plan_text(&plan.title, &plan.objective),
        upload_id: Some(plan.upload_id),
        upload_name: Some(plan.upload_filename.clone()),
        confluence_page_id: plan.confluence_page_id.clone(),
        metadata,
    }
}

/// An upload is searched by its extracted requirement text.
pub(crate) fn upload_text(upload: &Upload) -> String {
    upload.requirement.trim().to_string()
}

/// An epic is searched by its name plus description.
pub(crate) fn epic_text(name: &str, description: &str) -> String {
    join_nonempty(&[name, description])
}

/// A story is searched by its name, description, and acceptance criteria.
pub(crate) fn story_text(name: &str, description: &str, acceptance_criteria: &str) -> String {
    join_nonempty(&[name, description, acceptance_criteria])
}

/// A test plan is searched by its title plus objective.
pub(crate) fn test_plan_text(title: &str, objective: &str) -> String {
    join_nonempty(&[title, objective])
}

fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
