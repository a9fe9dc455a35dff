use super::*;
use crate::artifacts::models::{NewEpic, NewStory, NewTestPlan, NewUpload};
use anyhow::Result;
use tempfile::TempDir;

#[test]
fn kind_labels() {
    assert_eq!(ArtifactKind::Requirement.to_string(), "requirement");
    assert_eq!(ArtifactKind::Epic.to_string(), "epic");
    assert_eq!(ArtifactKind::Story.to_string(), "story");
    assert_eq!(ArtifactKind::TestPlan.to_string(), "test_plan");
}

#[test]
fn epic_text_joins_name_and_description() {
    assert_eq!(epic_text("Login", "Session handling"), "Login Session handling");
    assert_eq!(epic_text("Login", ""), "Login");
    assert_eq!(epic_text("  Login  ", "   "), "Login");
}

#[test]
fn story_text_includes_acceptance_criteria() {
    assert_eq!(
        story_text("Reset password", "Email a reset link", "Link expires after one hour"),
        "Reset password Email a reset link Link expires after one hour"
    );
    assert_eq!(story_text("Reset password", "", ""), "Reset password");
}

#[test]
fn test_plan_text_joins_title_and_objective() {
    assert_eq!(
        test_plan_text("Checkout plan", "Cover card declines"),
        "Checkout plan Cover card declines"
    );
    assert_eq!(test_plan_text("", ""), "");
}

async fn seeded_database() -> Result<(TempDir, Database)> {
    let temp_dir = TempDir::new()?;
    let database = Database::initialize_from_config_dir(temp_dir.path()).await?;
    let pool = database.pool();

    let upload = UploadQueries::create(
        pool,
        NewUpload {
            filename: "billing.pdf".to_string(),
            requirement: "Invoices are emailed monthly.".to_string(),
            confluence_page_id: Some("555".to_string()),
            user_id: Some(9),
        },
    )
    .await?;

    let epic = EpicQueries::create(
        pool,
        NewEpic {
            upload_id: upload.id,
            name: "Invoicing".to_string(),
            description: "Monthly invoice generation".to_string(),
            acceptance_criteria: "Invoices render correctly".to_string(),
        },
    )
    .await?;

    StoryQueries::create(
        pool,
        NewStory {
            epic_id: epic.id,
            name: "Email invoice".to_string(),
            story_type: "feature".to_string(),
            description: "Send the invoice PDF".to_string(),
            acceptance_criteria: "Email contains attachment".to_string(),
        },
    )
    .await?;

    TestPlanQueries::create(
        pool,
        NewTestPlan {
            epic_id: epic.id,
            title: "Invoicing plan".to_string(),
            objective: "Verify invoice delivery".to_string(),
        },
    )
    .await?;

    Ok((temp_dir, database))
}

#[tokio::test]
async fn upload_source_builds_documents() -> Result<()> {
    let (_temp_dir, database) = seeded_database().await?;

    let documents = UploadSource
        .fetch(&database, &ScopeFilter::default())
        .await?;

    assert_eq!(documents.len(), 1);
    let document = &documents[0];
    assert!(document.document_id.starts_with("upload_"));
    assert_eq!(document.kind, ArtifactKind::Requirement);
    assert_eq!(document.text, "Invoices are emailed monthly.");
    assert_eq!(document.upload_name.as_deref(), Some("billing.pdf"));
    assert_eq!(document.confluence_page_id.as_deref(), Some("555"));
    assert_eq!(document.metadata.get("type"), Some(&json!("requirement")));

    Ok(())
}

#[tokio::test]
async fn epic_source_builds_documents() -> Result<()> {
    let (_temp_dir, database) = seeded_database().await?;

    let documents = EpicSource.fetch(&database, &ScopeFilter::default()).await?;

    assert_eq!(documents.len(), 1);
    let document = &documents[0];
    assert!(document.document_id.starts_with("epic_"));
    assert_eq!(document.text, "Invoicing Monthly invoice generation");
    assert_eq!(document.upload_name.as_deref(), Some("billing.pdf"));
    assert_eq!(document.metadata.get("epic_name"), Some(&json!("Invoicing")));

    Ok(())
}

#[tokio::test]
async fn story_and_test_plan_sources_build_documents() -> Result<()> {
    let (_temp_dir, database) = seeded_database().await?;

    let stories = StorySource.fetch(&database, &ScopeFilter::default()).await?;
    assert_eq!(stories.len(), 1);
    assert_eq!(
        stories[0].text,
        "Email invoice Send the invoice PDF Email contains attachment"
    );
    assert_eq!(stories[0].metadata.get("epic_name"), Some(&json!("Invoicing")));

    let plans = TestPlanSource
        .fetch(&database, &ScopeFilter::default())
        .await?;
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].text, "Invoicing plan Verify invoice delivery");
    assert_eq!(
        plans[0].metadata.get("test_plan_title"),
        Some(&json!("Invoicing plan"))
    );

    Ok(())
}

#[tokio::test]
async fn scope_filters_limit_sources() -> Result<()> {
    let (_temp_dir, database) = seeded_database().await?;

    let other_user = ScopeFilter {
        upload_id: None,
        user_id: Some(12345),
    };
    assert!(UploadSource.fetch(&database, &other_user).await?.is_empty());
    assert!(EpicSource.fetch(&database, &other_user).await?.is_empty());
    assert!(StorySource.fetch(&database, &other_user).await?.is_empty());
    assert!(TestPlanSource.fetch(&database, &other_user).await?.is_empty());

    let missing_upload = ScopeFilter {
        upload_id: Some(999),
        user_id: None,
    };
    assert!(UploadSource.fetch(&database, &missing_upload).await?.is_empty());

    Ok(())
}

#[test]
fn default_sources_cover_every_kind() {
    let kinds: Vec<ArtifactKind> = default_sources().iter().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ArtifactKind::Requirement,
            ArtifactKind::Epic,
            ArtifactKind::Story,
            ArtifactKind::TestPlan,
        ]
    );
}
