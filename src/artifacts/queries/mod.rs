
use super::models::*;
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

pub struct UploadQueries;

impl UploadQueries {
    #[inline]
    pub async fn create(pool: &SqlitePool, new_upload: NewUpload) -> Result<Upload> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            "INSERT INTO uploads (filename, requirement, confluence_page_id, user_id, created_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&new_upload.filename)
        .bind(&new_upload.requirement)
        .bind(&new_upload.confluence_page_id)
        .bind(new_upload.user_id)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create upload")?
        .last_insert_rowid();

        Self::get_by_id(pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created upload"))
    }

    #[inline]
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Upload>> {
        sqlx::query_as::<_, Upload>(
            "SELECT id, filename, requirement, confluence_page_id, user_id, created_date
             FROM uploads WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get upload by id")
    }

    #[inline]
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Upload>> {
        sqlx::query_as::<_, Upload>(
            "SELECT id, filename, requirement, confluence_page_id, user_id, created_date
             FROM uploads ORDER BY id",
        )
        .fetch_all(pool)
        .await
        .context("Failed to list uploads")
    }

    /// List uploads narrowed to one upload and/or one owning user; a `None`
    /// filter matches everything.
    #[inline]
    pub async fn list_scoped(
        pool: &SqlitePool,
        upload_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<Vec<Upload>> {
        sqlx::query_as::<_, Upload>(
            "SELECT id, filename, requirement, confluence_page_id, user_id, created_date
             FROM uploads
             WHERE (?1 IS NULL OR id = ?1) AND (?2 IS NULL OR user_id = ?2)
             ORDER BY id",
        )
        .bind(upload_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to list scoped uploads")
    }

    #[inline]
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM uploads WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await
            .context("Failed to delete upload")?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct EpicQueries;

impl EpicQueries {
    #[inline]
    pub async fn create(pool: &SqlitePool, new_epic: NewEpic) -> Result<Epic> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            "INSERT INTO epics (upload_id, name, description, acceptance_criteria, created_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(new_epic.upload_id)
        .bind(&new_epic.name)
        .bind(&new_epic.description)
        .bind(&new_epic.acceptance_criteria)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create epic")?
        .last_insert_rowid();

        Self::get_by_id(pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created epic"))
    }

    #[inline]
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Epic>> {
        sqlx::query_as::<_, Epic>(
            "SELECT id, upload_id, name, description, acceptance_criteria, confluence_page_id, created_date
             FROM epics WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get epic by id")
    }

    #[inline]
    pub async fn list_for_upload(pool: &SqlitePool, upload_id: i64) -> Result<Vec<Epic>> {
        sqlx::query_as::<_, Epic>(
            "SELECT id, upload_id, name, description, acceptance_criteria, confluence_page_id, created_date
             FROM epics WHERE upload_id = ?1 ORDER BY id",
        )
        .bind(upload_id)
        .fetch_all(pool)
        .await
        .context("Failed to list epics for upload")
    }

    /// List epics joined with their upload's display name, optionally
    /// narrowed to one upload and/or one owning user.
    #[inline]
    pub async fn list_scoped(
        pool: &SqlitePool,
        upload_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<Vec<EpicWithUpload>> {
        sqlx::query_as::<_, EpicWithUpload>(
            "SELECT e.id, e.upload_id, e.name, e.description, e.acceptance_criteria,
                    e.confluence_page_id, u.filename AS upload_filename
             FROM epics e
             JOIN uploads u ON u.id = e.upload_id
             WHERE (?1 IS NULL OR e.upload_id = ?1) AND (?2 IS NULL OR u.user_id = ?2)
             ORDER BY e.id",
        )
        .bind(upload_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to list scoped epics")
    }
}

pub struct StoryQueries;

impl StoryQueries {
    #[inline]
    pub async fn create(pool: &SqlitePool, new_story: NewStory) -> Result<Story> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            "INSERT INTO stories (epic_id, name, story_type, description, acceptance_criteria, created_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(new_story.epic_id)
        .bind(&new_story.name)
        .bind(&new_story.story_type)
        .bind(&new_story.description)
        .bind(&new_story.acceptance_criteria)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create story")?
        .last_insert_rowid();

        Self::get_by_id(pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created story"))
    }

    #[inline]
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Story>> {
        sqlx::query_as::<_, Story>(
            "SELECT id, epic_id, name, story_type, description, acceptance_criteria, created_date
             FROM stories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get story by id")
    }

    /// List stories joined up to their epic and upload, optionally narrowed
    /// to one upload and/or one owning user.
    #[inline]
    pub async fn list_scoped(
        pool: &SqlitePool,
        upload_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<Vec<StoryWithUpload>> {
        sqlx::query_as::<_, StoryWithUpload>(
            "SELECT s.id, s.epic_id, e.upload_id, e.name AS epic_name, s.name, s.story_type,
                    s.description, s.acceptance_criteria, u.filename AS upload_filename
             FROM stories s
             JOIN epics e ON e.id = s.epic_id
             JOIN uploads u ON u.id = e.upload_id
             WHERE (?1 IS NULL OR e.upload_id = ?1) AND (?2 IS NULL OR u.user_id = ?2)
             ORDER BY s.id",
        )
        .bind(upload_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to list scoped stories")
    }
}

pub struct TestPlanQueries;

impl TestPlanQueries {
    #[inline]
    pub async fn create(pool: &SqlitePool, new_plan: NewTestPlan) -> Result<TestPlan> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            "INSERT INTO test_plans (epic_id, title, objective, created_date)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(new_plan.epic_id)
        .bind(&new_plan.title)
        .bind(&new_plan.objective)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create test plan")?
        .last_insert_rowid();

        Self::get_by_id(pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created test plan"))
    }

    #[inline]
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<TestPlan>> {
        sqlx::query_as::<_, TestPlan>(
            "SELECT id, epic_id, title, objective, confluence_page_id, created_date
             FROM test_plans WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get test plan by id")
    }

    /// List test plans joined up to their epic and upload, optionally
    /// narrowed to one upload and/or one owning user.
    #[inline]
    pub async fn list_scoped(
        pool: &SqlitePool,
        upload_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<Vec<TestPlanWithUpload>> {
        sqlx::query_as::<_, TestPlanWithUpload>(
            "SELECT t.id, t.epic_id, e.upload_id, e.name AS epic_name, t.title, t.objective,
                    t.confluence_page_id, u.filename AS upload_filename
             FROM test_plans t
             JOIN epics e ON e.id = t.epic_id
             JOIN uploads u ON u.id = e.upload_id
             WHERE (?1 IS NULL OR e.upload_id = ?1) AND (?2 IS NULL OR u.user_id = ?2)
             ORDER BY t.id",
        )
        .bind(upload_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to list scoped test plans")
    }
}
