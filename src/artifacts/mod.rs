// Artifact database module
// Read/write access to the relational store that owns canonical records:
// uploaded requirement documents and the epics, stories, and test plans
// generated from them. The retrieval engine only reads; writes exist for the
// CLI and tests.


pub mod models;
pub mod queries;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::debug;

pub use models::{
    Epic, EpicWithUpload, NewEpic, NewStory, NewTestPlan, NewUpload, Story, StoryWithUpload,
    TestPlan, TestPlanWithUpload, Upload,
};
pub use queries::{EpicQueries, StoryQueries, TestPlanQueries, UploadQueries};

pub type DbPool = Pool<Sqlite>;

#[derive(Debug, Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")?;

        let database = Self { pool };
        database.init_schema().await?;

        Ok(database)
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub async fn initialize_from_config_dir(config_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        Self::new(config_dir.join("artifacts.db")).await
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS uploads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                requirement TEXT NOT NULL,
                confluence_page_id TEXT,
                user_id INTEGER,
                created_date TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create uploads table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS epics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                upload_id INTEGER NOT NULL REFERENCES uploads(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                acceptance_criteria TEXT NOT NULL DEFAULT '',
                confluence_page_id TEXT,
                created_date TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create epics table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS stories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                epic_id INTEGER NOT NULL REFERENCES epics(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                story_type TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                acceptance_criteria TEXT NOT NULL DEFAULT '',
                created_date TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create stories table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS test_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                epic_id INTEGER NOT NULL REFERENCES epics(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                objective TEXT NOT NULL DEFAULT '',
                confluence_page_id TEXT,
                created_date TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create test_plans table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_epics_upload ON epics(upload_id)")
            .execute(&self.pool)
            .await
            .context("Failed to create epics index")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_stories_epic ON stories(epic_id)")
            .execute(&self.pool)
            .await
            .context("Failed to create stories index")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_test_plans_epic ON test_plans(epic_id)")
            .execute(&self.pool)
            .await
            .context("Failed to create test_plans index")?;

        debug!("Artifact database schema initialized");
        Ok(())
    }
}
