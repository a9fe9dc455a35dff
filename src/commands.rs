use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::artifacts::{
    Database, EpicQueries, NewEpic, NewStory, NewTestPlan, NewUpload, StoryQueries,
    TestPlanQueries, UploadQueries,
};
use crate::config::{Config, get_config_dir};
use crate::embeddings::{EmbeddingCache, EmbeddingClient};
use crate::indexer::{Reindexer, collection_stats};
use crate::search::{ScopeFilter, SearchEngine, SearchHit, SearchParams};
use crate::store::{CollectionRegistry, VectorCollection};

fn load_config() -> Result<Config> {
    let config_dir = get_config_dir()?;
    Config::load(config_dir)
}

fn build_cache(config: &Config) -> Result<Arc<EmbeddingCache>> {
    let client =
        EmbeddingClient::new(&config.embedding).context("Failed to create embedding client")?;
    Ok(Arc::new(EmbeddingCache::new(
        Arc::new(client),
        Duration::from_secs(config.search.cache_ttl_secs),
    )))
}

async fn open_database(config: &Config) -> Result<Database> {
    Database::initialize_from_config_dir(config.get_base_dir())
        .await
        .context("Failed to initialize artifact database")
}

fn open_collection(config: &Config, scope: Option<&str>) -> Result<VectorCollection> {
    let registry = CollectionRegistry::new(config.storage_dir());
    let collection = match scope {
        Some(scope_id) => registry.open_scoped(scope_id)?,
        None => registry.open_default()?,
    };
    Ok(collection)
}

/// Show the active configuration
pub fn show_config() -> Result<()> {
    let config = load_config()?;

    println!("Configuration directory: {}", config.get_base_dir().display());
    println!();
    println!("Embedding server:");
    println!(
        "  Endpoint: {}://{}:{}",
        config.embedding.protocol, config.embedding.host, config.embedding.port
    );
    println!("  Model: {}", config.embedding.model);
    println!("  Dimension: {}", config.embedding.dimension);
    println!("  Timeout: {}s", config.embedding.timeout_secs);
    println!("  Retry attempts: {}", config.embedding.retry_attempts);
    println!();
    println!("Search:");
    println!(
        "  Similarity threshold: {}",
        config.search.similarity_threshold
    );
    println!("  Max top-k: {}", config.search.max_top_k);
    println!("  Snippet length: {}", config.search.snippet_length);
    println!("  Embedding cache TTL: {}s", config.search.cache_ttl_secs);

    Ok(())
}

/// Check connectivity to the embedding server and the artifact database
pub async fn show_status() -> Result<()> {
    let config = load_config()?;

    println!("Database:");
    match open_database(&config).await {
        Ok(database) => {
            let uploads = UploadQueries::list_all(database.pool()).await?;
            println!("  ✅ Connected ({})", config.database_path().display());
            println!("  Uploads: {}", uploads.len());
        }
        Err(e) => println!("  ❌ Failed to connect - {}", e),
    }

    println!("Embedding server:");
    match EmbeddingClient::new(&config.embedding) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                println!(
                    "  ✅ Connected ({}:{})",
                    config.embedding.host, config.embedding.port
                );
                println!("  Model: {}", config.embedding.model);
            }
            Err(e) => println!("  ⚠️  Reachable but unhealthy - {}", e),
        },
        Err(e) => println!("  ❌ Failed to connect - {}", e),
    }

    let registry = CollectionRegistry::new(config.storage_dir());
    let collections = registry.list_collections()?;
    println!("Collections: {}", collections.len());
    for name in collections {
        println!("  - {}", name);
    }

    Ok(())
}

/// Register an uploaded requirement document
pub async fn add_upload(
    filename: String,
    requirement: String,
    user_id: Option<i64>,
) -> Result<()> {
    let config = load_config()?;
    let database = open_database(&config).await?;

    let upload = UploadQueries::create(
        database.pool(),
        NewUpload {
            filename,
            requirement,
            confluence_page_id: None,
            user_id,
        },
    )
    .await?;

    println!("Created upload: {} (ID: {})", upload.filename, upload.id);
    Ok(())
}

/// Record a generated epic under an upload
pub async fn add_epic(
    upload_id: i64,
    name: String,
    description: String,
    acceptance_criteria: String,
) -> Result<()> {
    let config = load_config()?;
    let database = open_database(&config).await?;

    if UploadQueries::get_by_id(database.pool(), upload_id)
        .await?
        .is_none()
    {
        anyhow::bail!("Upload not found: {}", upload_id);
    }

    let epic = EpicQueries::create(
        database.pool(),
        NewEpic {
            upload_id,
            name,
            description,
            acceptance_criteria,
        },
    )
    .await?;

    println!("Created epic: {} (ID: {})", epic.name, epic.id);
    Ok(())
}

/// Record a generated story under an epic
pub async fn add_story(
    epic_id: i64,
    name: String,
    story_type: String,
    description: String,
    acceptance_criteria: String,
) -> Result<()> {
    let config = load_config()?;
    let database = open_database(&config).await?;

    if EpicQueries::get_by_id(database.pool(), epic_id)
        .await?
        .is_none()
    {
        anyhow::bail!("Epic not found: {}", epic_id);
    }

    let story = StoryQueries::create(
        database.pool(),
        NewStory {
            epic_id,
            name,
            story_type,
            description,
            acceptance_criteria,
        },
    )
    .await?;

    println!("Created story: {} (ID: {})", story.name, story.id);
    Ok(())
}

/// Record a generated test plan under an epic
pub async fn add_test_plan(epic_id: i64, title: String, objective: String) -> Result<()> {
    let config = load_config()?;
    let database = open_database(&config).await?;

    if EpicQueries::get_by_id(database.pool(), epic_id)
        .await?
        .is_none()
    {
        anyhow::bail!("Epic not found: {}", epic_id);
    }

    let plan = TestPlanQueries::create(
        database.pool(),
        NewTestPlan {
            epic_id,
            title,
            objective,
        },
    )
    .await?;

    println!("Created test plan: {} (ID: {})", plan.title, plan.id);
    Ok(())
}

/// Aggregated semantic search across uploads, epics, stories, and test plans
pub async fn search(
    query: String,
    top_k: usize,
    threshold: Option<f32>,
    upload_id: Option<i64>,
    user_id: Option<i64>,
    grouped: bool,
) -> Result<()> {
    let config = load_config()?;
    let database = open_database(&config).await?;
    let cache = build_cache(&config)?;
    let engine = SearchEngine::new(database, cache, config.search.clone());

    let params = SearchParams {
        query: query.clone(),
        top_k,
        threshold,
        scope: ScopeFilter { upload_id, user_id },
    };

    if grouped {
        let groups = engine.search_grouped(&params).await?;

        if groups.is_empty() {
            println!("No results found for '{}'", query);
            return Ok(());
        }

        println!("Uploads with matches ({} total):", groups.len());
        for group in &groups {
            println!();
            println!(
                "📄 {} (best match {:.2}%)",
                group.upload_name, group.best_percentage
            );
            if group.requirement_matches > 0 {
                println!("   Requirement matches: {}", group.requirement_matches);
            }
            print_group_section("Epics", &group.epics);
            print_group_section("Stories", &group.stories);
            print_group_section("Test plans", &group.test_plans);
        }
    } else {
        let hits = engine.search(&params).await?;

        if hits.is_empty() {
            println!("No results found for '{}'", query);
            return Ok(());
        }

        println!("Search results ({} matches):", hits.len());
        for (index, hit) in hits.iter().enumerate() {
            println!();
            println!(
                "{}. {} [{}] {:.2}% ({:.4})",
                index + 1,
                hit.document_id,
                hit.kind,
                hit.similarity_percentage,
                hit.similarity_score
            );
            if let Some(name) = &hit.upload_name {
                println!("   Upload: {}", name);
            }
            println!("   {}", preview(&hit.snippet));
        }
    }

    Ok(())
}

fn print_group_section(label: &str, hits: &[SearchHit]) {
    if hits.is_empty() {
        return;
    }
    println!("   {} ({}):", label, hits.len());
    for hit in hits {
        println!(
            "     - {} {:.2}% ({:.4})",
            hit.document_id, hit.similarity_percentage, hit.similarity_score
        );
    }
}

fn preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 120;
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

/// Search a persisted vector collection directly
pub fn search_store(
    query: String,
    top_k: usize,
    threshold: Option<f32>,
    scope: Option<String>,
) -> Result<()> {
    let config = load_config()?;
    let cache = build_cache(&config)?;
    let collection = open_collection(&config, scope.as_deref())?;

    let top_k = top_k.clamp(1, config.search.max_top_k);
    let results = collection.search(&cache, &query, top_k, threshold)?;

    if results.is_empty() {
        println!("No results found for '{}'", query);
        return Ok(());
    }

    println!(
        "Collection '{}' results ({} matches):",
        collection.name(),
        results.len()
    );
    for (index, result) in results.iter().enumerate() {
        println!();
        println!("{}. {} ({:.4})", index + 1, result.id, result.score);
        println!("   {}", preview(&result.text));
    }

    Ok(())
}

/// Store a document into a vector collection
pub fn store_document(
    id: String,
    text: String,
    kind: Option<String>,
    scope: Option<String>,
) -> Result<()> {
    let config = load_config()?;
    let cache = build_cache(&config)?;
    let mut collection = open_collection(&config, scope.as_deref())?;

    let mut metadata = serde_json::Map::new();
    if let Some(kind) = kind {
        metadata.insert("type".to_string(), serde_json::json!(kind));
    }

    collection.store_document(&cache, &text, &id, metadata)?;

    println!(
        "Stored document '{}' in collection '{}' ({} documents)",
        id,
        collection.name(),
        collection.len()
    );
    Ok(())
}

/// Delete a document from a vector collection
pub fn delete_document(id: String, scope: Option<String>) -> Result<()> {
    let config = load_config()?;
    let mut collection = open_collection(&config, scope.as_deref())?;

    if collection.delete_document(&id)? {
        println!("Deleted document '{}'", id);
    } else {
        println!("Document '{}' not found", id);
    }
    Ok(())
}

/// Delete every document whose metadata field matches
pub fn delete_by_metadata(key: String, value: String, scope: Option<String>) -> Result<()> {
    let config = load_config()?;
    let mut collection = open_collection(&config, scope.as_deref())?;

    let removed = collection.delete_by_metadata(&key, &serde_json::json!(value))?;
    println!("Deleted {} documents where {} = {}", removed, key, value);
    Ok(())
}

/// Clear a vector collection
pub fn clear_collection(scope: Option<String>) -> Result<()> {
    let config = load_config()?;
    let mut collection = open_collection(&config, scope.as_deref())?;

    collection.clear()?;
    println!("Cleared collection '{}'", collection.name());
    Ok(())
}

/// Rebuild the default collection from the artifact database
pub async fn reindex() -> Result<()> {
    let config = load_config()?;
    let database = open_database(&config).await?;
    let cache = build_cache(&config)?;
    let mut collection = open_collection(&config, None)?;

    info!("Starting full reindex");
    let reindexer = Reindexer::new(database, cache);
    let stats = reindexer.reindex_all(&mut collection).await?;

    println!("Reindexing complete");
    println!("  Documents indexed: {}", stats.documents_indexed);
    for (kind, count) in &stats.by_kind {
        println!("    {}: {}", kind, count);
    }
    if stats.errors_encountered > 0 {
        println!("  Errors: {}", stats.errors_encountered);
    }
    Ok(())
}

/// Show collection statistics
pub fn stats(scope: Option<String>) -> Result<()> {
    let config = load_config()?;
    let collection = open_collection(&config, scope.as_deref())?;

    let stats = collection_stats(&collection);
    println!("Collection '{}':", collection.name());
    println!("  Total documents: {}", stats.total_documents);
    for (kind, count) in &stats.documents_by_type {
        println!("    {}: {}", kind, count);
    }
    Ok(())
}

/// List persisted collections
pub fn list_collections() -> Result<()> {
    let config = load_config()?;
    let registry = CollectionRegistry::new(config.storage_dir());

    let names = registry.list_collections()?;
    if names.is_empty() {
        println!("No collections have been persisted yet.");
        return Ok(());
    }

    println!("Collections ({} total):", names.len());
    for name in names {
        println!("  - {}", name);
    }
    Ok(())
}
