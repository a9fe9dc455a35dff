use clap::{Parser, Subcommand};
use reqsearch::commands;

#[derive(Parser)]
#[command(name = "reqsearch")]
#[command(about = "Semantic search over requirement documents and generated delivery artifacts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active configuration
    Config,
    /// Check connectivity to the embedding server and artifact database
    Status,
    /// Register an uploaded requirement document
    AddUpload {
        /// Display name of the uploaded file
        filename: String,
        /// Extracted requirement text
        #[arg(long)]
        text: String,
        /// Owning user id
        #[arg(long)]
        user: Option<i64>,
    },
    /// Record a generated epic under an upload
    AddEpic {
        upload_id: i64,
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        criteria: String,
    },
    /// Record a generated story under an epic
    AddStory {
        epic_id: i64,
        name: String,
        #[arg(long, default_value = "feature")]
        story_type: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        criteria: String,
    },
    /// Record a generated test plan under an epic
    AddTestPlan {
        epic_id: i64,
        title: String,
        #[arg(long, default_value = "")]
        objective: String,
    },
    /// Semantic search across uploads, epics, stories, and test plans
    Search {
        query: String,
        /// Number of top results to return
        #[arg(long, default_value_t = 5)]
        top_k: usize,
        /// Override the configured similarity threshold
        #[arg(long)]
        threshold: Option<f32>,
        /// Only search records belonging to this upload
        #[arg(long)]
        upload: Option<i64>,
        /// Only search records belonging to this user's uploads
        #[arg(long)]
        user: Option<i64>,
        /// Group results by originating upload
        #[arg(long)]
        grouped: bool,
    },
    /// Search a persisted vector collection directly
    SearchStore {
        query: String,
        /// Number of top results to return
        #[arg(long, default_value_t = 5)]
        top_k: usize,
        /// Minimum similarity score for a result
        #[arg(long)]
        threshold: Option<f32>,
        /// Collection scope id; the default collection when omitted
        #[arg(long)]
        collection: Option<String>,
    },
    /// Store a document into a vector collection
    Store {
        /// Document id, unique within its collection
        id: String,
        /// The text to index
        text: String,
        /// Type tag recorded in the document's metadata
        #[arg(long)]
        kind: Option<String>,
        /// Collection scope id; the default collection when omitted
        #[arg(long)]
        collection: Option<String>,
    },
    /// Delete a document from a vector collection
    Delete {
        id: String,
        #[arg(long)]
        collection: Option<String>,
    },
    /// Delete every document whose metadata field matches
    DeleteBy {
        key: String,
        value: String,
        #[arg(long)]
        collection: Option<String>,
    },
    /// Clear a vector collection
    Clear {
        #[arg(long)]
        collection: Option<String>,
    },
    /// Rebuild the default collection from the artifact database
    Reindex,
    /// Show collection statistics
    Stats {
        #[arg(long)]
        collection: Option<String>,
    },
    /// List persisted collections
    Collections,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config => commands::show_config()?,
        Commands::Status => commands::show_status().await?,
        Commands::AddUpload {
            filename,
            text,
            user,
        } => commands::add_upload(filename, text, user).await?,
        Commands::AddEpic {
            upload_id,
            name,
            description,
            criteria,
        } => commands::add_epic(upload_id, name, description, criteria).await?,
        Commands::AddStory {
            epic_id,
            name,
            story_type,
            description,
            criteria,
        } => commands::add_story(epic_id, name, story_type, description, criteria).await?,
        Commands::AddTestPlan {
            epic_id,
            title,
            objective,
        } => commands::add_test_plan(epic_id, title, objective).await?,
        Commands::Search {
            query,
            top_k,
            threshold,
            upload,
            user,
            grouped,
        } => commands::search(query, top_k, threshold, upload, user, grouped).await?,
        Commands::SearchStore {
            query,
            top_k,
            threshold,
            collection,
        } => commands::search_store(query, top_k, threshold, collection)?,
        Commands::Store {
            id,
            text,
            kind,
            collection,
        } => commands::store_document(id, text, kind, collection)?,
        Commands::Delete { id, collection } => commands::delete_document(id, collection)?,
        Commands::DeleteBy {
            key,
            value,
            collection,
        } => commands::delete_by_metadata(key, value, collection)?,
        Commands::Clear { collection } => commands::clear_collection(collection)?,
        Commands::Reindex => commands::reindex().await?,
        Commands::Stats { collection } => commands::stats(collection)?,
        Commands::Collections => commands::list_collections()?,
    }

    Ok(())
}
