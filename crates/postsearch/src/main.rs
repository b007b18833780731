mod load;

use anyhow::Result;
use clap::{Parser, Subcommand};
use postsearch_common::{logger, AppConfig};
use postsearch_search::SearchEngine;
use postsearch_store::RedisPostStore;
use std::path::PathBuf;

/// Load .env from the current directory or the nearest parent that has one
fn load_dotenv() {
    let Ok(mut dir) = std::env::current_dir() else {
        return;
    };

    loop {
        let env_path = dir.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
            return;
        }
        if !dir.pop() {
            return;
        }
    }
}

#[derive(Parser)]
#[command(name = "postsearch")]
#[command(about = "Semantic post search - query-time retrieval service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single search and print the result as JSON
    Query {
        /// Search text
        text: String,

        /// Number of neighbors (defaults to NUM_NEIGHBORS)
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Import posts from a JSON Lines file into the metadata store
    Load {
        /// File with one {"id", "title", "body", "tags"} object per line
        #[arg(long)]
        input: PathBuf,

        /// Posts written per pipeline
        #[arg(long, default_value = "500")]
        batch_size: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv();

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            // CLI arguments win over the environment
            if let Some(host) = &host {
                std::env::set_var("SERVER_HOST", host);
            }
            if let Some(port) = port {
                std::env::set_var("SERVER_PORT", port.to_string());
            }

            let config = AppConfig::from_env()?;
            config.validate()?;
            logger::setup_logging(&config.log_dir, &config.log_level)?;

            tracing::info!("Post search starting...");
            tracing::info!("  Bind: {}", config.server_bind_address());
            tracing::info!("  Model endpoint: {}", config.model_endpoint_resource);
            tracing::info!("  Index endpoint: {}", config.index_endpoint_resource);
            tracing::info!("  Deployed index: {}", config.deployed_index_id);
            tracing::info!("  Metadata store: {}", config.redis_url());

            postsearch_server::start_server(config).await?;
        }
        Commands::Query { text, k } => {
            let config = AppConfig::from_env()?;
            config.validate()?;
            logger::setup_console_logging(&config.log_level)?;

            let engine = SearchEngine::connect(&config).await?;
            let result = engine.search(&text, k.unwrap_or(config.num_neighbors)).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Load { input, batch_size } => {
            let config = AppConfig::from_env()?;
            logger::setup_console_logging(&config.log_level)?;

            let store = RedisPostStore::connect(&config.redis_url()).await?;
            let summary = load::load_posts(&store, &input, batch_size).await?;
            println!("Loaded {} posts in {} batches", summary.posts, summary.batches);
        }
    }

    Ok(())
}
