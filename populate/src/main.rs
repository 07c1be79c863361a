mod assembler;
mod config;
mod db;
mod error;
mod hash_store;
mod hashing;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "populate", about = "Builds the perceptual-hash store and the unified catalog index.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode thumbnails and (re)populate the perceptual-hash store.
    BuildHashes,
    /// Cluster, canonicalise and rebuild the unified index from scratch.
    BuildIndex,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::get_config();

    match cli.command {
        Command::BuildHashes => {
            let sources = db::SourceDatabase::connect(&cfg.sources_database_url).await?;
            let store = hash_store::SqlitePerceptualHashStore::connect(&cfg.index_database_url).await?;
            hashing::build_hashes(&sources, &store).await?;
            tracing::info!("perceptual-hash store rebuilt");
        }
        Command::BuildIndex => {
            let sources = db::SourceDatabase::connect(&cfg.sources_database_url).await?;
            let hash_store = hash_store::SqlitePerceptualHashStore::connect(&cfg.index_database_url).await?;
            let hashes = hash_store.load_all().await?;
            let index_pool = sqlx::SqlitePool::connect(&cfg.index_database_url).await?;
            assembler::rebuild_index(&sources, &hashes, &cfg.core, &index_pool).await?;
            tracing::info!("index rebuilt");
        }
    }

    Ok(())
}
