use std::env;

/// Database locations and the algorithmic [`index_core::Config`], loaded
/// from the environment (mirrors the teacher's `get_config()` in
/// `backend/src/main.rs`).
pub struct Config {
    /// SQLite URL for the raw per-source record databases.
    pub sources_database_url: String,
    /// SQLite URL for the unified index this binary writes.
    pub index_database_url: String,
    pub core: index_core::Config,
}

pub fn get_config() -> Config {
    Config {
        sources_database_url: env::var("SOURCES_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://sources.db".to_string()),
        index_database_url: env::var("INDEX_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://index.db".to_string()),
        core: index_core::Config::default(),
    }
}
