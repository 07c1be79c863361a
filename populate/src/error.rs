//! The populate binary's typed error boundary (§7.1): every fallible
//! module below returns this, with `anyhow::Context` reserved for
//! `main.rs` alone.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PopulateError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, PopulateError>;
