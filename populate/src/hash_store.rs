//! The perceptual-hash store's persistent half: a `(id TEXT PRIMARY KEY,
//! h8s TEXT)` table where `h8s` is a space-separated, lower-hex, match-
//! priority-ordered list of 64-bit hashes (§6).

use crate::error::Result;
use index_core::hash::PHash;
use sqlx::{FromRow, SqlitePool};

pub struct SqlitePerceptualHashStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct Row {
    id: String,
    h8s: String,
}

impl SqlitePerceptualHashStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url).await?;
        sqlx::query("CREATE TABLE IF NOT EXISTS perceptual_hashes (id TEXT PRIMARY KEY, h8s TEXT NOT NULL)")
            .execute(&pool)
            .await?;
        Ok(SqlitePerceptualHashStore { pool })
    }

    pub async fn set(&self, entry_key: &str, hashes: &[PHash]) -> Result<()> {
        let encoded = encode(hashes);
        sqlx::query("INSERT INTO perceptual_hashes (id, h8s) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET h8s = excluded.h8s")
            .bind(entry_key)
            .bind(encoded)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Loads the whole table into an in-memory snapshot, for handing to C3
    /// without holding a connection per lookup.
    pub async fn load_all(&self) -> Result<index_core::hash::MemoryHashStore> {
        let rows: Vec<Row> = sqlx::query_as("SELECT id, h8s FROM perceptual_hashes")
            .fetch_all(&self.pool)
            .await?;

        let mut store = index_core::hash::MemoryHashStore::new();
        for row in rows {
            store.insert(row.id, decode(&row.h8s));
        }
        Ok(store)
    }
}

fn encode(hashes: &[PHash]) -> String {
    hashes.iter().map(|h| format!("{h:016x}")).collect::<Vec<_>>().join(" ")
}

fn decode(h8s: &str) -> Vec<PHash> {
    h8s.split_whitespace()
        .filter_map(|token| u64::from_str_radix(token, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_an_ordered_hash_list() {
        let hashes = vec![0x1u64, 0xDEAD_BEEF, 0xFFFF_FFFF_FFFF_FFFF];
        assert_eq!(decode(&encode(&hashes)), hashes);
    }

    #[test]
    fn encodes_as_fixed_width_lower_hex() {
        assert_eq!(encode(&[0xAu64]), "000000000000000a");
    }
}
