//! Raw per-source record stores (C9): each source's rows, read out as a
//! finite collection of the entry type C4 already knows how to wrap.

pub mod danbooru;
pub mod doujinshi_org;
pub mod dynasty;
pub mod eh;
pub mod mangadex;
pub mod structural;

use crate::error::Result;
use sqlx::SqlitePool;

/// Owns the connection pool to the raw-record database and exposes one
/// finite-collection read per source.
pub struct SourceDatabase {
    pool: SqlitePool,
}

impl SourceDatabase {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url).await?;
        Ok(SourceDatabase { pool })
    }

    pub async fn danbooru_pools(&self) -> Result<Vec<index_core::entry::DanbooruPool>> {
        danbooru::fetch_all(&self.pool).await
    }

    pub async fn eh_galleries(&self) -> Result<Vec<index_core::entry::EhGallery>> {
        eh::fetch_all(&self.pool).await
    }

    pub async fn dynasty_chapters(&self) -> Result<Vec<index_core::entry::DynastyChapter>> {
        dynasty::fetch_all(&self.pool).await
    }

    pub async fn mangadex_chapters(&self) -> Result<Vec<index_core::entry::MangaDexChapter>> {
        mangadex::fetch_all(&self.pool).await
    }

    pub async fn doujinshi_org_entries(&self) -> Result<Vec<index_core::entry::DoujinshiOrgEntry>> {
        doujinshi_org::fetch_all(&self.pool).await
    }

    pub async fn structural_entries(
        &self,
        source: index_core::entry::Source,
    ) -> Result<Vec<index_core::entry::StructuralEntry>> {
        structural::fetch_all(&self.pool, source).await
    }
}
