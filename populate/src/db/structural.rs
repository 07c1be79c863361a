use crate::error::Result;
use chrono::{DateTime, Utc};
use index_core::entry::{Source, StructuralEntry};
use sqlx::{FromRow, SqlitePool};

#[derive(FromRow)]
struct StructuralRow {
    id: String,
    title: String,
    thumbnail: Vec<u8>,
    url: Option<String>,
    page_count: Option<i64>,
    date: Option<DateTime<Utc>>,
}

/// Reads the rows for one structural source (comic.thproject.net,
/// Melonbooks, Toranoana or Pixiv) out of the shared `structural_entries`
/// table, keyed by its `source` prefix column (§3).
pub async fn fetch_all(pool: &SqlitePool, source: Source) -> Result<Vec<StructuralEntry>> {
    let rows: Vec<StructuralRow> = sqlx::query_as(
        "SELECT id, title, thumbnail, url, page_count, date FROM structural_entries WHERE source = ?",
    )
    .bind(source.prefix())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| StructuralEntry {
            source,
            id: r.id,
            title: r.title,
            thumbnail: r.thumbnail,
            url: r.url,
            page_count: r.page_count.map(|p| p as u32),
            date: r.date,
        })
        .collect())
}
