use crate::error::Result;
use index_core::entry::EhGallery;
use sqlx::{FromRow, SqlitePool};

#[derive(FromRow)]
struct GalleryRow {
    gid: i64,
    token: String,
    title: String,
    tags: String,
    file_count: i64,
    posted_unix: f64,
    thumbnail: Vec<u8>,
}

/// Reads every E-Hentai gallery out of the raw `eh_galleries` table. `tags`
/// is stored as a newline-separated blob of `namespace:value` strings (§3).
pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<EhGallery>> {
    let rows: Vec<GalleryRow> =
        sqlx::query_as("SELECT gid, token, title, tags, file_count, posted_unix, thumbnail FROM eh_galleries")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|r| EhGallery {
            gid: r.gid as u64,
            token: r.token,
            title: r.title,
            tags: r.tags.lines().map(str::to_string).collect(),
            file_count: r.file_count as u32,
            posted_unix: r.posted_unix,
            thumbnail: r.thumbnail,
        })
        .collect())
}
