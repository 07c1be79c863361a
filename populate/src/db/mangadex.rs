use crate::error::Result;
use chrono::{DateTime, Utc};
use index_core::entry::{MangaDexChapter, MangaDexManga};
use sqlx::{FromRow, SqlitePool};

#[derive(FromRow)]
struct MangaRow {
    id: String,
    title: String,
    thumbnail: Vec<u8>,
    comments_count: i64,
}

#[derive(FromRow)]
struct ChapterRow {
    slug: String,
    manga_id: String,
    title: String,
    language_code: String,
    pages: i64,
    date: DateTime<Utc>,
    thumbnail: Vec<u8>,
}

/// Reads every MangaDex manga and chapter out of the raw `mangadex_manga` /
/// `mangadex_chapters` tables (§3).
pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<MangaDexChapter>> {
    let mangas: Vec<MangaRow> =
        sqlx::query_as("SELECT id, title, thumbnail, comments_count FROM mangadex_manga")
            .fetch_all(pool)
            .await?;
    let chapters: Vec<ChapterRow> = sqlx::query_as(
        "SELECT slug, manga_id, title, language_code, pages, date, thumbnail FROM mangadex_chapters",
    )
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(chapters.len());
    for c in chapters {
        let Some(manga) = mangas.iter().find(|m| m.id == c.manga_id) else {
            tracing::warn!(chapter = %c.slug, "chapter references an unknown manga, skipping");
            continue;
        };
        out.push(MangaDexChapter {
            slug: c.slug,
            title: c.title,
            language_code: c.language_code,
            pages: c.pages as u32,
            date: c.date,
            thumbnail: c.thumbnail,
            manga: MangaDexManga {
                id: manga.id.clone(),
                title: manga.title.clone(),
                thumbnail: manga.thumbnail.clone(),
                comments_count: manga.comments_count as u32,
            },
        });
    }
    Ok(out)
}
