use crate::error::Result;
use chrono::NaiveDate;
use index_core::entry::{DynastyChapter, DynastyTag};
use sqlx::{FromRow, SqlitePool};

#[derive(FromRow)]
struct ChapterRow {
    slug: String,
    title: String,
    released_on: Option<NaiveDate>,
    page_count: i64,
    thumbnail: Vec<u8>,
}

#[derive(FromRow)]
struct TagRow {
    slug: String,
    kind: String,
    name: String,
}

/// Reads every Dynasty Scans chapter and its `{kind, name}` tags out of the
/// raw `dynasty_chapters` / `dynasty_tags` tables (§3).
pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<DynastyChapter>> {
    let chapters: Vec<ChapterRow> =
        sqlx::query_as("SELECT slug, title, released_on, page_count, thumbnail FROM dynasty_chapters")
            .fetch_all(pool)
            .await?;
    let tags: Vec<TagRow> = sqlx::query_as("SELECT slug, kind, name FROM dynasty_tags")
        .fetch_all(pool)
        .await?;

    Ok(chapters
        .into_iter()
        .map(|c| {
            let chapter_tags = tags
                .iter()
                .filter(|t| t.slug == c.slug)
                .map(|t| DynastyTag {
                    kind: t.kind.clone(),
                    name: t.name.clone(),
                })
                .collect();

            DynastyChapter {
                slug: c.slug,
                title: c.title,
                tags: chapter_tags,
                released_on: c.released_on,
                page_count: c.page_count as u32,
                thumbnail: c.thumbnail,
            }
        })
        .collect())
}
