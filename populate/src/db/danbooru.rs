use crate::error::Result;
use chrono::{DateTime, Utc};
use index_core::entry::{DanbooruPool, DanbooruPost};
use sqlx::{FromRow, SqlitePool};

#[derive(FromRow)]
struct PoolRow {
    pool_id: i64,
    name: String,
    description_html: Option<String>,
    thumbnail: Vec<u8>,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct PostRow {
    pool_id: i64,
    id: i64,
    rating: String,
    tag_string_character: String,
    tag_string_meta: String,
}

/// Reads every Danbooru pool and its posts out of the raw `danbooru_pools`
/// / `danbooru_posts` tables (§3, §6).
pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<DanbooruPool>> {
    let pools: Vec<PoolRow> = sqlx::query_as("SELECT pool_id, name, description_html, thumbnail, created_at FROM danbooru_pools")
        .fetch_all(pool)
        .await?;
    let posts: Vec<PostRow> = sqlx::query_as(
        "SELECT pool_id, id, rating, tag_string_character, tag_string_meta FROM danbooru_posts",
    )
    .fetch_all(pool)
    .await?;

    Ok(pools
        .into_iter()
        .map(|p| {
            let pool_posts = posts
                .iter()
                .filter(|post| post.pool_id == p.pool_id)
                .map(|post| DanbooruPost {
                    id: post.id as u64,
                    rating: post.rating.clone(),
                    tag_string_character: post.tag_string_character.clone(),
                    tag_string_meta: post.tag_string_meta.clone(),
                })
                .collect();

            DanbooruPool {
                pool_id: p.pool_id as u64,
                name: p.name,
                posts: pool_posts,
                description_html: p.description_html,
                thumbnail: p.thumbnail,
                created_at: p.created_at,
                linked_pixiv: Vec::new(),
            }
        })
        .collect())
}
