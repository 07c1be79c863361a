use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use super::{strip_touhou_prefix_suffix, Entry, EntryFields, Source, StructuralEntry};
use crate::config::Config;

/// A single post belonging to a Danbooru pool.
#[derive(Debug, Clone)]
pub struct DanbooruPost {
    pub id: u64,
    pub rating: String,
    pub tag_string_character: String,
    pub tag_string_meta: String,
}

/// A Danbooru pool (a curated sequence of posts depicting one work).
#[derive(Debug, Clone)]
pub struct DanbooruPool {
    pub pool_id: u64,
    pub name: String,
    pub posts: Vec<DanbooruPost>,
    pub description_html: Option<String>,
    pub thumbnail: Vec<u8>,
    pub created_at: DateTime<Utc>,
    /// Pixiv works discovered via post source URLs, already resolved by the scraper.
    pub linked_pixiv: Vec<StructuralEntry>,
}

/// Fraction of posts carrying a "translated" meta-tag.
pub fn pool_translation_ratio(pool: &DanbooruPool) -> f64 {
    if pool.posts.is_empty() {
        return 0.0;
    }
    let translated = pool
        .posts
        .iter()
        .filter(|p| p.tag_string_meta.split_whitespace().any(|t| t == "translated"))
        .count();
    translated as f64 / pool.posts.len() as f64
}

fn rating_ratio(pool: &DanbooruPool, rating: &str) -> f64 {
    if pool.posts.is_empty() {
        return 0.0;
    }
    let count = pool.posts.iter().filter(|p| p.rating == rating).count();
    count as f64 / pool.posts.len() as f64
}

/// Discards pools with too high a proportion of explicit/questionable posts (§4.1).
pub fn filter_danbooru_pools(pools: Vec<DanbooruPool>, config: &Config) -> Vec<DanbooruPool> {
    pools
        .into_iter()
        .filter(|pool| {
            rating_ratio(pool, "e") < config.danbooru_explicit_ratio
                && rating_ratio(pool, "q") < config.danbooru_questionable_ratio
        })
        .collect()
}

impl EntryFields for DanbooruPool {
    fn key(&self) -> String {
        format!("db-{}", self.pool_id)
    }

    fn source(&self) -> Source {
        Source::Danbooru
    }

    fn title(&self) -> String {
        self.name.replace('_', " ")
    }

    fn book_title_candidates(&self) -> Vec<String> {
        vec![strip_touhou_prefix_suffix(&self.title())]
    }

    fn thumbnails(&self) -> Vec<Vec<u8>> {
        vec![self.thumbnail.clone()]
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn url(&self) -> Option<String> {
        Some(format!("https://danbooru.donmai.us/pools/{}", self.pool_id))
    }

    fn language(&self) -> Option<String> {
        // Callers with access to a Config should prefer `language_with`;
        // this falls back to the spec's default threshold of 0.5.
        Some(if pool_translation_ratio(self) >= 0.5 {
            "English".to_string()
        } else {
            "Japanese".to_string()
        })
    }

    fn page_count(&self) -> Option<u32> {
        Some(self.posts.len() as u32)
    }

    fn characters_certain(&self) -> BTreeSet<String> {
        characters_with_ratio(self, 0.2)
    }

    fn descriptions(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        if let Some(html) = &self.description_html {
            map.insert("Danbooru".to_string(), html.clone());
        }
        map
    }

    fn linked_entries(&self) -> Vec<Entry> {
        self.linked_pixiv
            .iter()
            .cloned()
            .map(Entry::Structural)
            .collect()
    }
}

/// Language using an explicit threshold instead of the spec default of 0.5.
pub fn danbooru_language(pool: &DanbooruPool, translated_ratio: f64) -> String {
    if pool_translation_ratio(pool) >= translated_ratio {
        "English".to_string()
    } else {
        "Japanese".to_string()
    }
}

pub fn characters_with_ratio(pool: &DanbooruPool, ratio: f64) -> BTreeSet<String> {
    let mut appearances: BTreeMap<String, usize> = BTreeMap::new();
    for post in &pool.posts {
        for tag in post.tag_string_character.split_whitespace() {
            let name = title_case(&tag.replace('_', " "));
            *appearances.entry(name).or_insert(0) += 1;
        }
    }

    let threshold = ratio * pool.posts.len() as f64;
    appearances
        .into_iter()
        .filter(|(_, count)| *count as f64 >= threshold)
        .map(|(name, _)| name)
        .collect()
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(rating: &str, meta: &str, characters: &str) -> DanbooruPost {
        DanbooruPost {
            id: 1,
            rating: rating.to_string(),
            tag_string_character: characters.to_string(),
            tag_string_meta: meta.to_string(),
        }
    }

    fn pool(posts: Vec<DanbooruPost>) -> DanbooruPool {
        DanbooruPool {
            pool_id: 1,
            name: "Touhou - Test Work (Doujinshi)".to_string(),
            posts,
            description_html: None,
            thumbnail: vec![],
            created_at: Utc::now(),
            linked_pixiv: vec![],
        }
    }

    #[test]
    fn retains_pool_under_explicit_threshold() {
        let config = Config::default();
        let posts = (0..10).map(|_| post("s", "", "")).collect();
        let pools = filter_danbooru_pools(vec![pool(posts)], &config);
        assert_eq!(pools.len(), 1);
    }

    #[test]
    fn discards_pool_over_explicit_threshold() {
        let config = Config::default();
        let posts = (0..10)
            .map(|i| post(if i < 2 { "e" } else { "s" }, "", ""))
            .collect::<Vec<_>>();
        // Bump to exactly the 10% boundary plus one to force a discard.
        let mut posts_over = posts.clone();
        posts_over.push(post("e", "", ""));
        let pools = filter_danbooru_pools(vec![pool(posts_over)], &config);
        assert!(pools.is_empty());
    }

    #[test]
    fn language_follows_translated_ratio() {
        let mostly_translated = pool(vec![
            post("s", "translated", ""),
            post("s", "translated", ""),
            post("s", "", ""),
        ]);
        assert_eq!(danbooru_language(&mostly_translated, 0.5), "English");

        let mostly_untranslated = pool(vec![post("s", "", ""), post("s", "translated", "")]);
        assert_eq!(danbooru_language(&mostly_untranslated, 0.5), "Japanese");
    }

    #[test]
    fn characters_require_minimum_appearance_ratio() {
        let posts = vec![
            post("s", "", "hakurei_reimu"),
            post("s", "", "hakurei_reimu"),
            post("s", "", "kirisame_marisa"),
        ];
        let characters = characters_with_ratio(&pool(posts), 0.2);
        assert!(characters.contains("Hakurei Reimu"));
        assert!(characters.contains("Kirisame Marisa"));
    }

    #[test]
    fn book_title_strips_prefix_and_suffix() {
        let item = pool(vec![]);
        assert_eq!(item.book_title_candidates(), vec!["Test Work".to_string()]);
    }
}
