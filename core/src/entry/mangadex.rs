use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::{EntryFields, SeriesHint, Source};

/// The MangaDex manga a chapter belongs to; doubles as its series.
#[derive(Debug, Clone)]
pub struct MangaDexManga {
    pub id: String,
    pub title: String,
    pub thumbnail: Vec<u8>,
    pub comments_count: u32,
}

/// A single MangaDex chapter.
#[derive(Debug, Clone)]
pub struct MangaDexChapter {
    pub slug: String,
    pub title: String,
    pub language_code: String,
    pub pages: u32,
    pub date: DateTime<Utc>,
    pub thumbnail: Vec<u8>,
    pub manga: MangaDexManga,
}

/// Fixed ISO-ish code to readable-name mapping (§4.1). Unknown codes pass
/// through unchanged, with a diagnostic (§7: "Missing language code").
pub fn mangadex_language_name(code: &str) -> String {
    match code {
        "en" => "English".to_string(),
        "ja" => "Japanese".to_string(),
        "zh" => "Chinese".to_string(),
        "ko" => "Korean".to_string(),
        "es" => "Spanish".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "ru" => "Russian".to_string(),
        "pt-br" => "Brazilian Portuguese".to_string(),
        "id" => "Indonesian".to_string(),
        other => {
            warn!(code = other, "unrecognised MangaDex language code, passing through");
            other.to_string()
        }
    }
}

impl EntryFields for MangaDexChapter {
    fn key(&self) -> String {
        format!("md-{}", self.slug)
    }

    fn source(&self) -> Source {
        Source::MangaDex
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn book_title_candidates(&self) -> Vec<String> {
        use super::strip_touhou_prefix_suffix;
        vec![strip_touhou_prefix_suffix(&self.manga.title)]
    }

    fn thumbnails(&self) -> Vec<Vec<u8>> {
        vec![self.thumbnail.clone(), self.manga.thumbnail.clone()]
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        Some(self.date)
    }

    fn url(&self) -> Option<String> {
        Some(format!("https://mangadex.org/chapter/{}", self.slug))
    }

    fn language(&self) -> Option<String> {
        Some(mangadex_language_name(&self.language_code))
    }

    fn page_count(&self) -> Option<u32> {
        Some(self.pages)
    }

    fn characters_certain(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn series_hint(&self) -> Option<SeriesHint> {
        Some(SeriesHint {
            key: format!("md-manga-{}", self.manga.id),
            title: self.manga.title.clone(),
            comments: self.manga.comments_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_readable_names() {
        assert_eq!(mangadex_language_name("en"), "English");
        assert_eq!(mangadex_language_name("ja"), "Japanese");
    }

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(mangadex_language_name("tlh"), "tlh");
    }

    #[test]
    fn chapters_of_the_same_manga_share_a_series_key() {
        let manga = MangaDexManga {
            id: "m1".to_string(),
            title: "A Manga".to_string(),
            thumbnail: vec![],
            comments_count: 4,
        };
        let a = MangaDexChapter {
            slug: "c1".to_string(),
            title: "Ch 1".to_string(),
            language_code: "en".to_string(),
            pages: 20,
            date: Utc::now(),
            thumbnail: vec![],
            manga: manga.clone(),
        };
        let b = MangaDexChapter { slug: "c2".to_string(), ..a.clone() };
        assert_eq!(a.series_hint().unwrap().key, b.series_hint().unwrap().key);
    }
}
