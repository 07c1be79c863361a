use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::EntryFields;
use super::Source;

/// The four sources that contribute structural metadata only, with no
/// language-based filtering (§4.1): comic.thproject.net, Melonbooks,
/// Toranoana and Pixiv.
#[derive(Debug, Clone)]
pub struct StructuralEntry {
    pub source: Source,
    pub id: String,
    pub title: String,
    pub thumbnail: Vec<u8>,
    pub url: Option<String>,
    pub page_count: Option<u32>,
    pub date: Option<DateTime<Utc>>,
}

impl EntryFields for StructuralEntry {
    fn key(&self) -> String {
        format!("{}-{}", self.source.prefix(), self.id)
    }

    fn source(&self) -> Source {
        self.source
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn book_title_candidates(&self) -> Vec<String> {
        vec![self.title.clone()]
    }

    fn thumbnails(&self) -> Vec<Vec<u8>> {
        vec![self.thumbnail.clone()]
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    fn url(&self) -> Option<String> {
        self.url.clone()
    }

    fn language(&self) -> Option<String> {
        None
    }

    fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    fn characters_certain(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    // §9 open question: these four sources currently contribute no
    // artists. `artists()` keeps the trait default (empty set) rather
    // than guessing a source for one.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_the_source_prefix() {
        let e = StructuralEntry {
            source: Source::Toranoana,
            id: "42".to_string(),
            title: "A Work".to_string(),
            thumbnail: vec![],
            url: None,
            page_count: None,
            date: None,
        };
        assert_eq!(e.key(), "tora-42");
    }

    #[test]
    fn contributes_no_artists() {
        let e = StructuralEntry {
            source: Source::Pixiv,
            id: "1".to_string(),
            title: "A Work".to_string(),
            thumbnail: vec![],
            url: None,
            page_count: None,
            date: None,
        };
        assert!(e.artists().is_empty());
    }
}
