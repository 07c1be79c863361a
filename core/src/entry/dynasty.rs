use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

use super::EntryFields;
use super::Source;

/// A single `{type, name}` tag as the Dynasty Scans API returns it.
#[derive(Debug, Clone)]
pub struct DynastyTag {
    pub kind: String,
    pub name: String,
}

/// A Dynasty Scans chapter.
#[derive(Debug, Clone)]
pub struct DynastyChapter {
    pub slug: String,
    pub title: String,
    pub tags: Vec<DynastyTag>,
    pub released_on: Option<NaiveDate>,
    pub page_count: u32,
    pub thumbnail: Vec<u8>,
}

fn is_nsfw(chapter: &DynastyChapter) -> bool {
    chapter
        .tags
        .iter()
        .any(|t| t.kind == "General" && t.name == "NSFW")
}

/// Discards chapters carrying the `(General, NSFW)` tag (§4.1).
pub fn filter_ds_entries(entries: Vec<DynastyChapter>) -> Vec<DynastyChapter> {
    entries.into_iter().filter(|e| !is_nsfw(e)).collect()
}

fn pairings(chapter: &DynastyChapter) -> Vec<BTreeSet<String>> {
    chapter
        .tags
        .iter()
        .filter(|t| t.kind == "Pairing")
        .map(|t| t.name.split(" x ").map(str::to_string).collect())
        .collect()
}

/// Every distinct pairing observed across a set of chapters, used to seed
/// the pairing canonicalisation index (C6).
pub fn ds_all_pairings(entries: &[DynastyChapter]) -> Vec<BTreeSet<String>> {
    let mut seen = BTreeSet::new();
    let mut all = Vec::new();
    for entry in entries {
        for pairing in pairings(entry) {
            let key: Vec<String> = pairing.iter().cloned().collect();
            if seen.insert(key) {
                all.push(pairing);
            }
        }
    }
    all
}

impl EntryFields for DynastyChapter {
    fn key(&self) -> String {
        format!("ds-{}", self.slug)
    }

    fn source(&self) -> Source {
        Source::Dynasty
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
        self.released_on
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    }

    fn url(&self) -> Option<String> {
        Some(format!("https://dynasty-scans.com/chapters/{}", self.slug))
    }

    fn language(&self) -> Option<String> {
        Some("English".to_string())
    }

    fn page_count(&self) -> Option<u32> {
        Some(self.page_count)
    }

    fn characters_certain(&self) -> BTreeSet<String> {
        pairings(self).into_iter().flatten().collect()
    }

    fn pairings(&self) -> Vec<BTreeSet<String>> {
        pairings(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(tags: Vec<(&str, &str)>) -> DynastyChapter {
        DynastyChapter {
            slug: "a-chapter".to_string(),
            title: "A Chapter".to_string(),
            tags: tags
                .into_iter()
                .map(|(kind, name)| DynastyTag {
                    kind: kind.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            released_on: NaiveDate::from_ymd_opt(2015, 1, 1),
            page_count: 20,
            thumbnail: vec![],
        }
    }

    #[test]
    fn filters_nsfw_general_tag() {
        let entries = vec![
            chapter(vec![("General", "NSFW")]),
            chapter(vec![("General", "Fantasy")]),
        ];
        assert_eq!(filter_ds_entries(entries).len(), 1);
    }

    #[test]
    fn splits_pairing_tag_into_participants() {
        let c = chapter(vec![("Pairing", "Reimu x Marisa")]);
        let chars = c.characters_certain();
        assert!(chars.contains("Reimu"));
        assert!(chars.contains("Marisa"));
    }

    #[test]
    fn language_is_fixed_english() {
        assert_eq!(chapter(vec![]).language(), Some("English".to_string()));
    }
}
