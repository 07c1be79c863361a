use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, TimeZone, Utc};

use super::{strip_trailing_brackets, EntryFields, Source};

/// An E-Hentai gallery entry. Tags are flat `namespace:value` strings, as
/// the gallery API returns them.
#[derive(Debug, Clone)]
pub struct EhGallery {
    pub gid: u64,
    pub token: String,
    pub title: String,
    pub tags: BTreeSet<String>,
    pub file_count: u32,
    pub posted_unix: f64,
    pub thumbnail: Vec<u8>,
}

fn tags_with_prefix<'a, 'b>(entry: &'a EhGallery, prefix: &'b str) -> impl Iterator<Item = &'a str> + use<'a, 'b> {
    entry
        .tags
        .iter()
        .filter_map(move |t| t.strip_prefix(prefix))
}

/// Discards galleries tagged non-H imagesets or whose title marks them as
/// a raw pixiv re-upload (§4.1).
pub fn filter_eh_entries(entries: Vec<EhGallery>) -> Vec<EhGallery> {
    entries
        .into_iter()
        .filter(|e| {
            !e.tags.contains("other:non-h imageset") && !e.title.contains("[pixiv]")
        })
        .collect()
}

/// The `group:*` circle tags, sorted.
pub fn gallery_circles(entry: &EhGallery) -> Vec<String> {
    let mut circles: Vec<String> = tags_with_prefix(entry, "group:").map(str::to_string).collect();
    circles.sort();
    circles
}

/// The `artist:*` tags, sorted; used as the grouping fallback when no circle is present.
pub fn gallery_artists(entry: &EhGallery) -> Vec<String> {
    let mut artists: Vec<String> = tags_with_prefix(entry, "artist:").map(str::to_string).collect();
    artists.sort();
    artists
}

/// Whether the gallery carries the `language:translated` tag.
pub fn gallery_is_translated(entry: &EhGallery) -> bool {
    entry.tags.contains("language:translated")
}

fn eh_language(entry: &EhGallery) -> String {
    for tag in tags_with_prefix(entry, "language:") {
        if tag == "rewrite" || tag == "translated" {
            continue;
        }
        return title_case_word(tag);
    }
    "Japanese".to_string()
}

fn title_case_word(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl EntryFields for EhGallery {
    fn key(&self) -> String {
        format!("eh-{}", self.gid)
    }

    fn source(&self) -> Source {
        Source::Eh
    }

    fn title(&self) -> String {
        self.title.replace('_', " ")
    }

    fn book_title_candidates(&self) -> Vec<String> {
        vec![strip_trailing_brackets(&self.title())]
    }

    fn thumbnails(&self) -> Vec<Vec<u8>> {
        vec![self.thumbnail.clone()]
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.posted_unix as i64, 0).single()
    }

    fn url(&self) -> Option<String> {
        Some(format!("https://e-hentai.org/g/{}/{}", self.gid, self.token))
    }

    fn language(&self) -> Option<String> {
        Some(eh_language(self))
    }

    fn page_count(&self) -> Option<u32> {
        Some(self.file_count)
    }

    fn characters_certain(&self) -> BTreeSet<String> {
        tags_with_prefix(self, "character:")
            .map(title_case_word)
            .collect()
    }

    fn tags_plausible(&self) -> BTreeSet<String> {
        // Only the EH source contributes plausible tags; C6's synonym table
        // decides which of these survive into the final tag set.
        self.tags
            .iter()
            .filter(|t| !t.contains(':'))
            .cloned()
            .collect()
    }

    fn artists(&self) -> BTreeSet<String> {
        gallery_artists(self).into_iter().collect()
    }

    fn descriptions(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gallery(title: &str, tags: &[&str]) -> EhGallery {
        EhGallery {
            gid: 1,
            token: "abc".to_string(),
            title: title.to_string(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            file_count: 20,
            posted_unix: 1_600_000_000.0,
            thumbnail: vec![],
        }
    }

    #[test]
    fn filters_out_non_h_imagesets() {
        let entries = vec![gallery("Work", &["other:non-h imageset"]), gallery("Other", &[])];
        assert_eq!(filter_eh_entries(entries).len(), 1);
    }

    #[test]
    fn filters_out_pixiv_reuploads_by_title() {
        let entries = vec![gallery("Work [pixiv]", &[]), gallery("Work", &[])];
        assert_eq!(filter_eh_entries(entries).len(), 1);
    }

    #[test]
    fn language_skips_translated_and_rewrite_tags() {
        let e = gallery("Work", &["language:translated", "language:english"]);
        assert_eq!(e.language(), Some("English".to_string()));
    }

    #[test]
    fn language_defaults_to_japanese() {
        let e = gallery("Work", &[]);
        assert_eq!(e.language(), Some("Japanese".to_string()));
    }

    #[test]
    fn circles_fall_back_is_caller_responsibility() {
        let e = gallery("Work", &["artist:someone"]);
        assert!(gallery_circles(&e).is_empty());
        assert_eq!(gallery_artists(&e), vec!["someone".to_string()]);
    }
}
