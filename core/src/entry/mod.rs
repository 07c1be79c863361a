//! Uniform view over the heterogeneous per-source entry records (C4).
//!
//! Each source contributes its own raw record type; [`EntryFields`] is the
//! small accessor trait every one of them implements, and [`Entry`] is the
//! sum type the rest of the pipeline actually operates on.

mod danbooru;
mod dynasty;
mod eh;
mod mangadex;
mod org;
mod structural;

pub use danbooru::{characters_with_ratio, danbooru_language, filter_danbooru_pools, DanbooruPool, DanbooruPost};
pub use dynasty::{ds_all_pairings, filter_ds_entries, DynastyChapter, DynastyTag};
pub use eh::{filter_eh_entries, gallery_artists, gallery_circles, gallery_is_translated, EhGallery};
pub use mangadex::{mangadex_language_name, MangaDexChapter, MangaDexManga};
pub use org::{filter_doujinshi_org_entries, DoujinshiOrgEntry};
pub use structural::StructuralEntry;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

/// The two-letter (or three-letter) prefix every entry key starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    Danbooru,
    Eh,
    Dynasty,
    MangaDex,
    DoujinshiOrg,
    ComicThproject,
    Melonbooks,
    Toranoana,
    Pixiv,
}

impl Source {
    pub fn prefix(self) -> &'static str {
        match self {
            Source::Danbooru => "db",
            Source::Eh => "eh",
            Source::Dynasty => "ds",
            Source::MangaDex => "md",
            Source::DoujinshiOrg => "org",
            Source::ComicThproject => "cth",
            Source::Melonbooks => "mb",
            Source::Toranoana => "tora",
            Source::Pixiv => "px",
        }
    }

    pub fn readable_name(self) -> &'static str {
        match self {
            Source::Danbooru => "Danbooru",
            Source::Eh => "EH",
            Source::Dynasty => "Dynasty Scans",
            Source::MangaDex => "MangaDex",
            Source::DoujinshiOrg => "doujinshi.org",
            Source::ComicThproject => "comic.thproject.net",
            Source::Melonbooks => "Melonbooks",
            Source::Toranoana => "Toranoana",
            Source::Pixiv => "Pixiv",
        }
    }
}

/// A per-source series declaration an entry may carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesHint {
    pub key: String,
    pub title: String,
    pub comments: u32,
}

/// The uniform accessor set every source record implements (§4.1).
///
/// Defaults are provided for the accessors that only a subset of sources
/// populate (pairings, linked entries), matching the original system where
/// most source types simply return nothing for them.
pub trait EntryFields {
    fn key(&self) -> String;
    fn source(&self) -> Source;
    fn title(&self) -> String;

    /// Ordered candidates for the book title; the first is canonical.
    fn book_title_candidates(&self) -> Vec<String>;

    /// Ordered raw thumbnail blobs; the first is preferred.
    fn thumbnails(&self) -> Vec<Vec<u8>>;

    fn date(&self) -> Option<DateTime<Utc>>;
    fn url(&self) -> Option<String>;

    /// Absence means metadata-only (no language could be determined).
    fn language(&self) -> Option<String>;

    fn page_count(&self) -> Option<u32>;

    fn characters_certain(&self) -> BTreeSet<String>;
    fn characters_plausible(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn tags_certain(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
    fn tags_plausible(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn artists(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn descriptions(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn comments_count(&self) -> Option<u32> {
        None
    }

    fn series_hint(&self) -> Option<SeriesHint> {
        None
    }

    /// Character pairings as sets of raw participant names, before canonicalisation.
    fn pairings(&self) -> Vec<BTreeSet<String>> {
        Vec::new()
    }

    /// Entries discovered through this one that should ride along in the
    /// same book without themselves participating in similarity clustering.
    fn linked_entries(&self) -> Vec<Entry> {
        Vec::new()
    }
}

/// The sum type over every source's raw record.
#[derive(Debug, Clone)]
pub enum Entry {
    Danbooru(DanbooruPool),
    Eh(EhGallery),
    Dynasty(DynastyChapter),
    MangaDex(MangaDexChapter),
    DoujinshiOrg(DoujinshiOrgEntry),
    Structural(StructuralEntry),
}

macro_rules! dispatch {
    ($self:ident . $method:ident ( $($arg:expr),* )) => {
        match $self {
            Entry::Danbooru(e) => e.$method($($arg),*),
            Entry::Eh(e) => e.$method($($arg),*),
            Entry::Dynasty(e) => e.$method($($arg),*),
            Entry::MangaDex(e) => e.$method($($arg),*),
            Entry::DoujinshiOrg(e) => e.$method($($arg),*),
            Entry::Structural(e) => e.$method($($arg),*),
        }
    };
}

impl EntryFields for Entry {
    fn key(&self) -> String {
        dispatch!(self.key())
    }
    fn source(&self) -> Source {
        dispatch!(self.source())
    }
    fn title(&self) -> String {
        dispatch!(self.title())
    }
    fn book_title_candidates(&self) -> Vec<String> {
        dispatch!(self.book_title_candidates())
    }
    fn thumbnails(&self) -> Vec<Vec<u8>> {
        dispatch!(self.thumbnails())
    }
    fn date(&self) -> Option<DateTime<Utc>> {
        dispatch!(self.date())
    }
    fn url(&self) -> Option<String> {
        dispatch!(self.url())
    }
    fn language(&self) -> Option<String> {
        dispatch!(self.language())
    }
    fn page_count(&self) -> Option<u32> {
        dispatch!(self.page_count())
    }
    fn characters_certain(&self) -> BTreeSet<String> {
        dispatch!(self.characters_certain())
    }
    fn characters_plausible(&self) -> BTreeSet<String> {
        dispatch!(self.characters_plausible())
    }
    fn tags_certain(&self) -> BTreeSet<String> {
        dispatch!(self.tags_certain())
    }
    fn tags_plausible(&self) -> BTreeSet<String> {
        dispatch!(self.tags_plausible())
    }
    fn artists(&self) -> BTreeSet<String> {
        dispatch!(self.artists())
    }
    fn descriptions(&self) -> BTreeMap<String, String> {
        dispatch!(self.descriptions())
    }
    fn comments_count(&self) -> Option<u32> {
        dispatch!(self.comments_count())
    }
    fn series_hint(&self) -> Option<SeriesHint> {
        dispatch!(self.series_hint())
    }
    fn pairings(&self) -> Vec<BTreeSet<String>> {
        dispatch!(self.pairings())
    }
    fn linked_entries(&self) -> Vec<Entry> {
        dispatch!(self.linked_entries())
    }
}

/// Strips a trailing run of bracketed segments `(…)`, `[…]`, `{…}` (and the
/// whitespace between them) from a title, as EH book titles need.
pub fn strip_trailing_brackets(title: &str) -> String {
    let mut end = title.len();
    loop {
        let trimmed = title[..end].trim_end();
        let bytes = trimmed.as_bytes();
        if bytes.is_empty() {
            end = trimmed.len();
            break;
        }
        let last = *bytes.last().unwrap();
        let opening = match last {
            b')' => b'(',
            b']' => b'[',
            b'}' => b'{',
            _ => {
                end = trimmed.len();
                break;
            }
        };
        match trimmed.as_bytes()[..trimmed.len() - 1]
            .iter()
            .rposition(|&b| b == opening)
        {
            Some(pos) => end = pos,
            None => {
                end = trimmed.len();
                break;
            }
        }
    }
    title[..end].trim_end().to_string()
}

/// Strips the `Touhou -`/`東方 -` prefix and `(Doujinshi)` suffix Danbooru
/// and MangaDex book titles carry.
pub fn strip_touhou_prefix_suffix(title: &str) -> String {
    let mut s = title;
    for prefix in ["Touhou -", "東方 -"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest;
            break;
        }
    }
    let s = s.trim();
    s.strip_suffix("(Doujinshi)").unwrap_or(s).trim().to_string()
}

/// Discards a date whose year predates `minimum_valid_year`.
pub fn sanitize_date(
    date: Option<DateTime<Utc>>,
    minimum_valid_year: i32,
) -> Option<DateTime<Utc>> {
    use chrono::Datelike;
    date.filter(|d| d.year() >= minimum_valid_year)
}

/// Resolves an entry's language, consulting `config.danbooru_translated_ratio`
/// for Danbooru pools instead of `EntryFields::language`'s hardcoded 0.5
/// fallback (§4.1).
pub fn entry_language(entry: &Entry, config: &crate::config::Config) -> Option<String> {
    match entry {
        Entry::Danbooru(pool) => Some(danbooru::danbooru_language(pool, config.danbooru_translated_ratio)),
        other => other.language(),
    }
}

/// Resolves an entry's certain characters, consulting
/// `config.danbooru_character_ratio` for Danbooru pools instead of
/// `EntryFields::characters_certain`'s hardcoded 0.2 fallback (§4.1).
pub fn entry_characters_certain(entry: &Entry, config: &crate::config::Config) -> BTreeSet<String> {
    match entry {
        Entry::Danbooru(pool) => danbooru::characters_with_ratio(pool, config.danbooru_character_ratio),
        other => other.characters_certain(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_trailing_bracket_group() {
        assert_eq!(
            strip_trailing_brackets("A Work (Full Color) [Digital]"),
            "A Work"
        );
    }

    #[test]
    fn leaves_title_without_brackets_untouched() {
        assert_eq!(strip_trailing_brackets("A Plain Title"), "A Plain Title");
    }

    #[test]
    fn strips_touhou_prefix_and_doujinshi_suffix() {
        assert_eq!(
            strip_touhou_prefix_suffix("Touhou - Scarlet Weather Rhapsody (Doujinshi)"),
            "Scarlet Weather Rhapsody"
        );
        assert_eq!(
            strip_touhou_prefix_suffix("東方 - Fantasy Kaleidoscope"),
            "Fantasy Kaleidoscope"
        );
    }

    #[test]
    fn sanitize_date_discards_pre_2000() {
        use chrono::TimeZone;
        let old = Utc.with_ymd_and_hms(1998, 1, 1, 0, 0, 0).unwrap();
        let recent = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(sanitize_date(Some(old), 2000), None);
        assert_eq!(sanitize_date(Some(recent), 2000), Some(recent));
        assert_eq!(sanitize_date(None, 2000), None);
    }
}
