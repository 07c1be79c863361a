use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

use super::EntryFields;
use super::Source;
use crate::config::Config;

/// A doujinshi.org catalog entry.
///
/// `release_date` is `None` when the upstream record uses the `0000-00-00`
/// sentinel for "unknown" — the caller never sees that sentinel string.
#[derive(Debug, Clone)]
pub struct DoujinshiOrgEntry {
    pub id: u64,
    pub title: String,
    pub circle: Option<String>,
    pub age_group: u8,
    pub parody: String,
    pub release_date: Option<NaiveDate>,
    pub thumbnail: Vec<u8>,
}

/// Keeps only all-ages Touhou Project entries with a usable, recent-enough
/// release date (§4.1).
pub fn filter_doujinshi_org_entries(
    entries: Vec<DoujinshiOrgEntry>,
    config: &Config,
) -> Vec<DoujinshiOrgEntry> {
    use chrono::Datelike;
    entries
        .into_iter()
        .filter(|e| {
            e.age_group == 0
                && e.parody == "Touhou Project"
                && e.release_date
                    .map(|d| d.year() > config.doujinshi_org_min_year)
                    .unwrap_or(false)
        })
        .collect()
}

impl EntryFields for DoujinshiOrgEntry {
    fn key(&self) -> String {
        format!("org-{}", self.id)
    }

    fn source(&self) -> Source {
        Source::DoujinshiOrg
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
        self.release_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    }

    fn url(&self) -> Option<String> {
        Some(format!("https://doujinshi.org/book/{}", self.id))
    }

    fn language(&self) -> Option<String> {
        None
    }

    fn page_count(&self) -> Option<u32> {
        None
    }

    fn characters_certain(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn artists(&self) -> BTreeSet<String> {
        self.circle.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(age_group: u8, parody: &str, date: Option<NaiveDate>) -> DoujinshiOrgEntry {
        DoujinshiOrgEntry {
            id: 1,
            title: "A Work".to_string(),
            circle: None,
            age_group,
            parody: parody.to_string(),
            release_date: date,
            thumbnail: vec![],
        }
    }

    #[test]
    fn keeps_all_ages_touhou_with_recent_date() {
        let config = Config::default();
        let entries = vec![entry(0, "Touhou Project", NaiveDate::from_ymd_opt(2010, 1, 1))];
        assert_eq!(filter_doujinshi_org_entries(entries, &config).len(), 1);
    }

    #[test]
    fn drops_unknown_release_date() {
        let config = Config::default();
        let entries = vec![entry(0, "Touhou Project", None)];
        assert!(filter_doujinshi_org_entries(entries, &config).is_empty());
    }

    #[test]
    fn drops_entries_at_or_before_cutoff_year() {
        let config = Config::default();
        let entries = vec![entry(0, "Touhou Project", NaiveDate::from_ymd_opt(2003, 1, 1))];
        assert!(filter_doujinshi_org_entries(entries, &config).is_empty());
    }

    #[test]
    fn drops_non_touhou_parody() {
        let config = Config::default();
        let entries = vec![entry(0, "Other Project", NaiveDate::from_ymd_opt(2010, 1, 1))];
        assert!(filter_doujinshi_org_entries(entries, &config).is_empty());
    }
}
