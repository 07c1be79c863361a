//! Series coalescer (C7): unions per-source series declarations into
//! super-series via disjoint-set, then projects them onto the book lists
//! that carry them (§4.7).

use std::collections::BTreeMap;

use crate::entry::EntryFields;
use crate::list::EntryList;

/// A disjoint-set over series keys with union by rank and path compression.
#[derive(Default)]
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn make_set(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        self.rank.push(0);
        id
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// A resolved super-series: the union of every series key merged into it.
#[derive(Debug, Clone)]
pub struct Series {
    pub root_key: String,
    pub title: String,
    pub comments_count: u32,
}

/// Which super-series (if any) each entry-list index belongs to, plus the
/// resolved super-series records, with series carrying only one book
/// dropped (§4.7).
pub struct CoalescedSeries {
    pub series: Vec<Series>,
    /// entry-list index -> index into `series`.
    pub membership: BTreeMap<usize, usize>,
}

/// Runs C7 over the final list set. `lists` is in output order, i.e. the
/// iteration order C8 collects from `all_entry_lists()` at step 2.
pub fn coalesce_book_series(lists: &[EntryList]) -> CoalescedSeries {
    let mut set = DisjointSet::default();
    // key -> (disjoint-set id, first-seen title, summed comments).
    let mut keys: BTreeMap<String, (usize, String, u32)> = BTreeMap::new();
    let mut first_inserted_order: Vec<String> = Vec::new();

    let mut list_keys: Vec<Vec<String>> = Vec::with_capacity(lists.len());

    for list in lists {
        let mut keys_in_this_list = Vec::new();
        let mut previous_id: Option<usize> = None;

        for entry in &list.entries {
            let Some(hint) = entry.series_hint() else {
                continue;
            };

            let id = match keys.get(&hint.key) {
                Some(&(id, _, _)) => id,
                None => {
                    let id = set.make_set();
                    keys.insert(hint.key.clone(), (id, hint.title.clone(), 0));
                    first_inserted_order.push(hint.key.clone());
                    id
                }
            };
            keys.get_mut(&hint.key).unwrap().2 += hint.comments;
            keys_in_this_list.push(hint.key.clone());

            if let Some(prev) = previous_id {
                set.union(prev, id);
            }
            previous_id = Some(id);
        }

        list_keys.push(keys_in_this_list);
    }

    // Group keys by resolved root, keeping the first-inserted key of each
    // component as the component's representative (§4.7).
    let mut root_to_series_index: BTreeMap<usize, usize> = BTreeMap::new();
    let mut series: Vec<Series> = Vec::new();

    for key in &first_inserted_order {
        let (id, title, comments) = keys.get(key).unwrap().clone();
        let root = set.find(id);
        match root_to_series_index.get(&root) {
            Some(&index) => {
                series[index].comments_count += comments;
            }
            None => {
                let index = series.len();
                series.push(Series {
                    root_key: key.clone(),
                    title,
                    comments_count: comments,
                });
                root_to_series_index.insert(root, index);
            }
        }
    }

    // Each list joins the super-series of its first non-empty series_hint.
    let mut membership = BTreeMap::new();
    let mut book_counts = vec![0u32; series.len()];
    for (list_index, keys_in_list) in list_keys.iter().enumerate() {
        if let Some(first_key) = keys_in_list.first() {
            let id = keys.get(first_key).unwrap().0;
            let root = set.find(id);
            let series_index = root_to_series_index[&root];
            membership.insert(list_index, series_index);
            book_counts[series_index] += 1;
        }
    }

    // Drop series with only one associated book (§4.7).
    let keep: Vec<bool> = book_counts.iter().map(|&c| c > 1).collect();
    let mut remap = vec![None; series.len()];
    let mut kept_series = Vec::new();
    for (old_index, s) in series.into_iter().enumerate() {
        if keep[old_index] {
            remap[old_index] = Some(kept_series.len());
            kept_series.push(s);
        }
    }
    membership.retain(|_, series_index| remap[*series_index].is_some());
    for series_index in membership.values_mut() {
        *series_index = remap[*series_index].unwrap();
    }

    CoalescedSeries {
        series: kept_series,
        membership,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, MangaDexChapter, MangaDexManga};
    use chrono::{TimeZone, Utc};

    fn chapter(slug: &str, manga_id: &str, manga_title: &str, comments: u32) -> Entry {
        Entry::MangaDex(MangaDexChapter {
            slug: slug.to_string(),
            title: "Chapter".to_string(),
            language_code: "en".to_string(),
            pages: 10,
            date: Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap(),
            thumbnail: vec![],
            manga: MangaDexManga {
                id: manga_id.to_string(),
                title: manga_title.to_string(),
                thumbnail: vec![],
                comments_count: comments,
            },
        })
    }

    #[test]
    fn lists_sharing_a_series_hint_merge_into_one_super_series() {
        let a = EntryList::new(chapter("a", "manga-1", "Title", 5));
        let b = EntryList::new(chapter("b", "manga-1", "Title", 3));
        let coalesced = coalesce_book_series(&[a, b]);
        assert_eq!(coalesced.series.len(), 1);
        assert_eq!(coalesced.series[0].comments_count, 8);
        assert_eq!(coalesced.membership.get(&0), coalesced.membership.get(&1));
    }

    #[test]
    fn single_book_series_are_dropped() {
        let a = EntryList::new(chapter("a", "manga-1", "Title", 5));
        let coalesced = coalesce_book_series(&[a]);
        assert!(coalesced.series.is_empty());
        assert!(coalesced.membership.is_empty());
    }

    #[test]
    fn lists_without_series_hints_have_no_membership() {
        use crate::entry::{Source, StructuralEntry};
        let a = EntryList::new(Entry::Structural(StructuralEntry {
            source: Source::Pixiv,
            id: "1".to_string(),
            title: "x".to_string(),
            thumbnail: vec![],
            url: None,
            page_count: None,
            date: None,
        }));
        let coalesced = coalesce_book_series(&[a]);
        assert!(coalesced.membership.is_empty());
    }
}
