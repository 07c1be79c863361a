//! Entry-list image tree (C3): wraps the BK-tree to assign entries to
//! groups by thumbnail similarity.

use std::collections::HashMap;

use crate::bktree::BkTree;
use crate::entry::Entry;
use crate::hash::{HashStore, PHash};
use crate::list::EntryList;

/// `similarity ∈ [0,1]` to the Hamming radius it corresponds to (§4.3).
pub fn radius_for_similarity(similarity: f64) -> u32 {
    ((1.0 - similarity) * 64.0).floor() as u32
}

/// Assigns entries to [`EntryList`]s by thumbnail similarity. Lists live in
/// an arena and are referenced by stable index, so "de-duplicate by
/// identity" (§4.4) becomes "de-duplicate by index" (Design Notes §9).
#[derive(Default)]
pub struct EntryListImageTree {
    tree: BkTree,
    /// Every hash this tree owns maps to exactly one arena slot (§8 invariant 1).
    owners: HashMap<PHash, usize>,
    lists: Vec<EntryList>,
    orphans: Vec<Entry>,
}

impl EntryListImageTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the tree with already-formed lists (used by C5's phase B),
    /// registering every hash of every entry already in each list to that
    /// list, without re-running similarity matching. Hashes are read from
    /// `store` (C1), the same persisted source `add_or_create` reads from —
    /// this never re-decodes or re-hashes raw thumbnail bytes.
    pub fn seeded(initial_groups: Vec<EntryList>, store: &dyn HashStore) -> Self {
        use crate::entry::EntryFields;

        let mut tree = Self::new();
        for group in initial_groups {
            let index = tree.lists.len();
            tree.lists.push(group);
            let hashes: Vec<PHash> = tree.lists[index]
                .entries
                .iter()
                .flat_map(|e| store.hashes_of(&e.key()))
                .collect();
            tree.try_register(&hashes, index);
        }
        tree
    }

    fn try_register(&mut self, hashes: &[PHash], list_index: usize) {
        for &h in hashes {
            if !self.owners.contains_key(&h) {
                self.owners.insert(h, list_index);
                self.tree.insert(h);
            }
        }
    }

    /// Adds `entry` to whichever existing list one of its hashes matches
    /// within `radius_for_similarity(similarity)`, or starts a new list
    /// (§4.4).
    pub fn add_or_create_with_hashes(&mut self, entry: Entry, hashes: Vec<PHash>, similarity: f64) {
        if hashes.is_empty() {
            self.orphans.push(entry);
            return;
        }

        let radius = radius_for_similarity(similarity);
        let mut matched_index = None;
        for &h in &hashes {
            if let Some(owned) = self.tree.find_closest(h, radius) {
                if let Some(&list_index) = self.owners.get(&owned) {
                    matched_index = Some(list_index);
                    break;
                }
            }
        }

        let list_index = match matched_index {
            Some(index) => {
                self.lists[index].entries.push(entry);
                index
            }
            None => {
                let index = self.lists.len();
                self.lists.push(EntryList::new(entry));
                index
            }
        };

        self.try_register(&hashes, list_index);
    }

    /// Convenience wrapper that computes hashes through `store` (C1) before
    /// delegating to [`Self::add_or_create_with_hashes`].
    pub fn add_or_create(&mut self, entry: Entry, store: &dyn HashStore, similarity: f64) {
        use crate::entry::EntryFields;
        let hashes = store.hashes_of(&entry.key());
        self.add_or_create_with_hashes(entry, hashes, similarity);
    }

    /// The distinct lists reachable from the hash→list map, plus one
    /// singleton list per orphan (§4.4). This consumes the tree, since
    /// ownership of every `EntryList` transfers to the caller.
    pub fn into_entry_lists(mut self) -> Vec<EntryList> {
        let mut reachable: Vec<bool> = vec![false; self.lists.len()];
        for &index in self.owners.values() {
            reachable[index] = true;
        }

        let mut out = Vec::new();
        for (index, list) in self.lists.drain(..).enumerate() {
            if reachable[index] {
                out.push(list);
            }
        }
        for orphan in self.orphans.drain(..) {
            out.push(EntryList::new(orphan));
        }
        out
    }
}
