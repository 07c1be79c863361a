//! Two-phase gallery grouper (C5): buckets EH galleries by circle/artist,
//! then merges across buckets (§4.5).

use std::collections::BTreeMap;

use crate::config::Config;
use crate::entry::{gallery_artists, gallery_circles, gallery_is_translated, EhGallery};
use crate::hash::HashStore;
use crate::imagetree::EntryListImageTree;
use crate::list::EntryList;

/// Groups gallery entries into [`EntryList`]s via the two-phase algorithm,
/// using `config.circle_similarity`/`config.cross_source_similarity` for the
/// intra-circle and cross-circle merge thresholds (§4.5).
pub fn group_galleries(entries: Vec<EhGallery>, store: &dyn HashStore, config: &Config) -> Vec<EntryList> {
    let (bucketed, orphans) = bucket_by_circle_or_artist(entries);

    let mut phase_a_lists = Vec::new();
    for (_, bucket) in bucketed {
        let mut tree = EntryListImageTree::new();
        insert_untranslated_then_translated(&mut tree, bucket, store, config.circle_similarity);
        phase_a_lists.extend(tree.into_entry_lists());
    }

    let mut phase_b_tree = EntryListImageTree::seeded(phase_a_lists, store);
    insert_untranslated_then_translated(&mut phase_b_tree, orphans, store, config.cross_source_similarity);
    phase_b_tree.into_entry_lists()
}

fn insert_untranslated_then_translated(
    tree: &mut EntryListImageTree,
    entries: Vec<EhGallery>,
    store: &dyn HashStore,
    similarity: f64,
) {
    let (untranslated, translated): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|e| !gallery_is_translated(e));
    for entry in untranslated.into_iter().chain(translated) {
        tree.add_or_create(crate::entry::Entry::Eh(entry), store, similarity);
    }
}

/// Partitions entries by their circle tags (falling back to artist tags),
/// returning the buckets plus the entries that have neither (§4.5).
fn bucket_by_circle_or_artist(
    entries: Vec<EhGallery>,
) -> (BTreeMap<Vec<String>, Vec<EhGallery>>, Vec<EhGallery>) {
    let mut buckets: BTreeMap<Vec<String>, Vec<EhGallery>> = BTreeMap::new();
    let mut orphans = Vec::new();

    for entry in entries {
        let circles = gallery_circles(&entry);
        let key = if !circles.is_empty() { circles } else { gallery_artists(&entry) };

        if key.is_empty() {
            orphans.push(entry);
        } else {
            buckets.entry(key).or_default().push(entry);
        }
    }

    (buckets, orphans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryFields;
    use crate::config::Config;
    use crate::hash::MemoryHashStore;

    fn gallery(gid: u64, tags: &[&str], hashes: &mut MemoryHashStore, hs: Vec<u64>) -> EhGallery {
        let g = EhGallery {
            gid,
            token: "t".to_string(),
            title: "Work".to_string(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            file_count: 10,
            posted_unix: 1_600_000_000.0,
            thumbnail: vec![],
        };
        hashes.insert(format!("eh-{gid}"), hs);
        g
    }

    #[test]
    fn same_circle_entries_within_radius_merge() {
        let mut store = MemoryHashStore::new();
        let a = gallery(1, &["group:circle-a"], &mut store, vec![0b0000]);
        let b = gallery(2, &["group:circle-a"], &mut store, vec![0b0011]);
        let lists = group_galleries(vec![a, b], &store, &Config::default());
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].entries.len(), 2);
    }

    #[test]
    fn untranslated_entry_becomes_canonical_even_if_inserted_after_sorting() {
        let mut store = MemoryHashStore::new();
        let translated = gallery(
            1,
            &["group:circle-a", "language:translated", "language:english"],
            &mut store,
            vec![1],
        );
        let untranslated = gallery(2, &["group:circle-a"], &mut store, vec![1]);
        let lists = group_galleries(vec![translated, untranslated], &store, &Config::default());
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].canonical().key(), "eh-2");
    }

    #[test]
    fn entries_without_circle_or_artist_become_phase_b_orphans() {
        let mut store = MemoryHashStore::new();
        let a = gallery(1, &[], &mut store, vec![0x00]);
        let b = gallery(2, &[], &mut store, vec![0xFF]);
        let lists = group_galleries(vec![a, b], &store, &Config::default());
        assert_eq!(lists.len(), 2);
    }

    #[test]
    fn distinct_circles_do_not_merge_at_the_intra_circle_threshold() {
        let mut store = MemoryHashStore::new();
        let a = gallery(1, &["group:circle-a"], &mut store, vec![0x00]);
        let b = gallery(2, &["group:circle-b"], &mut store, vec![0xFF]);
        let lists = group_galleries(vec![a, b], &store, &Config::default());
        assert_eq!(lists.len(), 2);
    }
}
