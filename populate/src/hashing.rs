//! The `build-hashes` pipeline (C10): runs C1's hash generation over every
//! source in parallel and persists the result.

use crate::error::Result;
use index_core::entry::EntryFields;
use index_core::hash::entry_hashes;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::db::SourceDatabase;
use crate::hash_store::SqlitePerceptualHashStore;

/// Decodes and hashes every entry's thumbnails, writing `(key, hashes)`
/// pairs to the perceptual-hash store. Decoding/DCT work is CPU-bound, so
/// it runs across a rayon thread pool while persistence stays on the async
/// task (§4.2, §1.1 ambient stack).
pub async fn build_hashes(sources: &SourceDatabase, store: &SqlitePerceptualHashStore) -> Result<()> {
    let mut entries: Vec<(String, Vec<Vec<u8>>)> = Vec::new();
    for pool in sources.danbooru_pools().await? {
        entries.push((pool.key(), pool.thumbnails()));
    }
    for gallery in sources.eh_galleries().await? {
        entries.push((gallery.key(), gallery.thumbnails()));
    }
    for chapter in sources.dynasty_chapters().await? {
        entries.push((chapter.key(), chapter.thumbnails()));
    }
    for chapter in sources.mangadex_chapters().await? {
        entries.push((chapter.key(), chapter.thumbnails()));
    }
    for org_entry in sources.doujinshi_org_entries().await? {
        entries.push((org_entry.key(), org_entry.thumbnails()));
    }
    for source in [
        index_core::entry::Source::ComicThproject,
        index_core::entry::Source::Melonbooks,
        index_core::entry::Source::Toranoana,
        index_core::entry::Source::Pixiv,
    ] {
        for structural in sources.structural_entries(source).await? {
            entries.push((structural.key(), structural.thumbnails()));
        }
    }

    let progress = ProgressBar::new(entries.len() as u64);
    progress.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} entries hashed").unwrap());

    let hashed: Vec<(String, Vec<u64>)> = entries
        .into_par_iter()
        .map(|(key, thumbnails)| {
            let hashes = entry_hashes(&thumbnails);
            progress.inc(1);
            (key, hashes)
        })
        .collect();
    progress.finish();

    for (key, hashes) in hashed {
        store.set(&key, &hashes).await?;
    }

    Ok(())
}
