//! Index assembler (C8): runs C5/C3/C6/C7 over every source and writes the
//! unified relational index inside a single atomic transaction (§4.8).

use index_core::canon::character::CharacterObservation;
use index_core::canon::{
    canonicalise_tags, normalize_artist, CharacterIndex, PairingIndex, MANUAL_CHARACTER_SEEDS,
    MANUAL_PAIRING_SEEDS,
};
use index_core::config::Config;
use index_core::entry::{
    ds_all_pairings, filter_danbooru_pools, filter_doujinshi_org_entries, filter_eh_entries,
    filter_ds_entries, Entry, EntryFields, Source,
};
use index_core::grouper::group_galleries;
use index_core::hash::MemoryHashStore;
use index_core::imagetree::EntryListImageTree;
use index_core::list::EntryList;
use index_core::series::coalesce_book_series;
use indicatif::{ProgressBar, ProgressStyle};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::SourceDatabase;
use crate::error::Result;

/// Non-gallery sources are inserted into the top-level tree in this fixed
/// order (§4.8 step 2, order documented alongside the schema in §6).
const NON_GALLERY_SOURCE_ORDER: &[Source] = &[
    Source::Danbooru,
    Source::Dynasty,
    Source::MangaDex,
    Source::DoujinshiOrg,
    Source::ComicThproject,
    Source::Melonbooks,
    Source::Toranoana,
    Source::Pixiv,
];

/// Runs the full rebuild: gathers every source, groups/clusters/canonicalises,
/// and writes the result into `index_pool` (§4.8).
pub async fn rebuild_index(
    sources: &SourceDatabase,
    hashes: &MemoryHashStore,
    config: &Config,
    index_pool: &SqlitePool,
) -> Result<()> {
    let eh_entries = filter_eh_entries(sources.eh_galleries().await?);
    tracing::info!(count = eh_entries.len(), "gathered EH galleries");

    let gallery_lists = group_galleries(eh_entries, hashes, config);

    let mut tree = EntryListImageTree::seeded(gallery_lists, hashes);

    let danbooru = filter_danbooru_pools(sources.danbooru_pools().await?, config);
    let dynasty = filter_ds_entries(sources.dynasty_chapters().await?);
    let mangadex = sources.mangadex_chapters().await?;
    let doujinshi_org = filter_doujinshi_org_entries(sources.doujinshi_org_entries().await?, config);

    let pairing_seed_entries = dynasty.clone();

    for source in NON_GALLERY_SOURCE_ORDER {
        match source {
            Source::Danbooru => {
                for pool in danbooru.clone() {
                    tree.add_or_create(Entry::Danbooru(pool), hashes, config.cross_source_similarity);
                }
            }
            Source::Dynasty => {
                for chapter in dynasty.clone() {
                    tree.add_or_create(Entry::Dynasty(chapter), hashes, config.cross_source_similarity);
                }
            }
            Source::MangaDex => {
                for chapter in mangadex.clone() {
                    tree.add_or_create(Entry::MangaDex(chapter), hashes, config.cross_source_similarity);
                }
            }
            Source::DoujinshiOrg => {
                for entry in doujinshi_org.clone() {
                    tree.add_or_create(Entry::DoujinshiOrg(entry), hashes, config.cross_source_similarity);
                }
            }
            Source::ComicThproject | Source::Melonbooks | Source::Toranoana | Source::Pixiv => {
                for entry in sources.structural_entries(*source).await? {
                    tree.add_or_create(Entry::Structural(entry), hashes, config.cross_source_similarity);
                }
            }
            Source::Eh => unreachable!("EH is seeded via the gallery grouper, not this loop"),
        }
    }

    let mut lists = tree.into_entry_lists();
    attach_linked_entries(&mut lists);

    let coalesced = coalesce_book_series(&lists);

    let character_index = build_character_index(&danbooru, config);
    let pairing_index = PairingIndex::build(
        &character_index,
        ds_all_pairings(&pairing_seed_entries),
        MANUAL_PAIRING_SEEDS,
    );

    write_index(index_pool, &lists, &coalesced, &character_index, &pairing_index, config).await
}

/// Appends every `linked_entries(entry)` to its own list, without letting
/// linked entries participate in clustering (§4.8 step 4).
fn attach_linked_entries(lists: &mut [EntryList]) {
    for list in lists.iter_mut() {
        let linked: Vec<Entry> = list.entries.iter().flat_map(|e| e.linked_entries()).collect();
        list.entries.extend(linked);
    }
}

fn build_character_index(danbooru: &[index_core::entry::DanbooruPool], config: &Config) -> CharacterIndex {
    let mut counts: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
    for pool in danbooru {
        for name in index_core::entry::characters_with_ratio(pool, config.danbooru_character_ratio) {
            *counts.entry(name).or_insert(0) += 1;
        }
    }

    let observations = counts
        .into_iter()
        .map(|(raw_name, count)| CharacterObservation {
            raw_name,
            count,
            other_names: Vec::new(),
        })
        .collect();

    CharacterIndex::build(observations, config.character_frequency_cutoff, MANUAL_CHARACTER_SEEDS)
}

async fn write_index(
    pool: &SqlitePool,
    lists: &[EntryList],
    coalesced: &index_core::series::CoalescedSeries,
    characters: &CharacterIndex,
    _pairings: &PairingIndex,
    config: &Config,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    for statement in DROP_AND_CREATE {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    let progress = ProgressBar::new(lists.len() as u64);
    progress.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} books").unwrap());

    for (batch_start, batch) in lists.chunks(config.index_batch_size).enumerate() {
        let base_index = batch_start * config.index_batch_size;
        write_batch(&mut tx, batch, base_index, coalesced, characters, config).await?;
        progress.inc(batch.len() as u64);
    }
    progress.finish();

    tx.commit().await?;
    Ok(())
}

const DROP_AND_CREATE: &[&str] = &[
    "DROP TABLE IF EXISTS book_characters",
    "DROP TABLE IF EXISTS book_artists",
    "DROP TABLE IF EXISTS book_tags",
    "DROP TABLE IF EXISTS book_titles",
    "DROP TABLE IF EXISTS book_descriptions",
    "DROP TABLE IF EXISTS index_entries",
    "DROP TABLE IF EXISTS books",
    "DROP TABLE IF EXISTS series",
    "CREATE TABLE series (id INTEGER PRIMARY KEY, title TEXT NOT NULL, comments_count INTEGER NOT NULL)",
    "CREATE TABLE books (id INTEGER PRIMARY KEY, main_title TEXT NOT NULL, thumbnail BLOB, series_id INTEGER REFERENCES series(id), language TEXT)",
    "CREATE TABLE book_titles (book_id INTEGER REFERENCES books(id), title TEXT NOT NULL)",
    "CREATE TABLE book_descriptions (book_id INTEGER REFERENCES books(id), label TEXT NOT NULL, html TEXT NOT NULL)",
    "CREATE TABLE book_tags (book_id INTEGER REFERENCES books(id), tag TEXT NOT NULL)",
    "CREATE TABLE book_artists (book_id INTEGER REFERENCES books(id), artist TEXT NOT NULL)",
    "CREATE TABLE book_characters (book_id INTEGER REFERENCES books(id), character TEXT NOT NULL)",
    "CREATE TABLE index_entries (entry_key TEXT PRIMARY KEY, book_id INTEGER REFERENCES books(id), title TEXT, url TEXT, date TEXT, language TEXT, page_count INTEGER, comments_count INTEGER)",
];

async fn write_batch(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    batch: &[EntryList],
    base_index: usize,
    coalesced: &index_core::series::CoalescedSeries,
    characters: &CharacterIndex,
    config: &Config,
) -> Result<()> {
    for &series_index in coalesced.membership.values() {
        let series = &coalesced.series[series_index];
        sqlx::query("INSERT OR IGNORE INTO series (id, title, comments_count) VALUES (?, ?, ?)")
            .bind(series_index as i64)
            .bind(&series.title)
            .bind(series.comments_count)
            .execute(&mut **tx)
            .await?;
    }

    for (offset, list) in batch.iter().enumerate() {
        let book_id = (base_index + offset) as i64;
        let canonical = list.canonical();
        let main_title = canonical.book_title_candidates().into_iter().next().unwrap_or_default();
        let thumbnail = canonical.thumbnails().into_iter().next();
        let series_id = coalesced.membership.get(&(base_index + offset));

        sqlx::query("INSERT INTO books (id, main_title, thumbnail, series_id, language) VALUES (?, ?, ?, ?, ?)")
            .bind(book_id)
            .bind(&main_title)
            .bind(thumbnail)
            .bind(series_id.map(|i| *i as i64))
            .bind(index_core::entry::entry_language(canonical, config))
            .execute(&mut **tx)
            .await?;

        let mut titles: Vec<String> = list
            .entries
            .iter()
            .flat_map(|e| e.book_title_candidates())
            .collect();
        titles.sort();
        titles.dedup();
        if !titles.is_empty() {
            let mut builder = QueryBuilder::new("INSERT INTO book_titles (book_id, title) ");
            builder.push_values(titles, |mut b, title| {
                b.push_bind(book_id).push_bind(title);
            });
            builder.build().execute(&mut **tx).await?;
        }

        let mut descriptions = std::collections::BTreeMap::new();
        for entry in &list.entries {
            descriptions.extend(entry.descriptions());
        }
        if !descriptions.is_empty() {
            let mut builder = QueryBuilder::new("INSERT INTO book_descriptions (book_id, label, html) ");
            builder.push_values(descriptions, |mut b, (label, html)| {
                b.push_bind(book_id).push_bind(label).push_bind(html);
            });
            builder.build().execute(&mut **tx).await?;
        }

        let mut tags = std::collections::BTreeSet::new();
        let mut artists = std::collections::BTreeSet::new();
        let mut book_characters = std::collections::BTreeSet::new();
        for entry in &list.entries {
            tags.extend(canonicalise_tags(entry.source(), &entry.tags_certain(), &entry.tags_plausible()));
            artists.extend(entry.artists().iter().map(|a| normalize_artist(a)));
            book_characters.extend(
                index_core::entry::entry_characters_certain(entry, config)
                    .iter()
                    .map(|c| characters.canonicalise(c)),
            );
            book_characters.extend(entry.characters_plausible().iter().map(|c| characters.canonicalise(c)));
        }

        insert_strings(tx, "book_tags", "tag", book_id, tags).await?;
        insert_strings(tx, "book_artists", "artist", book_id, artists).await?;
        insert_strings(tx, "book_characters", "character", book_id, book_characters).await?;

        for entry in &list.entries {
            sqlx::query(
                "INSERT INTO index_entries (entry_key, book_id, title, url, date, language, page_count, comments_count)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(entry_key) DO UPDATE SET book_id = excluded.book_id",
            )
            .bind(entry.key())
            .bind(book_id)
            .bind(entry.title())
            .bind(entry.url())
            .bind(index_core::entry::sanitize_date(entry.date(), config.minimum_valid_year).map(|d| d.to_rfc3339()))
            .bind(index_core::entry::entry_language(entry, config))
            .bind(entry.page_count())
            .bind(entry.comments_count())
            .execute(&mut **tx)
            .await?;
        }
    }

    Ok(())
}

async fn insert_strings(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    table: &str,
    column: &str,
    book_id: i64,
    values: impl IntoIterator<Item = String>,
) -> Result<()> {
    let values: Vec<String> = values.into_iter().collect();
    if values.is_empty() {
        return Ok(());
    }
    let mut builder = QueryBuilder::new(format!("INSERT INTO {table} (book_id, {column}) "));
    builder.push_values(values, |mut b, value| {
        b.push_bind(book_id).push_bind(value);
    });
    builder.build().execute(&mut **tx).await?;
    Ok(())
}
