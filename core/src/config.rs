/// Tunable thresholds threaded explicitly through the pipeline.
///
/// Nothing in this crate reads these values from an ambient global; every
/// function that needs one takes a `&Config` (or the specific field it
/// needs) as an argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Similarity used when grouping entries within a single EH circle bucket (phase A of C5).
    pub circle_similarity: f64,
    /// Similarity used for every cross-bucket / cross-source merge (phase B of C5, and all of C8's source inserts).
    pub cross_source_similarity: f64,
    /// Minimum fraction of posts in a Danbooru pool tagged explicit before the pool is discarded.
    pub danbooru_explicit_ratio: f64,
    /// Minimum fraction of posts in a Danbooru pool tagged questionable before the pool is discarded.
    pub danbooru_questionable_ratio: f64,
    /// Minimum fraction of posts a Danbooru pool's "translated" meta-tag must cover for the pool to be English.
    pub danbooru_translated_ratio: f64,
    /// Minimum fraction of posts a character tag must appear on to count as a certain character.
    pub danbooru_character_ratio: f64,
    /// Minimum occurrence count for a character tag to enter the canonical unique set.
    pub character_frequency_cutoff: u32,
    /// doujinshi.org entries released before this year are dropped.
    pub doujinshi_org_min_year: i32,
    /// Entries dated before this year have their date discarded (treated as absent).
    pub minimum_valid_year: i32,
    /// Rows written per batch during the index rebuild.
    pub index_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            circle_similarity: 0.8,
            cross_source_similarity: 0.9,
            danbooru_explicit_ratio: 0.10,
            danbooru_questionable_ratio: 0.30,
            danbooru_translated_ratio: 0.5,
            danbooru_character_ratio: 0.2,
            character_frequency_cutoff: 20,
            doujinshi_org_min_year: 2003,
            minimum_valid_year: 2000,
            index_batch_size: 10_000,
        }
    }
}
