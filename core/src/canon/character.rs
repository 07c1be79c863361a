//! Character index (C6): frequency-filtered, token-indexed name
//! canonicalisation (§4.6).

use std::collections::{BTreeMap, HashMap};

/// A character name observed under its raw (source) spelling, together with
/// how many times it was observed and any wiki-sourced aliases.
#[derive(Debug, Clone)]
pub struct CharacterObservation {
    pub raw_name: String,
    pub count: u32,
    pub other_names: Vec<String>,
}

/// Resolves raw, per-source character strings to one canonical vocabulary.
#[derive(Debug, Default)]
pub struct CharacterIndex {
    /// Canonical names that cleared the frequency cutoff.
    unique: std::collections::BTreeSet<String>,
    /// token → canonical name, first writer (by descending frequency) wins.
    tokens: HashMap<String, String>,
}

const FIXED_REPLACEMENTS: &[(&str, &str)] = &[("Pc-98", "PC-98")];

impl CharacterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from raw per-pool observations, a frequency cutoff,
    /// and manual seeds applied last (§4.6).
    pub fn build(
        observations: Vec<CharacterObservation>,
        frequency_cutoff: u32,
        manual_seeds: &[(&str, &str)],
    ) -> Self {
        let mut index = Self::new();

        let mut retained: Vec<CharacterObservation> = observations
            .into_iter()
            .filter(|o| o.count >= frequency_cutoff)
            .collect();
        retained.sort_by(|a, b| b.count.cmp(&a.count));

        for observation in &retained {
            let canonical = normalize_character_name(&observation.raw_name);
            index.unique.insert(canonical.clone());
            for token in canonical.split_whitespace() {
                index.tokens.entry(token.to_string()).or_insert_with(|| canonical.clone());
            }
            for alias in &observation.other_names {
                index.tokens.entry(alias.clone()).or_insert_with(|| canonical.clone());
                let stripped = alias.replace('・', "");
                if stripped != *alias {
                    index.tokens.entry(stripped).or_insert_with(|| canonical.clone());
                }
            }
        }

        for &(alias, canonical) in manual_seeds {
            index
                .tokens
                .entry(alias.to_string())
                .or_insert_with(|| canonical.to_string());
        }

        index
    }

    /// (a) already unique, (b) reversed-token form unique, (c) first token's
    /// Title-case form present in the map, (d) nothing (§4.6).
    pub fn find_and_canonicalise(&self, name: &str) -> Option<String> {
        if self.unique.contains(name) {
            return Some(name.to_string());
        }

        if let Some(reversed) = reverse_two_tokens(name) {
            if self.unique.contains(&reversed) {
                return Some(reversed);
            }
        }

        name.split_whitespace()
            .find_map(|token| self.tokens.get(&title_case(token)).cloned())
    }

    /// Normalises `name` first, then searches; falls back to the original
    /// input on a miss so canonicalisation is never destructive (§4.6, §7).
    pub fn canonicalise(&self, name: &str) -> String {
        let normalized = normalize_character_name(name);
        self.find_and_canonicalise(&normalized)
            .unwrap_or_else(|| name.to_string())
    }
}

fn reverse_two_tokens(name: &str) -> Option<String> {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    if tokens.len() == 2 {
        Some(format!("{} {}", tokens[1], tokens[0]))
    } else {
        None
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// `snake_case_name_(touhou)` → `Snake Case Name`, with fixed replacements
/// and the `(Touhou)` suffix stripped (§4.6).
pub fn normalize_character_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let without_suffix = lowered
        .strip_suffix("_(touhou)")
        .or_else(|| lowered.strip_suffix(" (touhou)"))
        .unwrap_or(&lowered);

    let mut title: String = without_suffix
        .split(|c: char| c == '_' || c == ' ')
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");

    for &(from, to) in FIXED_REPLACEMENTS {
        title = title.replace(from, to);
    }
    title
}

/// Merges character-name sources (certain/plausible sets, already
/// canonicalised or not) into the per-book sorted set used at write time.
pub fn canonicalise_all<'a>(
    index: &CharacterIndex,
    names: impl IntoIterator<Item = &'a str>,
) -> BTreeMap<String, ()> {
    names
        .into_iter()
        .map(|n| (index.canonicalise(n), ()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(raw: &str, count: u32) -> CharacterObservation {
        CharacterObservation {
            raw_name: raw.to_string(),
            count,
            other_names: Vec::new(),
        }
    }

    #[test]
    fn below_cutoff_names_are_discarded() {
        let index = CharacterIndex::build(vec![obs("reimu_hakurei_(touhou)", 5)], 20, &[]);
        assert_eq!(index.find_and_canonicalise("Reimu Hakurei"), None);
    }

    #[test]
    fn high_frequency_name_becomes_canonical_and_token_searchable() {
        let index = CharacterIndex::build(vec![obs("hakurei_reimu_(touhou)", 500)], 20, &[]);
        assert_eq!(
            index.find_and_canonicalise("Hakurei Reimu"),
            Some("Hakurei Reimu".to_string())
        );
        assert_eq!(
            index.find_and_canonicalise("reimu hakurei"),
            Some("Hakurei Reimu".to_string())
        );
    }

    #[test]
    fn most_frequent_spelling_wins_the_token_map() {
        let index = CharacterIndex::build(
            vec![obs("pc-98_maiden_(touhou)", 100), obs("pc_98_maiden", 30)],
            20,
            &[],
        );
        // "Maiden" is a token of both spellings; the higher-count one (seen
        // first in descending-frequency order) keeps the token mapping.
        assert_eq!(index.canonicalise("Maiden"), "PC-98 Maiden".to_string());
    }

    #[test]
    fn manual_seed_resolves_untransliterated_name() {
        let index = CharacterIndex::build(vec![], 20, &[("アリス", "Alice Margatroid")]);
        assert_eq!(index.canonicalise("アリス"), "Alice Margatroid");
    }

    #[test]
    fn unresolvable_name_falls_back_to_the_input() {
        let index = CharacterIndex::build(vec![], 20, &[]);
        assert_eq!(index.canonicalise("totally_unknown_character"), "totally_unknown_character");
    }

    #[test]
    fn normalize_strips_touhou_suffix_and_applies_fixed_replacements() {
        assert_eq!(normalize_character_name("letty_whiterock_(touhou)"), "Letty Whiterock");
        assert_eq!(normalize_character_name("pc-98_maiden"), "PC-98 Maiden");
    }
}
