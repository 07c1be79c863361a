//! Artist normalisation (C6): Title-cases names except for an uppercase
//! allow-list (§4.6).

use std::collections::BTreeSet;

/// Names that are acronyms or stage names conventionally kept uppercase.
const UPPERCASE_ALLOW_LIST: &[&str] = &["ZUN"];

pub fn normalize_artist(raw: &str) -> String {
    if UPPERCASE_ALLOW_LIST.contains(&raw) {
        return raw.to_string();
    }
    raw.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Normalises and de-duplicates a set of raw artist names.
pub fn normalize_all<'a>(names: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    names.into_iter().map(normalize_artist).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_listed_names_keep_uppercase() {
        assert_eq!(normalize_artist("ZUN"), "ZUN");
    }

    #[test]
    fn other_names_are_title_cased() {
        assert_eq!(normalize_artist("aya shameimaru"), "Aya Shameimaru");
    }

    #[test]
    fn duplicates_collapse_through_the_set() {
        let normalized = normalize_all(["zun artwork".to_string().as_str(), "Zun Artwork"]);
        assert_eq!(normalized.len(), 1);
    }
}
