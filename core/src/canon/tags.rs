//! Tag synonym table (C6): collapses spelling variants and turns pairings
//! into tag strings (§4.6).

use std::collections::BTreeSet;

use crate::entry::Source;

const SYNONYMS: &[(&str, &str)] = &[
    ("Girls' Love", "Yuri"),
    ("Slice of Life", "Slice of life"),
    ("School Life", "School life"),
    ("Time Travel", "Time travel"),
    ("Sci-Fi", "Sci-fi"),
    ("4-Koma", "4-koma"),
    ("Full Color", "Full color"),
    ("Gender bender", "Genderswap"),
    ("Alien", "Aliens"),
    ("Ghost", "Ghosts"),
    ("Vampire", "Vampires"),
    ("Artbook", "Artbook"),
];

fn resolve_synonym(tag: &str) -> Option<&'static str> {
    SYNONYMS
        .iter()
        .find(|(from, _)| *from == tag)
        .map(|(_, to)| *to)
}

/// Certain tags are always kept (already vetted by the source). Plausible
/// tags only survive if the source is EH and the tag has a synonym-table
/// entry (§4.6).
pub fn canonicalise_tags(
    source: Source,
    certain: &BTreeSet<String>,
    plausible: &BTreeSet<String>,
) -> BTreeSet<String> {
    let mut out: BTreeSet<String> = certain
        .iter()
        .map(|t| resolve_synonym(t).map(str::to_string).unwrap_or_else(|| t.clone()))
        .collect();

    if source == Source::Eh {
        out.extend(plausible.iter().filter_map(|t| resolve_synonym(t)).map(str::to_string));
    }

    out
}

/// Renders a sorted pairing as the `"A x B"` tag form (§4.6).
pub fn pairing_tag(participants: &BTreeSet<String>) -> String {
    participants.iter().cloned().collect::<Vec<_>>().join(" x ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certain_tags_are_synonym_mapped_but_always_kept() {
        let certain: BTreeSet<String> = ["Girls' Love".to_string()].into_iter().collect();
        let result = canonicalise_tags(Source::Danbooru, &certain, &BTreeSet::new());
        assert!(result.contains("Yuri"));
    }

    #[test]
    fn plausible_tags_require_eh_and_synonym_membership() {
        let plausible: BTreeSet<String> = ["Slice of Life".to_string(), "unrelated".to_string()].into_iter().collect();
        let eh_result = canonicalise_tags(Source::Eh, &BTreeSet::new(), &plausible);
        assert_eq!(eh_result.len(), 1);
        assert!(eh_result.contains("Slice of life"));

        let other_result = canonicalise_tags(Source::Danbooru, &BTreeSet::new(), &plausible);
        assert!(other_result.is_empty());
    }

    #[test]
    fn pairing_renders_as_sorted_x_joined_tag() {
        let participants: BTreeSet<String> =
            ["Kirisame Marisa".to_string(), "Hakurei Reimu".to_string()].into_iter().collect();
        assert_eq!(pairing_tag(&participants), "Hakurei Reimu x Kirisame Marisa");
    }
}
