//! Pairing index (C6): maps canonicalised participant names back to the raw
//! pairing they were observed in (§4.6).

use std::collections::{BTreeMap, BTreeSet};

use super::character::CharacterIndex;

#[derive(Debug, Default)]
pub struct PairingIndex {
    by_participant: BTreeMap<String, BTreeSet<String>>,
}

fn pairing_label(participants: &BTreeSet<String>) -> String {
    participants.iter().cloned().collect::<Vec<_>>().join(" x ")
}

impl PairingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every Dynasty-Scans pairing (a set of raw participant names)
    /// under each participant's canonicalised name, then applies manual
    /// seeds (specific multi-character abbreviations) last (§4.6).
    pub fn build(
        character_index: &CharacterIndex,
        raw_pairings: impl IntoIterator<Item = BTreeSet<String>>,
        manual_seeds: &[(&str, &str)],
    ) -> Self {
        let mut index = Self::new();

        for pairing in raw_pairings {
            let canonical: BTreeSet<String> = pairing
                .iter()
                .map(|p| character_index.canonicalise(p))
                .collect();
            let label = pairing_label(&canonical);
            for participant in &canonical {
                index
                    .by_participant
                    .entry(participant.clone())
                    .or_default()
                    .insert(label.clone());
            }
        }

        for &(abbreviation, label) in manual_seeds {
            index
                .by_participant
                .entry(abbreviation.to_string())
                .or_default()
                .insert(label.to_string());
        }

        index
    }

    /// All raw pairing labels a canonicalised participant name appears in.
    pub fn pairings_for(&self, canonical_participant: &str) -> BTreeSet<String> {
        self.by_participant
            .get(canonical_participant)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::character::CharacterObservation;

    fn make_character_index() -> CharacterIndex {
        CharacterIndex::build(
            vec![
                CharacterObservation {
                    raw_name: "hakurei_reimu".to_string(),
                    count: 500,
                    other_names: vec![],
                },
                CharacterObservation {
                    raw_name: "kirisame_marisa".to_string(),
                    count: 500,
                    other_names: vec![],
                },
            ],
            20,
            &[],
        )
    }

    #[test]
    fn indexes_a_pairing_under_both_participants() {
        let characters = make_character_index();
        let pairing: BTreeSet<String> =
            ["Hakurei Reimu".to_string(), "Kirisame Marisa".to_string()].into_iter().collect();
        let index = PairingIndex::build(&characters, vec![pairing], &[]);
        assert_eq!(
            index.pairings_for("Hakurei Reimu"),
            ["Hakurei Reimu x Kirisame Marisa".to_string()].into_iter().collect()
        );
        assert_eq!(
            index.pairings_for("Kirisame Marisa"),
            ["Hakurei Reimu x Kirisame Marisa".to_string()].into_iter().collect()
        );
    }

    #[test]
    fn manual_seed_is_queryable() {
        let characters = make_character_index();
        let index = PairingIndex::build(&characters, vec![], &[("ReiMari", "Hakurei Reimu x Kirisame Marisa")]);
        assert!(index.pairings_for("ReiMari").contains("Hakurei Reimu x Kirisame Marisa"));
    }

    #[test]
    fn unknown_participant_has_no_pairings() {
        let index = PairingIndex::new();
        assert!(index.pairings_for("Nobody").is_empty());
    }
}
