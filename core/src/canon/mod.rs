//! Character, pairing, artist and tag canonicalisation (C6, §4.6).

pub mod artist;
pub mod character;
pub mod pairing;
pub mod tags;

pub use artist::normalize_artist;
pub use character::CharacterIndex;
pub use pairing::PairingIndex;
pub use tags::{canonicalise_tags, pairing_tag};

/// アリス → Alice Margatroid and similar untransliterated aliases the wiki
/// lookup would otherwise miss (§4.6).
pub const MANUAL_CHARACTER_SEEDS: &[(&str, &str)] = &[
    ("アリス", "Alice Margatroid"),
    ("リリ", "Lily White"),
    ("メディスン", "Medicine Melancholy"),
];

/// Multi-character abbreviations that resolve straight to a pairing label,
/// bypassing per-participant canonicalisation (§4.6).
pub const MANUAL_PAIRING_SEEDS: &[(&str, &str)] = &[
    ("マリアリ", "Alice Margatroid x Kirisame Marisa"),
    ("秘封倶楽部", "Maribel Hearn x Renko Usami"),
];
