use crate::entry::{Entry, EntryFields};

/// A mutable ordered group of entries judged to depict the same underlying
/// work. The first entry is the canonical representative.
#[derive(Debug, Default)]
pub struct EntryList {
    pub entries: Vec<Entry>,
}

impl EntryList {
    pub fn new(entry: Entry) -> Self {
        EntryList {
            entries: vec![entry],
        }
    }

    /// The canonical representative: the first entry attached.
    pub fn canonical(&self) -> &Entry {
        &self.entries[0]
    }

    /// True if any entry in the list came from the gallery source.
    pub fn has_gallery_entry(&self) -> bool {
        use crate::entry::Source;
        self.entries.iter().any(|e| e.source() == Source::Eh)
    }
}
