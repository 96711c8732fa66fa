//! Sketchbook transcript: rows of played notes and chords

use serde::{Deserialize, Serialize};

pub type EntryId = u64;
pub type RowId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Note,
    Chord,
}

/// One played note (`"C#4"`) or chord (`"Am"`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: EntryId,
    pub content: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SketchbookRow {
    pub id: RowId,
    pub entries: Vec<TranscriptEntry>,
}

impl SketchbookRow {
    fn new(id: RowId) -> Self {
        Self { id, entries: Vec::new() }
    }
}

/// Ordered rows of transcript entries. New entries go to the last row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sketchbook {
    rows: Vec<SketchbookRow>,
    next_entry_id: EntryId,
    next_row_id: RowId,
    enabled: bool,
}

impl Sketchbook {
    pub fn new() -> Self {
        Self {
            rows: vec![SketchbookRow::new(0)],
            next_entry_id: 0,
            next_row_id: 1,
            enabled: true,
        }
    }

    pub fn rows(&self) -> &[SketchbookRow] {
        &self.rows
    }

    pub fn entry_count(&self) -> usize {
        self.rows.iter().map(|r| r.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Append an entry to the last row. Returns `None` while recording is off.
    pub fn record(&mut self, content: impl Into<String>, kind: EntryKind) -> Option<EntryId> {
        if !self.enabled {
            return None;
        }
        let row = self.rows.last_mut()?;
        let id = self.next_entry_id;
        self.next_entry_id += 1;
        row.entries.push(TranscriptEntry { id, content: content.into(), kind });
        Some(id)
    }

    pub fn add_row(&mut self) -> RowId {
        let id = self.next_row_id;
        self.next_row_id += 1;
        self.rows.push(SketchbookRow::new(id));
        id
    }

    /// Remove one entry; false if the row or entry does not exist
    pub fn clear_entry(&mut self, row_id: RowId, entry_id: EntryId) -> bool {
        let Some(row) = self.rows.iter_mut().find(|r| r.id == row_id) else {
            return false;
        };
        let before = row.entries.len();
        row.entries.retain(|e| e.id != entry_id);
        row.entries.len() != before
    }

    /// Back to a single empty row with fresh id counters
    pub fn clear_all(&mut self) {
        let enabled = self.enabled;
        *self = Self::new();
        self.enabled = enabled;
    }

    pub fn entry(&self, row_id: RowId, entry_id: EntryId) -> Option<&TranscriptEntry> {
        self.rows
            .iter()
            .find(|r| r.id == row_id)?
            .entries
            .iter()
            .find(|e| e.id == entry_id)
    }
}

impl Default for Sketchbook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_to_last_row() {
        let mut book = Sketchbook::new();
        book.record("C4", EntryKind::Note);
        let row = book.add_row();
        let id = book.record("Am", EntryKind::Chord).unwrap();

        assert_eq!(book.rows().len(), 2);
        assert_eq!(book.rows()[0].entries.len(), 1);
        assert_eq!(book.rows()[1].entries[0].content, "Am");
        assert_eq!(book.entry(row, id).unwrap().kind, EntryKind::Chord);
    }

    #[test]
    fn test_entry_ids_are_unique_across_rows() {
        let mut book = Sketchbook::new();
        let a = book.record("C4", EntryKind::Note).unwrap();
        book.add_row();
        let b = book.record("D4", EntryKind::Note).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_disabled_records_nothing() {
        let mut book = Sketchbook::new();
        book.set_enabled(false);
        assert_eq!(book.record("C4", EntryKind::Note), None);
        assert!(book.is_empty());
    }

    #[test]
    fn test_clear_entry() {
        let mut book = Sketchbook::new();
        let a = book.record("C4", EntryKind::Note).unwrap();
        let b = book.record("E4", EntryKind::Note).unwrap();

        assert!(book.clear_entry(0, a));
        assert!(!book.clear_entry(0, a));
        assert!(!book.clear_entry(7, b));
        assert_eq!(book.entry_count(), 1);
        assert_eq!(book.rows()[0].entries[0].id, b);
    }

    #[test]
    fn test_clear_all_resets_ids() {
        let mut book = Sketchbook::new();
        book.record("C4", EntryKind::Note);
        book.add_row();
        book.record("G", EntryKind::Chord);
        book.clear_all();

        assert_eq!(book.rows().len(), 1);
        assert!(book.is_empty());
        assert_eq!(book.record("D4", EntryKind::Note), Some(0));
        assert_eq!(book.add_row(), 1);
    }

    #[test]
    fn test_entry_kind_serializes_lowercase() {
        let json = serde_json::to_string(&EntryKind::Chord).unwrap();
        assert_eq!(json, "\"chord\"");
    }
}
