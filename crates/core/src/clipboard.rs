//! Annotation clipboard.
//!
//! Single-slot holder for one copied annotation. Paste is non-consuming: the
//! UI may paste the same snapshot repeatedly until a new copy overwrites the
//! slot or it is cleared.

use crate::ids::IdGenerator;
use doc_model::Annotation;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct ClipboardSlot {
    slot: Mutex<Option<Annotation>>,
}

impl ClipboardSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a snapshot of the annotation under a freshly minted id, so a
    /// copy/paste/copy cycle never aliases the original's identity. Returns
    /// the stored snapshot.
    pub fn copy(&self, annotation: &Annotation, ids: &IdGenerator) -> Annotation {
        let mut snapshot = annotation.clone();
        snapshot.id = ids.next("ann");
        *self.slot.lock().unwrap() = Some(snapshot.clone());
        snapshot
    }

    /// Returns the held snapshot without clearing the slot.
    pub fn paste(&self) -> Option<Annotation> {
        self.slot.lock().unwrap().clone()
    }

    pub fn has_content(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }

    pub fn clear(&self) {
        *self.slot.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::annotation_on_page;

    #[test]
    fn empty_slot_pastes_nothing() {
        let clipboard = ClipboardSlot::new();
        assert!(!clipboard.has_content());
        assert!(clipboard.paste().is_none());
    }

    #[test]
    fn copy_mints_a_fresh_id() {
        let clipboard = ClipboardSlot::new();
        let ids = IdGenerator::new();
        let original = annotation_on_page("ann-1", 2);

        let stored = clipboard.copy(&original, &ids);

        assert_ne!(stored.id, original.id);
        assert_eq!(stored.content, original.content);
    }

    #[test]
    fn paste_twice_returns_identical_content() {
        let clipboard = ClipboardSlot::new();
        let ids = IdGenerator::new();
        clipboard.copy(&annotation_on_page("ann-1", 2), &ids);

        let first = clipboard.paste().unwrap();
        let second = clipboard.paste().unwrap();

        assert_eq!(first, second);
        assert!(clipboard.has_content());
    }

    #[test]
    fn a_later_copy_overwrites_the_slot() {
        let clipboard = ClipboardSlot::new();
        let ids = IdGenerator::new();

        clipboard.copy(&annotation_on_page("ann-1", 2), &ids);
        let mut other = annotation_on_page("ann-2", 5);
        other.content = "second".to_owned();
        clipboard.copy(&other, &ids);

        let pasted = clipboard.paste().unwrap();
        assert_eq!(pasted.content, "second");
        assert_eq!(pasted.page_number, 5);
    }

    #[test]
    fn clear_empties_the_slot() {
        let clipboard = ClipboardSlot::new();
        let ids = IdGenerator::new();
        clipboard.copy(&annotation_on_page("ann-1", 2), &ids);

        clipboard.clear();

        assert!(!clipboard.has_content());
        assert!(clipboard.paste().is_none());
    }
}
