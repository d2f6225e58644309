//! Tab registry.
//!
//! Ordered list of tabs, each referencing exactly one document by id.
//! `order` values stay a dense `0..n-1` permutation: every removal and
//! reorder renumbers the survivors, since consumers render tabs by `order`.

use crate::error::{SessionError, SessionResult};
use crate::ids::IdGenerator;
use doc_model::Tab;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct TabRegistry {
    tabs: Mutex<Vec<Tab>>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tab bound to `document_id` at the end of the strip.
    pub fn add_tab(&self, ids: &IdGenerator, document_id: &str, name: &str) -> Tab {
        let mut tabs = self.tabs.lock().unwrap();
        let tab = Tab {
            id: ids.next("tab"),
            document_id: document_id.to_owned(),
            name: name.to_owned(),
            is_modified: false,
            order: tabs.len() as u32,
        };
        tabs.push(tab.clone());
        tab
    }

    pub fn remove_tab(&self, id: &str) -> SessionResult<Tab> {
        let mut tabs = self.tabs.lock().unwrap();
        let index = tabs
            .iter()
            .position(|tab| tab.id == id)
            .ok_or_else(|| SessionError::TabNotFound { id: id.to_owned() })?;
        let removed = tabs.remove(index);
        renumber(&mut tabs);
        Ok(removed)
    }

    /// Drops every tab bound to `document_id`. Invariant hook for document
    /// removal: a tab must never outlive its document.
    pub fn remove_tabs_for_document(&self, document_id: &str) -> Vec<Tab> {
        let mut tabs = self.tabs.lock().unwrap();
        let mut removed = Vec::new();
        tabs.retain(|tab| {
            if tab.document_id == document_id {
                removed.push(tab.clone());
                false
            } else {
                true
            }
        });
        renumber(&mut tabs);
        removed
    }

    /// Linear scan; tab counts are tens, not thousands.
    pub fn tab_for_document(&self, document_id: &str) -> Option<Tab> {
        self.tabs.lock().unwrap().iter().find(|tab| tab.document_id == document_id).cloned()
    }

    pub fn tab(&self, id: &str) -> SessionResult<Tab> {
        self.tabs
            .lock()
            .unwrap()
            .iter()
            .find(|tab| tab.id == id)
            .cloned()
            .ok_or_else(|| SessionError::TabNotFound { id: id.to_owned() })
    }

    /// Moves a tab to `new_index` (clamped to the strip) and renumbers.
    pub fn reorder_tab(&self, id: &str, new_index: usize) -> SessionResult<()> {
        let mut tabs = self.tabs.lock().unwrap();
        let index = tabs
            .iter()
            .position(|tab| tab.id == id)
            .ok_or_else(|| SessionError::TabNotFound { id: id.to_owned() })?;
        let tab = tabs.remove(index);
        let target = new_index.min(tabs.len());
        tabs.insert(target, tab);
        renumber(&mut tabs);
        Ok(())
    }

    pub fn set_modified(&self, id: &str, is_modified: bool) -> SessionResult<()> {
        let mut tabs = self.tabs.lock().unwrap();
        let tab = tabs
            .iter_mut()
            .find(|tab| tab.id == id)
            .ok_or_else(|| SessionError::TabNotFound { id: id.to_owned() })?;
        tab.is_modified = is_modified;
        Ok(())
    }

    /// Snapshot in display order.
    pub fn tabs(&self) -> Vec<Tab> {
        self.tabs.lock().unwrap().clone()
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.lock().unwrap().len()
    }
}

fn renumber(tabs: &mut [Tab]) {
    for (index, tab) in tabs.iter_mut().enumerate() {
        tab.order = index as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders(registry: &TabRegistry) -> Vec<u32> {
        registry.tabs().iter().map(|tab| tab.order).collect()
    }

    #[test]
    fn added_tabs_get_dense_increasing_orders() {
        let ids = IdGenerator::new();
        let registry = TabRegistry::new();

        registry.add_tab(&ids, "doc-1", "a.pdf");
        registry.add_tab(&ids, "doc-2", "b.pdf");
        registry.add_tab(&ids, "doc-3", "c.pdf");

        assert_eq!(orders(&registry), vec![0, 1, 2]);
    }

    #[test]
    fn removal_closes_the_gap() {
        let ids = IdGenerator::new();
        let registry = TabRegistry::new();

        registry.add_tab(&ids, "doc-1", "a.pdf");
        let middle = registry.add_tab(&ids, "doc-2", "b.pdf");
        registry.add_tab(&ids, "doc-3", "c.pdf");

        registry.remove_tab(&middle.id).unwrap();

        assert_eq!(orders(&registry), vec![0, 1]);
        let names: Vec<String> = registry.tabs().iter().map(|tab| tab.name.clone()).collect();
        assert_eq!(names, vec!["a.pdf", "c.pdf"]);
    }

    #[test]
    fn arbitrary_removal_sequences_stay_dense() {
        let ids = IdGenerator::new();
        let registry = TabRegistry::new();
        let tabs: Vec<Tab> =
            (0..6).map(|i| registry.add_tab(&ids, &format!("doc-{i}"), "t")).collect();

        registry.remove_tab(&tabs[4].id).unwrap();
        registry.remove_tab(&tabs[0].id).unwrap();
        registry.remove_tab(&tabs[2].id).unwrap();

        assert_eq!(orders(&registry), vec![0, 1, 2]);
    }

    #[test]
    fn removing_an_unknown_tab_fails() {
        let registry = TabRegistry::new();
        let err = registry.remove_tab("tab-nope").unwrap_err();
        assert!(matches!(err, SessionError::TabNotFound { .. }));
    }

    #[test]
    fn remove_tabs_for_document_takes_every_binding() {
        let ids = IdGenerator::new();
        let registry = TabRegistry::new();

        registry.add_tab(&ids, "doc-1", "a.pdf");
        registry.add_tab(&ids, "doc-2", "b.pdf");
        registry.add_tab(&ids, "doc-1", "a.pdf (2)");

        let removed = registry.remove_tabs_for_document("doc-1");

        assert_eq!(removed.len(), 2);
        assert_eq!(registry.tab_count(), 1);
        assert_eq!(orders(&registry), vec![0]);
    }

    #[test]
    fn lookup_by_document_is_supported() {
        let ids = IdGenerator::new();
        let registry = TabRegistry::new();
        let tab = registry.add_tab(&ids, "doc-2", "b.pdf");

        assert_eq!(registry.tab_for_document("doc-2").unwrap().id, tab.id);
        assert!(registry.tab_for_document("doc-9").is_none());
    }

    #[test]
    fn reorder_moves_and_renumbers() {
        let ids = IdGenerator::new();
        let registry = TabRegistry::new();

        let a = registry.add_tab(&ids, "doc-1", "a.pdf");
        registry.add_tab(&ids, "doc-2", "b.pdf");
        registry.add_tab(&ids, "doc-3", "c.pdf");

        registry.reorder_tab(&a.id, 2).unwrap();

        let names: Vec<String> = registry.tabs().iter().map(|tab| tab.name.clone()).collect();
        assert_eq!(names, vec!["b.pdf", "c.pdf", "a.pdf"]);
        assert_eq!(orders(&registry), vec![0, 1, 2]);
    }

    #[test]
    fn reorder_index_is_clamped() {
        let ids = IdGenerator::new();
        let registry = TabRegistry::new();

        let a = registry.add_tab(&ids, "doc-1", "a.pdf");
        registry.add_tab(&ids, "doc-2", "b.pdf");

        registry.reorder_tab(&a.id, 99).unwrap();

        let names: Vec<String> = registry.tabs().iter().map(|tab| tab.name.clone()).collect();
        assert_eq!(names, vec!["b.pdf", "a.pdf"]);
    }

    #[test]
    fn modified_flag_round_trips() {
        let ids = IdGenerator::new();
        let registry = TabRegistry::new();
        let tab = registry.add_tab(&ids, "doc-1", "a.pdf");

        assert!(!registry.tab(&tab.id).unwrap().is_modified);
        registry.set_modified(&tab.id, true).unwrap();
        assert!(registry.tab(&tab.id).unwrap().is_modified);
    }
}
