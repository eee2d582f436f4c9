//! Personalization state
//!
//! The customer's customisation of one recurring box: which standard items
//! they receive (and how many), add-ons, swaps and removals.

use crate::entry::{Entry, EntryKind, ListItem, ListKind};
use crate::produce_box::{DeliveryDate, ProduceBox};
use crate::product::ProductId;
use serde::{Deserialize, Serialize};

/// Personalization of one subscription or order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personalization {
    /// Delivery date the state was built for
    pub delivery_date: DeliveryDate,
    entries: Vec<Entry>,
}

impl Personalization {
    /// Create empty personalization
    #[inline]
    #[must_use]
    pub fn new(delivery_date: DeliveryDate) -> Self {
        Self {
            delivery_date,
            entries: Vec::new(),
        }
    }

    /// Create from entries, in the given order
    #[inline]
    #[must_use]
    pub fn from_entries(delivery_date: DeliveryDate, entries: Vec<Entry>) -> Self {
        Self {
            delivery_date,
            entries,
        }
    }

    /// Uncustomised personalization: every standard item, one unit each
    #[must_use]
    pub fn from_box(produce_box: &ProduceBox) -> Self {
        let entries = produce_box
            .included_products
            .iter()
            .map(|p| Entry::new(EntryKind::Standard, p.title.clone(), 1).with_product(p.id))
            .collect();
        Self::from_entries(produce_box.delivery_date, entries)
    }

    /// All entries
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Mutable entries
    #[inline]
    pub fn entries_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.entries
    }

    /// Consume into entries
    #[inline]
    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Entries of one kind, in order
    pub fn of_kind(&self, kind: EntryKind) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Entries persisted in one wire list, in order
    pub fn list(&self, list: ListKind) -> impl Iterator<Item = &Entry> {
        self.of_kind(list.entry_kind())
    }

    /// Number of entries in one wire list
    #[must_use]
    pub fn count(&self, list: ListKind) -> usize {
        self.list(list).count()
    }

    /// Titles in one wire list
    #[must_use]
    pub fn titles(&self, list: ListKind) -> Vec<&str> {
        self.list(list).map(|e| e.title.as_str()).collect()
    }

    /// Wire items of one list
    #[must_use]
    pub fn list_items(&self, list: ListKind) -> Vec<ListItem> {
        self.list(list).map(Entry::to_list_item).collect()
    }

    /// Find entry of a kind referring to a product
    #[must_use]
    pub fn find(&self, kind: EntryKind, id: Option<ProductId>, title: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.kind == kind && e.refers_to(id, title))
    }

    /// Find entry of a kind referring to a product, mutably
    pub fn find_mut(
        &mut self,
        kind: EntryKind,
        id: Option<ProductId>,
        title: &str,
    ) -> Option<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|e| e.kind == kind && e.refers_to(id, title))
    }

    /// Append entry
    #[inline]
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Remove first entry of a kind referring to a product
    pub fn remove(&mut self, kind: EntryKind, id: Option<ProductId>, title: &str) -> Option<Entry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.kind == kind && e.refers_to(id, title))?;
        Some(self.entries.remove(index))
    }

    /// Set the quantity of an entry, inserting or dropping as needed
    ///
    /// A zero quantity drops the entry.
    pub fn set_quantity(&mut self, kind: EntryKind, id: Option<ProductId>, title: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(kind, id, title);
            return;
        }
        match self.find_mut(kind, id, title) {
            Some(entry) => entry.quantity = quantity,
            None => {
                let mut entry = Entry::new(kind, title, quantity);
                entry.product_id = id;
                self.push(entry);
            }
        }
    }

    /// Stable-sort entries into canonical list order
    pub fn canonicalize(&mut self) {
        self.entries.sort_by_key(|e| e.kind);
    }

    /// Whether the state has no entries at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;

    fn date() -> DeliveryDate {
        DeliveryDate::from_ymd(2024, 2, 20).unwrap()
    }

    #[test]
    fn from_box_includes_every_standard_item_once() {
        let produce_box = ProduceBox::new(1, "Box", date()).with_included(vec![
            Product::new(10, "Carrots 1kg", 400, "veg"),
            Product::new(11, "Curly Kale", 350, "greens"),
        ]);
        let state = Personalization::from_box(&produce_box);

        assert_eq!(state.titles(ListKind::Including), vec!["Carrots 1kg", "Curly Kale"]);
        assert!(state.list(ListKind::Including).all(|e| e.quantity == 1));
        assert_eq!(state.count(ListKind::AddOnItems), 0);
    }

    #[test]
    fn set_quantity_inserts_updates_and_drops() {
        let mut state = Personalization::new(date());
        state.set_quantity(EntryKind::Addon, None, "Cabbage Green", 2);
        assert_eq!(state.find(EntryKind::Addon, None, "Cabbage Green").unwrap().quantity, 2);

        state.set_quantity(EntryKind::Addon, None, "Cabbage Green", 3);
        assert_eq!(state.count(ListKind::AddOnItems), 1);
        assert_eq!(state.find(EntryKind::Addon, None, "Cabbage Green").unwrap().quantity, 3);

        state.set_quantity(EntryKind::Addon, None, "Cabbage Green", 0);
        assert!(state.is_empty());
    }

    #[test]
    fn canonicalize_orders_by_kind_stably() {
        let mut state = Personalization::from_entries(
            date(),
            vec![
                Entry::new(EntryKind::Removed, "Beetroot 1kg", 1),
                Entry::new(EntryKind::Addon, "Bread", 1),
                Entry::new(EntryKind::Standard, "Carrots 1kg", 1),
                Entry::new(EntryKind::Addon, "Apples", 1),
            ],
        );
        state.canonicalize();
        let titles: Vec<_> = state.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Carrots 1kg", "Bread", "Apples", "Beetroot 1kg"]);
    }
}
