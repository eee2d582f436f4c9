//! Personalization entries
//!
//! The wire format stores four parallel lists. Internally every line is an
//! [`Entry`] tagged with an [`EntryKind`], so per-kind rules can be matched
//! exhaustively.

use crate::product::ProductId;
use serde::{Deserialize, Serialize};

/// The four wire lists of a personalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ListKind {
    /// Standard items the customer receives
    Including,
    /// Extra products bought on top of the box
    AddOnItems,
    /// Add-ons swapped in for removed standard items
    SwappedItems,
    /// Standard items the customer removed
    RemovedItems,
}

impl ListKind {
    /// All lists in wire order
    pub const ALL: [ListKind; 4] = [
        ListKind::Including,
        ListKind::AddOnItems,
        ListKind::SwappedItems,
        ListKind::RemovedItems,
    ];

    /// Property name in the wire bag
    #[inline]
    #[must_use]
    pub fn property_name(self) -> &'static str {
        match self {
            ListKind::Including => "Including",
            ListKind::AddOnItems => "Add on Items",
            ListKind::SwappedItems => "Swapped Items",
            ListKind::RemovedItems => "Removed Items",
        }
    }

    /// Entry kind stored in this list
    #[inline]
    #[must_use]
    pub fn entry_kind(self) -> EntryKind {
        match self {
            ListKind::Including => EntryKind::Standard,
            ListKind::AddOnItems => EntryKind::Addon,
            ListKind::SwappedItems => EntryKind::SwappedIn,
            ListKind::RemovedItems => EntryKind::Removed,
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.property_name())
    }
}

/// Kind of a personalization entry
///
/// Declaration order is the canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Standard item; quantity is total units (default unit plus extras)
    Standard,
    /// Extra units of a standard item carried until Including is rebuilt
    ExtraIncluded,
    /// Add-on product; every unit is billed
    Addon,
    /// Add-on swapped in for a removal; units past the first are billed
    SwappedIn,
    /// Removed standard item; always a single unit
    Removed,
}

impl EntryKind {
    /// Wire list this kind is persisted in
    ///
    /// `ExtraIncluded` is transient and has no list of its own.
    #[inline]
    #[must_use]
    pub fn list(self) -> Option<ListKind> {
        match self {
            EntryKind::Standard => Some(ListKind::Including),
            EntryKind::ExtraIncluded => None,
            EntryKind::Addon => Some(ListKind::AddOnItems),
            EntryKind::SwappedIn => Some(ListKind::SwappedItems),
            EntryKind::Removed => Some(ListKind::RemovedItems),
        }
    }
}

/// Title and quantity as written in a wire list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListItem {
    /// Product title
    pub title: String,
    /// Units; meaning depends on the list
    pub quantity: u32,
}

impl ListItem {
    /// Create list item
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, quantity: u32) -> Self {
        Self {
            title: title.into(),
            quantity,
        }
    }

    /// Single-unit item
    #[inline]
    #[must_use]
    pub fn single(title: impl Into<String>) -> Self {
        Self::new(title, 1)
    }
}

/// One tagged line of a personalization
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Entry kind
    pub kind: EntryKind,
    /// Product title
    pub title: String,
    /// Catalog id, once resolved against a box
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    /// Units, never zero in a reconciled state
    pub quantity: u32,
}

impl Entry {
    /// Create entry without a resolved product id
    #[inline]
    #[must_use]
    pub fn new(kind: EntryKind, title: impl Into<String>, quantity: u32) -> Self {
        Self {
            kind,
            title: title.into(),
            product_id: None,
            quantity,
        }
    }

    /// With resolved product id
    #[inline]
    #[must_use]
    pub fn with_product(mut self, id: ProductId) -> Self {
        self.product_id = Some(id);
        self
    }

    /// Units beyond what the box price covers
    ///
    /// These are the units a billing record must charge for.
    #[inline]
    #[must_use]
    pub fn extra_units(&self) -> u32 {
        match self.kind {
            EntryKind::Standard | EntryKind::SwappedIn => self.quantity.saturating_sub(1),
            EntryKind::ExtraIncluded | EntryKind::Addon => self.quantity,
            EntryKind::Removed => 0,
        }
    }

    /// Whether this entry refers to the given product
    ///
    /// Ids win when both sides carry one; otherwise titles must match.
    #[must_use]
    pub fn refers_to(&self, id: Option<ProductId>, title: &str) -> bool {
        match (self.product_id, id) {
            (Some(a), Some(b)) => a == b,
            _ => self.title == title,
        }
    }

    /// Wire representation
    #[inline]
    #[must_use]
    pub fn to_list_item(&self) -> ListItem {
        ListItem::new(self.title.clone(), self.quantity)
    }
}
