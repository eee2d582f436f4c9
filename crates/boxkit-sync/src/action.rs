//! Required actions and their resolutions

use boxkit_model::{ListKind, Personalization, ProductId, RecordId};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Unique action identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionId(pub Ulid);

impl ActionId {
    /// Generate new action ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of drift between personalization and billing
///
/// Declaration order is queue priority: unreal data first, then billing
/// shortfalls, then billing excess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Personalization entry matches no catalog product
    OrphanedItem,
    /// Billed product is not in the box at all
    SubscribedNotAvailable,
    /// Billed product is in the box but not chosen as an extra
    SubscribedNotIncluded,
    /// Chosen extra is not billed
    UnsubscribedExtra,
    /// Chosen and billed, with different quantities
    QuantityMismatch,
}

impl ActionKind {
    /// Resolutions an operator may pick
    #[must_use]
    pub fn options(self) -> Vec<Resolution> {
        use Resolution::{
            AddToPersonalization, AdjustPersonalization, CreateBilling, DeleteBilling,
            RemoveFromPersonalization, Skip, UpdateBillingQuantity,
        };
        match self {
            Self::OrphanedItem => vec![RemoveFromPersonalization, Skip],
            Self::SubscribedNotAvailable => vec![DeleteBilling, Skip],
            Self::SubscribedNotIncluded => vec![DeleteBilling, AddToPersonalization, Skip],
            Self::UnsubscribedExtra => vec![CreateBilling, RemoveFromPersonalization, Skip],
            Self::QuantityMismatch => vec![UpdateBillingQuantity, AdjustPersonalization, Skip],
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OrphanedItem => "orphaned item",
            Self::SubscribedNotAvailable => "subscribed, not available",
            Self::SubscribedNotIncluded => "subscribed, not included",
            Self::UnsubscribedExtra => "unsubscribed extra",
            Self::QuantityMismatch => "quantity mismatch",
        };
        f.write_str(name)
    }
}

/// Operator decision for a required action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Start billing the expected quantity
    CreateBilling,
    /// Bill the expected quantity instead
    UpdateBillingQuantity,
    /// Stop billing
    DeleteBilling,
    /// Drop the item, or its extra units, from the personalization
    RemoveFromPersonalization,
    /// Add the billed units to the personalization
    AddToPersonalization,
    /// Make the personalization match the billed quantity
    AdjustPersonalization,
    /// Leave both sides unchanged
    Skip,
}

impl Resolution {
    /// Whether this resolution writes to the billing store
    #[inline]
    #[must_use]
    pub fn touches_billing(self) -> bool {
        matches!(self, Self::CreateBilling | Self::UpdateBillingQuantity | Self::DeleteBilling)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateBilling => "create_billing",
            Self::UpdateBillingQuantity => "update_billing_quantity",
            Self::DeleteBilling => "delete_billing",
            Self::RemoveFromPersonalization => "remove_from_personalization",
            Self::AddToPersonalization => "add_to_personalization",
            Self::AdjustPersonalization => "adjust_personalization",
            Self::Skip => "skip",
        };
        f.write_str(name)
    }
}

/// One product affected by an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    /// Product title
    pub title: String,
    /// Catalog product, when resolved
    pub product_id: Option<ProductId>,
    /// Extra units implied by the personalization
    pub expected: u32,
    /// Units currently billed
    pub billed: u32,
    /// Billing record, when one exists
    pub record: Option<RecordId>,
    /// Personalization list the units live in, or should go to
    pub list: Option<ListKind>,
}

impl ActionItem {
    /// Create item for a product title
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            product_id: None,
            expected: 0,
            billed: 0,
            record: None,
            list: None,
        }
    }

    /// With catalog product
    #[inline]
    #[must_use]
    pub fn with_product(mut self, id: ProductId) -> Self {
        self.product_id = Some(id);
        self
    }

    /// With expected extra units
    #[inline]
    #[must_use]
    pub fn with_expected(mut self, expected: u32) -> Self {
        self.expected = expected;
        self
    }

    /// With billed units and their record
    #[inline]
    #[must_use]
    pub fn with_billing(mut self, record: RecordId, billed: u32) -> Self {
        self.record = Some(record);
        self.billed = billed;
        self
    }

    /// With personalization list
    #[inline]
    #[must_use]
    pub fn with_list(mut self, list: ListKind) -> Self {
        self.list = Some(list);
        self
    }

    /// Whether `state` has somewhere to put extra units of this product
    ///
    /// Add-ons are created on demand. Standard and swapped-in products need
    /// their entry to exist already.
    #[must_use]
    pub fn can_carry_units_in(&self, state: &Personalization) -> bool {
        match self.list {
            Some(ListKind::AddOnItems) => true,
            Some(list @ (ListKind::Including | ListKind::SwappedItems)) => {
                state.find(list.entry_kind(), self.product_id, &self.title).is_some()
            }
            Some(ListKind::RemovedItems) | None => false,
        }
    }
}

/// A drift an operator must resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredAction {
    /// Action identity
    pub id: ActionId,
    /// Drift kind
    pub kind: ActionKind,
    /// Affected products
    pub items: Vec<ActionItem>,
    /// Resolutions on offer
    pub options: Vec<Resolution>,
}

impl RequiredAction {
    /// Create action with the default options for its kind
    #[must_use]
    pub fn new(kind: ActionKind, items: Vec<ActionItem>) -> Self {
        Self {
            id: ActionId::new(),
            kind,
            items,
            options: kind.options(),
        }
    }

    /// Whether a resolution is on offer
    #[inline]
    #[must_use]
    pub fn offers(&self, resolution: Resolution) -> bool {
        self.options.contains(&resolution)
    }

    /// Withdraw a resolution from the options
    #[must_use]
    pub fn without_option(mut self, resolution: Resolution) -> Self {
        self.options.retain(|r| *r != resolution);
        self
    }
}
