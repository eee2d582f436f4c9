//! Automatic corrections made during reconciliation
//!
//! Every change the engine makes to a personalization is recorded as an
//! [`Adjustment`]; its `Display` form is the customer-facing message.

use boxkit_model::ListKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One automatic correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    /// Repeated title in one list folded into a single entry
    DuplicateMerged {
        /// List holding the repeats
        list: ListKind,
        /// Product title
        title: String,
    },
    /// Removal beyond the configured limit restored
    RemovalLimitExceeded {
        /// Restored item
        title: String,
        /// Configured removal limit
        limit: usize,
    },
    /// Item both included and removed; the removal wins
    ConflictingRemoval {
        /// Removed item
        title: String,
    },
    /// Catalog now lists the product under a different title
    Renamed {
        /// Title as stored
        from: String,
        /// Title in the catalog
        to: String,
    },
    /// Product left the catalog
    Unavailable {
        /// List the entry was in
        list: ListKind,
        /// Dropped product
        title: String,
    },
    /// Swapped-in product left the catalog
    SwappedUnavailable {
        /// Dropped product
        title: String,
        /// Extra units that were being billed
        billed_extra: u32,
    },
    /// Standard item is now only offered as an add-on
    MovedToAddOns {
        /// Moved product
        title: String,
        /// Units carried into add-ons
        quantity: u32,
    },
    /// Add-on is now a standard item
    AddOnNowIncluded {
        /// Product title
        title: String,
        /// Units kept beyond the included one
        extra: u32,
    },
    /// Swapped-in product is now a standard item
    SwapNowIncluded {
        /// Product title
        title: String,
        /// Units kept beyond the included one
        extra: u32,
    },
    /// Removed item left the catalog
    RemovalUnavailable {
        /// Dropped removal
        title: String,
    },
    /// Removed item is now an add-on, so it is no longer removed
    RemovalNowAddOn {
        /// Dropped removal
        title: String,
    },
    /// Swap without a matching removal undone
    ExcessSwapRemoved {
        /// Swapped-in product
        title: String,
        /// Units left in add-ons
        kept_as_addon: u32,
    },
    /// Replacement found for a removal without a swap
    SwapAssigned {
        /// Chosen replacement
        swapped_in: String,
        /// Removed item it replaces
        removed: String,
    },
    /// No replacement for a removal; the item is back in the box
    SwapUnavailable {
        /// Restored item
        removed: String,
    },
    /// Extra units for a removed standard item discarded
    ExtraOnRemovedDropped {
        /// Removed item
        title: String,
        /// Discarded units
        quantity: u32,
    },
    /// Standard item new to this customer
    NewStandardItem {
        /// New item
        title: String,
    },
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::DuplicateMerged { list, title } => {
                write!(f, "Combined repeated {title} entries in {list}")
            }
            Adjustment::RemovalLimitExceeded { title, limit } => write!(
                f,
                "{title} has been restored to your box; at most {limit} items can be removed"
            ),
            Adjustment::ConflictingRemoval { title } => {
                write!(f, "{title} is marked as removed and will not be delivered")
            }
            Adjustment::Renamed { from, to } => write!(f, "{from} is now listed as {to}"),
            Adjustment::Unavailable { list, title } => write!(
                f,
                "{title} is no longer available and has been removed from {list}"
            ),
            Adjustment::SwappedUnavailable { title, billed_extra } => {
                write!(f, "Your swapped item {title} is no longer available")?;
                if *billed_extra > 0 {
                    write!(f, "; {billed_extra} extra unit(s) will no longer be charged")?;
                }
                Ok(())
            }
            Adjustment::MovedToAddOns { title, quantity } => write!(
                f,
                "{title} is no longer a standard item; {quantity} moved to your add-ons"
            ),
            Adjustment::AddOnNowIncluded { title, extra } => {
                write!(f, "Your add-on {title} is now included in your box")?;
                if *extra > 0 {
                    write!(f, "; {extra} extra unit(s) kept")?;
                }
                Ok(())
            }
            Adjustment::SwapNowIncluded { title, extra } => {
                write!(f, "Your swapped item {title} is now included in your box")?;
                if *extra > 0 {
                    write!(f, "; {extra} extra unit(s) kept")?;
                }
                Ok(())
            }
            Adjustment::RemovalUnavailable { title } => write!(
                f,
                "Your removed item {title} is no longer in the box"
            ),
            Adjustment::RemovalNowAddOn { title } => write!(
                f,
                "Your removed item {title} is now an add-on and is no longer removed"
            ),
            Adjustment::ExcessSwapRemoved {
                title,
                kept_as_addon,
            } => {
                write!(f, "Your swapped item {title} no longer replaces a removed item")?;
                if *kept_as_addon > 0 {
                    write!(f, "; {kept_as_addon} unit(s) kept as add-ons")?;
                }
                Ok(())
            }
            Adjustment::SwapAssigned {
                swapped_in,
                removed,
            } => write!(f, "Swapped {swapped_in} for your removed item {removed}"),
            Adjustment::SwapUnavailable { removed } => write!(
                f,
                "No swap available for your removed item {removed}; it has been restored to your box"
            ),
            Adjustment::ExtraOnRemovedDropped { title, quantity } => write!(
                f,
                "{quantity} extra unit(s) of removed item {title} dropped"
            ),
            Adjustment::NewStandardItem { title } => {
                write!(f, "{title} has been added to your box")
            }
        }
    }
}
