//! Billing drift classification
//!
//! Compares the extra units a reconciled personalization implies with the
//! units actually billed, and queues one [`RequiredAction`] per kind of drift.
//! Nothing is corrected here; every mismatch goes to an operator.
//!
//! Products are joined by catalog id, falling back to exact title for records
//! or entries that carry none.

use crate::action::{ActionItem, ActionKind, RequiredAction, Resolution};
use boxkit_model::{BillingRecord, ListKind, Personalization, ProduceBox, ProductId};
use boxkit_reconcile::{Availability, CatalogMatcher, ReconciledState};
use indexmap::map::Entry as MapEntry;
use indexmap::IndexMap;

/// Classifier bound to one catalog snapshot
#[derive(Debug, Clone, Copy)]
pub struct SyncClassifier<'a> {
    matcher: CatalogMatcher<'a>,
}

impl<'a> SyncClassifier<'a> {
    /// Create classifier for a box
    #[inline]
    #[must_use]
    pub fn new(produce_box: &'a ProduceBox) -> Self {
        Self {
            matcher: CatalogMatcher::new(produce_box, 0),
        }
    }

    /// Queue the drift between a reconciled state and its billing records
    #[must_use]
    pub fn classify(&self, reconciled: &ReconciledState, records: &[BillingRecord]) -> Vec<RequiredAction> {
        self.classify_state(&reconciled.state, records)
    }

    /// Queue the drift between any personalization and its billing records
    ///
    /// Actions come out in fixed priority order: orphaned items, billed
    /// products missing from the box, billed products not chosen, unbilled
    /// extras, then quantity mismatches.
    #[must_use]
    pub fn classify_state(&self, state: &Personalization, records: &[BillingRecord]) -> Vec<RequiredAction> {
        let (orphaned, expected) = self.expected_extras(state);
        let (not_available, subscribed) = self.subscribed_extras(records);

        let mut not_included = Vec::new();
        let mut mismatched = Vec::new();
        for (id, billed) in &subscribed {
            match expected.get(id) {
                None => not_included.push(billed.clone()),
                Some(wanted) if wanted.expected != billed.billed => mismatched.push(ActionItem {
                    expected: wanted.expected,
                    list: wanted.list,
                    ..billed.clone()
                }),
                Some(_) => {}
            }
        }
        let unsubscribed: Vec<ActionItem> = expected
            .iter()
            .filter(|(id, _)| !subscribed.contains_key(*id))
            .map(|(_, item)| item.clone())
            .collect();

        let queue: Vec<RequiredAction> = [
            (ActionKind::OrphanedItem, orphaned),
            (ActionKind::SubscribedNotAvailable, not_available),
            (ActionKind::SubscribedNotIncluded, not_included),
            (ActionKind::UnsubscribedExtra, unsubscribed),
            (ActionKind::QuantityMismatch, mismatched),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(kind, items)| withdraw_unreachable_options(RequiredAction::new(kind, items), state))
        .collect();

        tracing::info!(
            delivery_date = %state.delivery_date,
            records = records.len(),
            actions = queue.len(),
            "classified billing drift"
        );
        queue
    }

    /// Extra units per product, plus entries that match nothing
    fn expected_extras(&self, state: &Personalization) -> (Vec<ActionItem>, IndexMap<ProductId, ActionItem>) {
        let mut orphaned = Vec::new();
        let mut expected: IndexMap<ProductId, ActionItem> = IndexMap::new();

        for entry in state.entries() {
            let Some(product) = self.matcher.classify(entry).product() else {
                let mut item = ActionItem::new(entry.title.clone()).with_expected(entry.extra_units());
                item.product_id = entry.product_id;
                item.list = entry.kind.list();
                orphaned.push(item);
                continue;
            };

            let units = entry.extra_units();
            if units == 0 {
                continue;
            }
            let item = expected.entry(product.id).or_insert_with(|| {
                ActionItem::new(product.title.clone())
                    .with_product(product.id)
                    .with_list(entry.kind.list().unwrap_or(ListKind::Including))
            });
            item.expected = item.expected.saturating_add(units);
        }

        (orphaned, expected)
    }

    /// Billed units per product, plus records for products not in the box
    fn subscribed_extras(&self, records: &[BillingRecord]) -> (Vec<ActionItem>, IndexMap<ProductId, ActionItem>) {
        let produce_box = self.matcher.produce_box();
        let mut not_available = Vec::new();
        let mut subscribed: IndexMap<ProductId, ActionItem> = IndexMap::new();

        for record in records {
            if produce_box.is_box_product(record.product_id, &record.product_title) {
                continue;
            }

            let availability = self.matcher.classify_ref(record.product_id, &record.product_title);
            let (product, list) = match availability {
                Availability::IncludedAvailable(p) => (p, ListKind::Including),
                Availability::AddonAvailable(p) => (p, ListKind::AddOnItems),
                Availability::Unavailable => {
                    let mut item = ActionItem::new(record.product_title.clone())
                        .with_billing(record.id.clone(), record.quantity);
                    item.product_id = record.product_id;
                    not_available.push(item);
                    continue;
                }
            };

            match subscribed.entry(product.id) {
                MapEntry::Occupied(mut existing) => {
                    tracing::warn!(
                        title = %product.title,
                        record = %record.id,
                        "several billing records for one product"
                    );
                    let item = existing.get_mut();
                    item.billed = item.billed.saturating_add(record.quantity);
                }
                MapEntry::Vacant(slot) => {
                    slot.insert(
                        ActionItem::new(product.title.clone())
                            .with_product(product.id)
                            .with_billing(record.id.clone(), record.quantity)
                            .with_list(list),
                    );
                }
            }
        }

        (not_available, subscribed)
    }
}

/// Drop resolutions that would move billed units into an entry `state` lacks,
/// such as a standard item the customer removed
fn withdraw_unreachable_options(action: RequiredAction, state: &Personalization) -> RequiredAction {
    if action.items.iter().all(|item| item.can_carry_units_in(state)) {
        return action;
    }
    action
        .without_option(Resolution::AddToPersonalization)
        .without_option(Resolution::AdjustPersonalization)
}
