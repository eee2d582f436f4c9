//! Reconciliation engine
//!
//! Re-derives a valid personalization when the weekly catalog changes.
//!
//! # Passes
//! 1. Normalise: drop empty entries, merge duplicates, resolve included/removed
//!    conflicts, enforce the removal limit
//! 2. Transition: move every entry according to its kind and where its product
//!    now sits in the catalog
//! 3. Balance: pair swaps with removals (see [`crate::balance`])
//! 4. Rebuild Including from the catalog's standard items
//!
//! The engine is pure: the same inputs always give the same output, and
//! running it again on its own output against the same box changes nothing.

use crate::adjustment::Adjustment;
use crate::balance;
use crate::config::ReconcileConfig;
use crate::matcher::{Availability, CatalogMatcher};
use boxkit_model::{Entry, EntryKind, ListKind, Personalization, ProduceBox, Product};
use serde::{Deserialize, Serialize};

/// Result of a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledState {
    /// Reconciled personalization
    pub state: Personalization,
    /// Automatic corrections, in the order they were made
    pub adjustments: Vec<Adjustment>,
}

impl ReconciledState {
    /// Customer-facing messages
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.adjustments.iter().map(ToString::to_string).collect()
    }

    /// Whether the run made no corrections
    #[inline]
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.adjustments.is_empty()
    }
}

/// Working set of one run
#[derive(Debug, Default)]
pub(crate) struct Run {
    pub(crate) entries: Vec<Entry>,
    pub(crate) adjustments: Vec<Adjustment>,
}

impl Run {
    pub(crate) fn note(&mut self, adjustment: Adjustment) {
        tracing::debug!(%adjustment, "reconcile adjustment");
        self.adjustments.push(adjustment);
    }

    pub(crate) fn count(&self, kind: EntryKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Add units to the add-on entry for this product, creating it if needed
    pub(crate) fn add_to_addons(&mut self, mut entry: Entry) {
        let existing = self
            .entries
            .iter_mut()
            .find(|e| e.kind == EntryKind::Addon && e.refers_to(entry.product_id, &entry.title));
        match existing {
            Some(addon) => addon.quantity = addon.quantity.saturating_add(entry.quantity),
            None => {
                entry.kind = EntryKind::Addon;
                self.entries.push(entry);
            }
        }
    }
}

/// Catalog-change reconciliation
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine {
    config: ReconcileConfig,
}

impl ReconciliationEngine {
    /// Create engine
    #[inline]
    #[must_use]
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Reconcile a personalization against a catalog snapshot
    ///
    /// Never fails: entries that cannot be kept are dropped with an
    /// [`Adjustment`] explaining why.
    #[must_use]
    pub fn reconcile(&self, previous: &Personalization, produce_box: &ProduceBox) -> ReconciledState {
        let matcher = CatalogMatcher::new(produce_box, self.config.swap_price_tolerance);
        let mut run = Run {
            entries: previous.entries().to_vec(),
            adjustments: Vec::new(),
        };

        normalize(&mut run);
        self.cap_removals(&mut run);
        transition_all(&mut run, &matcher);
        balance::balance(&mut run, &matcher);
        let entries = rebuild_including(&mut run, produce_box, previous);

        let mut state = Personalization::from_entries(produce_box.delivery_date, entries);
        state.canonicalize();

        tracing::info!(
            delivery_date = %state.delivery_date,
            adjustments = run.adjustments.len(),
            "reconciled personalization"
        );

        ReconciledState {
            state,
            adjustments: run.adjustments,
        }
    }

    fn cap_removals(&self, run: &mut Run) {
        let limit = self.config.max_removed_items;
        let mut seen = 0;
        let mut restored = Vec::new();
        run.entries.retain(|e| {
            if e.kind != EntryKind::Removed {
                return true;
            }
            seen += 1;
            if seen <= limit {
                true
            } else {
                restored.push(e.title.clone());
                false
            }
        });
        for title in restored {
            run.note(Adjustment::RemovalLimitExceeded { title, limit });
        }
    }
}

fn normalize(run: &mut Run) {
    let mut merged: Vec<Entry> = Vec::with_capacity(run.entries.len());
    for mut entry in std::mem::take(&mut run.entries) {
        // zero means "no entry"
        if entry.quantity == 0 {
            continue;
        }
        if entry.kind == EntryKind::Removed {
            entry.quantity = 1;
        }

        let duplicate = merged
            .iter_mut()
            .find(|m| m.kind == entry.kind && m.refers_to(entry.product_id, &entry.title));
        match duplicate {
            Some(existing) => {
                if existing.kind != EntryKind::Removed {
                    existing.quantity = existing.quantity.saturating_add(entry.quantity);
                }
                let list = existing.kind.list().unwrap_or(ListKind::Including);
                let title = existing.title.clone();
                run.note(Adjustment::DuplicateMerged { list, title });
            }
            None => merged.push(entry),
        }
    }

    let removed: Vec<Entry> = merged
        .iter()
        .filter(|e| e.kind == EntryKind::Removed)
        .cloned()
        .collect();
    let mut conflicts = Vec::new();
    merged.retain(|e| {
        let conflicting = e.kind == EntryKind::Standard
            && removed.iter().any(|r| r.refers_to(e.product_id, &e.title));
        if conflicting {
            conflicts.push(e.title.clone());
        }
        !conflicting
    });
    for title in conflicts {
        run.note(Adjustment::ConflictingRemoval { title });
    }

    run.entries = merged;
}

fn transition_all(run: &mut Run, matcher: &CatalogMatcher<'_>) {
    for entry in std::mem::take(&mut run.entries) {
        transition(run, matcher, entry);
    }
}

fn transition(run: &mut Run, matcher: &CatalogMatcher<'_>, mut entry: Entry) {
    let availability = matcher.classify(&entry);
    if let Some(product) = availability.product() {
        resolve(run, &mut entry, product);
    }

    match (entry.kind, availability) {
        (EntryKind::Standard | EntryKind::ExtraIncluded, Availability::Unavailable) => {
            run.note(Adjustment::Unavailable {
                list: ListKind::Including,
                title: entry.title,
            });
        }
        (EntryKind::Standard | EntryKind::ExtraIncluded, Availability::IncludedAvailable(_)) => {
            run.entries.push(entry);
        }
        (EntryKind::Standard | EntryKind::ExtraIncluded, Availability::AddonAvailable(_)) => {
            run.note(Adjustment::MovedToAddOns {
                title: entry.title.clone(),
                quantity: entry.quantity,
            });
            run.add_to_addons(entry);
        }

        (EntryKind::Addon, Availability::Unavailable) => {
            run.note(Adjustment::Unavailable {
                list: ListKind::AddOnItems,
                title: entry.title,
            });
        }
        (EntryKind::Addon, Availability::IncludedAvailable(_)) => {
            let extra = entry.quantity - 1;
            run.note(Adjustment::AddOnNowIncluded {
                title: entry.title.clone(),
                extra,
            });
            carry_extra(run, entry, extra);
        }
        (EntryKind::Addon, Availability::AddonAvailable(_)) => run.add_to_addons(entry),

        (EntryKind::SwappedIn, Availability::Unavailable) => {
            run.note(Adjustment::SwappedUnavailable {
                billed_extra: entry.extra_units(),
                title: entry.title,
            });
        }
        (EntryKind::SwappedIn, Availability::IncludedAvailable(_)) => {
            let extra = entry.quantity - 1;
            run.note(Adjustment::SwapNowIncluded {
                title: entry.title.clone(),
                extra,
            });
            carry_extra(run, entry, extra);
        }
        (EntryKind::SwappedIn, Availability::AddonAvailable(_)) => run.entries.push(entry),

        (EntryKind::Removed, Availability::Unavailable) => {
            run.note(Adjustment::RemovalUnavailable { title: entry.title });
        }
        (EntryKind::Removed, Availability::IncludedAvailable(_)) => run.entries.push(entry),
        (EntryKind::Removed, Availability::AddonAvailable(_)) => {
            run.note(Adjustment::RemovalNowAddOn { title: entry.title });
        }
    }
}

/// Pin the entry to its catalog product, adopting a changed title
fn resolve(run: &mut Run, entry: &mut Entry, product: &Product) {
    entry.product_id = Some(product.id);
    if entry.title != product.title {
        run.note(Adjustment::Renamed {
            from: std::mem::replace(&mut entry.title, product.title.clone()),
            to: product.title.clone(),
        });
    }
}

fn carry_extra(run: &mut Run, mut entry: Entry, extra: u32) {
    if extra > 0 {
        entry.kind = EntryKind::ExtraIncluded;
        entry.quantity = extra;
        run.entries.push(entry);
    }
}

fn rebuild_including(run: &mut Run, produce_box: &ProduceBox, previous: &Personalization) -> Vec<Entry> {
    let (carried, rest): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut run.entries)
        .into_iter()
        .partition(|e| matches!(e.kind, EntryKind::Standard | EntryKind::ExtraIncluded));

    let is_removed = |product: &Product| {
        rest.iter()
            .any(|e| e.kind == EntryKind::Removed && e.product_id == Some(product.id))
    };

    let mut including = Vec::with_capacity(produce_box.included_products.len() + rest.len());
    for product in &produce_box.included_products {
        let base = carried
            .iter()
            .find(|e| e.kind == EntryKind::Standard && e.product_id == Some(product.id))
            .map(|e| e.quantity);
        let extra: u32 = carried
            .iter()
            .filter(|e| e.kind == EntryKind::ExtraIncluded && e.product_id == Some(product.id))
            .map(|e| e.quantity)
            .sum();

        if is_removed(product) {
            if extra > 0 {
                run.note(Adjustment::ExtraOnRemovedDropped {
                    title: product.title.clone(),
                    quantity: extra,
                });
            }
            continue;
        }

        let known = previous
            .entries()
            .iter()
            .any(|e| e.refers_to(Some(product.id), &product.title));
        if base.is_none() && !known {
            run.note(Adjustment::NewStandardItem {
                title: product.title.clone(),
            });
        }

        let quantity = base.unwrap_or(1).saturating_add(extra);
        including.push(
            Entry::new(EntryKind::Standard, product.title.clone(), quantity).with_product(product.id),
        );
    }

    including.extend(rest);
    including
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxkit_model::{DeliveryDate, ProductId};
    use pretty_assertions::assert_eq;

    fn date() -> DeliveryDate {
        DeliveryDate::from_ymd(2024, 2, 20).unwrap()
    }

    fn produce_box() -> ProduceBox {
        ProduceBox::new(1, "Box", date())
            .with_included(vec![
                Product::new(10, "Carrots 1kg", 400, "veg"),
                Product::new(11, "Beetroot 1kg", 450, "veg"),
                Product::new(12, "Curly Kale", 350, "greens"),
            ])
            .with_add_ons(vec![
                Product::new(20, "Cabbage Green", 500, "veg"),
                Product::new(21, "Silverbeet", 380, "greens"),
            ])
    }

    fn state(entries: Vec<Entry>) -> Personalization {
        Personalization::from_entries(date(), entries)
    }

    fn quantity(state: &Personalization, kind: EntryKind, title: &str) -> Option<u32> {
        state.find(kind, None, title).map(|e| e.quantity)
    }

    #[test]
    fn including_moves_to_addons_when_no_longer_standard() {
        let mut catalog = produce_box();
        let kale = catalog.included_products.remove(2);
        catalog.add_on_products.push(kale);

        let input = state(vec![Entry::new(EntryKind::Standard, "Curly Kale", 2)]);
        let out = ReconciliationEngine::default().reconcile(&input, &catalog);

        assert_eq!(quantity(&out.state, EntryKind::Addon, "Curly Kale"), Some(2));
        assert_eq!(quantity(&out.state, EntryKind::Standard, "Curly Kale"), None);
        assert!(out
            .adjustments
            .iter()
            .any(|a| matches!(a, Adjustment::MovedToAddOns { quantity: 2, .. })));
    }

    #[test]
    fn addon_absorbed_into_including_keeps_extras() {
        let mut catalog = produce_box();
        let cabbage = catalog.add_on_products.remove(0);
        catalog.included_products.push(cabbage);

        let input = state(vec![Entry::new(EntryKind::Addon, "Cabbage Green", 3)]);
        let out = ReconciliationEngine::default().reconcile(&input, &catalog);

        assert_eq!(quantity(&out.state, EntryKind::Standard, "Cabbage Green"), Some(3));
        assert_eq!(out.state.count(ListKind::AddOnItems), 0);
        assert!(out
            .adjustments
            .contains(&Adjustment::AddOnNowIncluded { title: "Cabbage Green".into(), extra: 2 }));
    }

    #[test]
    fn swap_now_standard_becomes_included_extra() {
        let mut catalog = produce_box();
        let silverbeet = catalog.add_on_products.remove(1);
        catalog.included_products.push(silverbeet);

        let input = state(vec![
            Entry::new(EntryKind::SwappedIn, "Silverbeet", 2),
            Entry::new(EntryKind::Removed, "Curly Kale", 1),
        ]);
        let out = ReconciliationEngine::new(ReconcileConfig::new().with_swap_price_tolerance(0))
            .reconcile(&input, &catalog);

        assert_eq!(quantity(&out.state, EntryKind::Standard, "Silverbeet"), Some(2));
        // no greens add-on left to swap in, so the removal is restored
        assert_eq!(out.state.count(ListKind::RemovedItems), 0);
        assert_eq!(quantity(&out.state, EntryKind::Standard, "Curly Kale"), Some(1));
    }

    #[test]
    fn unavailable_entries_are_dropped_with_messages() {
        let input = state(vec![
            Entry::new(EntryKind::Standard, "Pumpkin Crown", 1),
            Entry::new(EntryKind::Addon, "Bellbird Ciabatta", 1),
            Entry::new(EntryKind::Removed, "Chard Red", 1),
        ]);
        let out = ReconciliationEngine::default().reconcile(&input, &produce_box());

        assert!(out.state.find(EntryKind::Standard, None, "Pumpkin Crown").is_none());
        assert_eq!(out.state.count(ListKind::AddOnItems), 0);
        assert_eq!(out.state.count(ListKind::RemovedItems), 0);
        assert!(out.messages().iter().any(|m| m.contains("Pumpkin Crown")));
        assert!(out.messages().iter().any(|m| m.contains("Bellbird Ciabatta")));
        assert!(out.messages().iter().any(|m| m.contains("Chard Red")));
    }

    #[test]
    fn removal_now_addon_is_dropped() {
        let mut catalog = produce_box();
        let beetroot = catalog.included_products.remove(1);
        catalog.add_on_products.push(beetroot);

        let input = state(vec![
            Entry::new(EntryKind::Removed, "Beetroot 1kg", 1),
            Entry::new(EntryKind::SwappedIn, "Cabbage Green", 1),
        ]);
        let out = ReconciliationEngine::default().reconcile(&input, &catalog);

        assert_eq!(out.state.count(ListKind::RemovedItems), 0);
        // the orphaned swap is popped and nothing is left over
        assert_eq!(out.state.count(ListKind::SwappedItems), 0);
        assert_eq!(out.state.count(ListKind::AddOnItems), 0);
        assert!(out
            .adjustments
            .contains(&Adjustment::RemovalNowAddOn { title: "Beetroot 1kg".into() }));
    }

    #[test]
    fn removed_cap_restores_excess() {
        let input = state(vec![
            Entry::new(EntryKind::Removed, "Carrots 1kg", 1),
            Entry::new(EntryKind::Removed, "Beetroot 1kg", 1),
            Entry::new(EntryKind::Removed, "Curly Kale", 1),
        ]);
        let engine = ReconciliationEngine::new(
            ReconcileConfig::new()
                .with_max_removed_items(2)
                .with_swap_price_tolerance(200),
        );
        let out = engine.reconcile(&input, &produce_box());

        // Carrots pairs with Cabbage; Beetroot finds no second veg add-on
        assert_eq!(out.state.titles(ListKind::RemovedItems), vec!["Carrots 1kg"]);
        assert_eq!(out.state.titles(ListKind::SwappedItems), vec!["Cabbage Green"]);
        assert_eq!(quantity(&out.state, EntryKind::Standard, "Curly Kale"), Some(1));
        assert!(out
            .adjustments
            .contains(&Adjustment::RemovalLimitExceeded { title: "Curly Kale".into(), limit: 2 }));
    }

    #[test]
    fn duplicates_are_merged() {
        let input = state(vec![
            Entry::new(EntryKind::Addon, "Cabbage Green", 1),
            Entry::new(EntryKind::Addon, "Cabbage Green", 2),
        ]);
        let out = ReconciliationEngine::default().reconcile(&input, &produce_box());
        assert_eq!(quantity(&out.state, EntryKind::Addon, "Cabbage Green"), Some(3));
        assert_eq!(out.state.count(ListKind::AddOnItems), 1);
    }

    #[test]
    fn renamed_product_follows_its_id() {
        let input = state(vec![
            Entry::new(EntryKind::Addon, "Cabbage", 1).with_product(ProductId(20)),
        ]);
        let out = ReconciliationEngine::default().reconcile(&input, &produce_box());

        assert_eq!(quantity(&out.state, EntryKind::Addon, "Cabbage Green"), Some(1));
        assert!(out.adjustments.contains(&Adjustment::Renamed {
            from: "Cabbage".into(),
            to: "Cabbage Green".into()
        }));
    }

    #[test]
    fn rebuild_reports_new_standard_items() {
        let input = state(vec![
            Entry::new(EntryKind::Standard, "Carrots 1kg", 1),
            Entry::new(EntryKind::Standard, "Beetroot 1kg", 1),
        ]);
        let out = ReconciliationEngine::default().reconcile(&input, &produce_box());

        assert_eq!(
            out.state.titles(ListKind::Including),
            vec!["Carrots 1kg", "Beetroot 1kg", "Curly Kale"]
        );
        assert_eq!(
            out.adjustments,
            vec![Adjustment::NewStandardItem { title: "Curly Kale".into() }]
        );
    }

    #[test]
    fn conflicting_removal_wins() {
        let input = state(vec![
            Entry::new(EntryKind::Standard, "Carrots 1kg", 2),
            Entry::new(EntryKind::Standard, "Beetroot 1kg", 1),
            Entry::new(EntryKind::Standard, "Curly Kale", 1),
            Entry::new(EntryKind::Removed, "Carrots 1kg", 1),
            Entry::new(EntryKind::SwappedIn, "Cabbage Green", 1),
        ]);
        let out = ReconciliationEngine::default().reconcile(&input, &produce_box());

        assert!(out.state.find(EntryKind::Standard, None, "Carrots 1kg").is_none());
        assert_eq!(out.state.titles(ListKind::RemovedItems), vec!["Carrots 1kg"]);
        assert!(out
            .adjustments
            .contains(&Adjustment::ConflictingRemoval { title: "Carrots 1kg".into() }));
    }

    #[test]
    fn output_takes_the_box_delivery_date() {
        let catalog = ProduceBox {
            delivery_date: DeliveryDate::from_ymd(2024, 2, 27).unwrap(),
            ..produce_box()
        };
        let out = ReconciliationEngine::default().reconcile(&Personalization::from_box(&produce_box()), &catalog);
        assert_eq!(out.state.delivery_date, catalog.delivery_date);
        assert!(out.is_unchanged());
    }
}
