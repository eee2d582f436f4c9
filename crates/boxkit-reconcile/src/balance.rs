//! Swap/removal balancing
//!
//! Every swap stands in for one removal: `SwappedItems[i]` replaces
//! `RemovedItems[i]`. After the transition pass the two lists can disagree in
//! length; this pass restores the pairing.
//!
//! - Too many swaps: the newest are popped. One unit goes back with the
//!   removal it replaced; any further units stay as ordinary add-ons.
//! - Too many removals: each unpaired removal, in list order, gets the first
//!   compatible add-on as its swap. With no candidate the removal is dropped
//!   and the item is restored to the box.

use crate::adjustment::Adjustment;
use crate::engine::Run;
use crate::matcher::CatalogMatcher;
use boxkit_model::{Entry, EntryKind};
use std::cmp::Ordering;
use std::collections::HashSet;

pub(crate) fn balance(run: &mut Run, matcher: &CatalogMatcher<'_>) {
    let swapped = run.count(EntryKind::SwappedIn);
    let removed = run.count(EntryKind::Removed);

    match swapped.cmp(&removed) {
        Ordering::Greater => pop_excess_swaps(run, swapped - removed),
        Ordering::Less => pair_excess_removals(run, matcher, swapped),
        Ordering::Equal => {}
    }
}

fn pop_excess_swaps(run: &mut Run, excess: usize) {
    for _ in 0..excess {
        let Some(index) = run.entries.iter().rposition(|e| e.kind == EntryKind::SwappedIn) else {
            break;
        };
        let mut entry = run.entries.remove(index);
        entry.quantity = entry.quantity.saturating_sub(1);

        run.note(Adjustment::ExcessSwapRemoved {
            title: entry.title.clone(),
            kept_as_addon: entry.quantity,
        });
        if entry.quantity > 0 {
            run.add_to_addons(entry);
        }
    }
}

fn pair_excess_removals(run: &mut Run, matcher: &CatalogMatcher<'_>, paired: usize) {
    let mut excluded: HashSet<String> = run
        .entries
        .iter()
        .filter(|e| matches!(e.kind, EntryKind::SwappedIn | EntryKind::Addon))
        .map(|e| e.title.clone())
        .collect();

    let unpaired: Vec<usize> = run
        .entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind == EntryKind::Removed)
        .skip(paired)
        .map(|(i, _)| i)
        .collect();

    let mut restored = Vec::new();
    let mut swaps = Vec::new();
    for index in unpaired {
        let removed_title = run.entries[index].title.clone();
        let candidate = matcher
            .classify(&run.entries[index])
            .product()
            .and_then(|product| matcher.find_swap_candidate(product, &excluded));

        match candidate {
            Some(product) => {
                excluded.insert(product.title.clone());
                swaps.push(
                    Entry::new(EntryKind::SwappedIn, product.title.clone(), 1).with_product(product.id),
                );
                run.note(Adjustment::SwapAssigned {
                    swapped_in: product.title.clone(),
                    removed: removed_title,
                });
            }
            None => {
                restored.push(index);
                run.note(Adjustment::SwapUnavailable {
                    removed: removed_title,
                });
            }
        }
    }

    for index in restored.into_iter().rev() {
        run.entries.remove(index);
    }
    run.entries.extend(swaps);
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxkit_model::{DeliveryDate, ProduceBox, Product};

    fn produce_box() -> ProduceBox {
        ProduceBox::new(1, "Box", DeliveryDate::from_ymd(2024, 2, 20).unwrap())
            .with_included(vec![
                Product::new(10, "Beetroot 1kg", 450, "veg"),
                Product::new(11, "Chard Red", 400, "greens"),
            ])
            .with_add_ons(vec![
                Product::new(20, "Parsnip 1kg", 480, "veg"),
                Product::new(21, "Turnips", 430, "veg"),
            ])
    }

    fn run(entries: Vec<Entry>) -> Run {
        Run {
            entries,
            adjustments: Vec::new(),
        }
    }

    #[test]
    fn excess_swaps_pop_newest_first() {
        let catalog = produce_box();
        let matcher = CatalogMatcher::new(&catalog, 50);
        let mut r = run(vec![
            Entry::new(EntryKind::SwappedIn, "Parsnip 1kg", 1),
            Entry::new(EntryKind::SwappedIn, "Turnips", 3),
        ]);

        balance(&mut r, &matcher);

        assert_eq!(r.count(EntryKind::SwappedIn), 0);
        let addons: Vec<_> = r.entries.iter().filter(|e| e.kind == EntryKind::Addon).collect();
        assert_eq!(addons.len(), 1);
        assert_eq!(addons[0].title, "Turnips");
        assert_eq!(addons[0].quantity, 2);
        assert!(matches!(
            r.adjustments.first(),
            Some(Adjustment::ExcessSwapRemoved { title, kept_as_addon: 2 }) if title == "Turnips"
        ));
    }

    #[test]
    fn popped_swap_merges_into_existing_addon() {
        let catalog = produce_box();
        let matcher = CatalogMatcher::new(&catalog, 50);
        let mut r = run(vec![
            Entry::new(EntryKind::Addon, "Turnips", 1),
            Entry::new(EntryKind::SwappedIn, "Turnips", 2),
        ]);

        balance(&mut r, &matcher);

        assert_eq!(r.entries, vec![Entry::new(EntryKind::Addon, "Turnips", 2)]);
    }

    #[test]
    fn unpaired_removals_get_distinct_swaps_in_order() {
        let mut catalog = produce_box();
        catalog.included_products.push(Product::new(12, "Carrots 1kg", 440, "veg"));
        let matcher = CatalogMatcher::new(&catalog, 50);
        let mut r = run(vec![
            Entry::new(EntryKind::Removed, "Beetroot 1kg", 1),
            Entry::new(EntryKind::Removed, "Carrots 1kg", 1),
        ]);

        balance(&mut r, &matcher);

        let swaps: Vec<_> = r
            .entries
            .iter()
            .filter(|e| e.kind == EntryKind::SwappedIn)
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(swaps, vec!["Parsnip 1kg", "Turnips"]);
        assert_eq!(r.count(EntryKind::Removed), 2);
    }

    #[test]
    fn removal_without_candidate_is_restored() {
        let catalog = produce_box();
        let matcher = CatalogMatcher::new(&catalog, 50);
        let mut r = run(vec![Entry::new(EntryKind::Removed, "Chard Red", 1)]);

        balance(&mut r, &matcher);

        assert!(r.entries.is_empty());
        assert_eq!(
            r.adjustments,
            vec![Adjustment::SwapUnavailable {
                removed: "Chard Red".to_string()
            }]
        );
    }

    #[test]
    fn addon_titles_are_not_offered_as_swaps() {
        let catalog = produce_box();
        let matcher = CatalogMatcher::new(&catalog, 50);
        let mut r = run(vec![
            Entry::new(EntryKind::Addon, "Parsnip 1kg", 1),
            Entry::new(EntryKind::Removed, "Beetroot 1kg", 1),
        ]);

        balance(&mut r, &matcher);

        let swap = r.entries.iter().find(|e| e.kind == EntryKind::SwappedIn).unwrap();
        assert_eq!(swap.title, "Turnips");
    }
}
