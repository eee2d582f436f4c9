//! Catalog matching
//!
//! Classifies personalization entries against a [`ProduceBox`] and picks swap
//! candidates for removed standard items.

use boxkit_model::{Entry, ProduceBox, Product, ProductId};
use std::collections::HashSet;

/// Where a product sits in a box catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability<'a> {
    /// Offered as a standard item
    IncludedAvailable(&'a Product),
    /// Offered as an add-on
    AddonAvailable(&'a Product),
    /// Not in this catalog
    Unavailable,
}

impl<'a> Availability<'a> {
    /// Matched product, if any
    #[inline]
    #[must_use]
    pub fn product(&self) -> Option<&'a Product> {
        match self {
            Availability::IncludedAvailable(p) | Availability::AddonAvailable(p) => Some(p),
            Availability::Unavailable => None,
        }
    }
}

/// Matcher bound to one catalog snapshot
#[derive(Debug, Clone, Copy)]
pub struct CatalogMatcher<'a> {
    produce_box: &'a ProduceBox,
    price_tolerance: u64,
}

impl<'a> CatalogMatcher<'a> {
    /// Create matcher for a box
    #[inline]
    #[must_use]
    pub fn new(produce_box: &'a ProduceBox, price_tolerance: u64) -> Self {
        Self {
            produce_box,
            price_tolerance,
        }
    }

    /// Box this matcher reads
    #[inline]
    #[must_use]
    pub fn produce_box(&self) -> &'a ProduceBox {
        self.produce_box
    }

    /// Classify a product reference
    ///
    /// A known id is matched first; if the id is absent from this catalog the
    /// exact title is tried, so a product re-listed under a new id still
    /// resolves.
    #[must_use]
    pub fn classify_ref(&self, id: Option<ProductId>, title: &str) -> Availability<'a> {
        let by_id = id.and_then(|id| {
            self.produce_box
                .included_by_id(id)
                .map(Availability::IncludedAvailable)
                .or_else(|| self.produce_box.add_on_by_id(id).map(Availability::AddonAvailable))
        });
        if let Some(found) = by_id {
            return found;
        }

        if let Some(p) = self.produce_box.included_by_title(title) {
            Availability::IncludedAvailable(p)
        } else if let Some(p) = self.produce_box.add_on_by_title(title) {
            Availability::AddonAvailable(p)
        } else {
            Availability::Unavailable
        }
    }

    /// Classify an entry
    #[inline]
    #[must_use]
    pub fn classify(&self, entry: &Entry) -> Availability<'a> {
        self.classify_ref(entry.product_id, &entry.title)
    }

    /// First add-on, in catalog order, that can stand in for a removed item
    ///
    /// A candidate shares the removed item's tag, is priced within the
    /// tolerance, and is not already excluded by title.
    #[must_use]
    pub fn find_swap_candidate(
        &self,
        removed: &Product,
        excluded_titles: &HashSet<String>,
    ) -> Option<&'a Product> {
        self.produce_box.add_on_products.iter().find(|candidate| {
            candidate.same_tag(removed)
                && candidate.price_within(removed, self.price_tolerance)
                && !excluded_titles.contains(&candidate.title)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxkit_model::{DeliveryDate, EntryKind};

    fn sample_box() -> ProduceBox {
        ProduceBox::new(1, "Box", DeliveryDate::from_ymd(2024, 2, 20).unwrap())
            .with_included(vec![Product::new(10, "Beetroot 1kg", 450, "veg")])
            .with_add_ons(vec![
                Product::new(20, "Bellbird Ciabatta", 700, "bread"),
                Product::new(21, "Leeks", 600, "veg"),
                Product::new(22, "Parsnip 1kg", 480, "veg"),
                Product::new(23, "Turnips", 420, "veg"),
            ])
    }

    #[test]
    fn classify_by_title() {
        let produce_box = sample_box();
        let matcher = CatalogMatcher::new(&produce_box, 50);

        let removed = Entry::new(EntryKind::Removed, "Beetroot 1kg", 1);
        assert!(matches!(matcher.classify(&removed), Availability::IncludedAvailable(_)));

        let addon = Entry::new(EntryKind::Addon, "Leeks", 1);
        assert!(matches!(matcher.classify(&addon), Availability::AddonAvailable(_)));

        let gone = Entry::new(EntryKind::Addon, "Silverbeet", 1);
        assert_eq!(matcher.classify(&gone), Availability::Unavailable);
    }

    #[test]
    fn classify_prefers_id_over_title() {
        let produce_box = sample_box();
        let matcher = CatalogMatcher::new(&produce_box, 50);

        let renamed = Entry::new(EntryKind::Addon, "Leeks (bunch)", 1).with_product(ProductId(21));
        let found = matcher.classify(&renamed).product().unwrap();
        assert_eq!(found.title, "Leeks");
    }

    #[test]
    fn classify_falls_back_to_title_for_unknown_id() {
        let produce_box = sample_box();
        let matcher = CatalogMatcher::new(&produce_box, 50);

        let relisted = Entry::new(EntryKind::Addon, "Leeks", 1).with_product(ProductId(999));
        assert_eq!(matcher.classify(&relisted).product().unwrap().id, ProductId(21));
    }

    #[test]
    fn swap_candidate_respects_tag_price_and_exclusions() {
        let produce_box = sample_box();
        let matcher = CatalogMatcher::new(&produce_box, 50);
        let beetroot = produce_box.included_by_title("Beetroot 1kg").unwrap();

        // Leeks is veg but 150 away; Parsnip is the first match in catalog order
        let pick = matcher.find_swap_candidate(beetroot, &HashSet::new()).unwrap();
        assert_eq!(pick.title, "Parsnip 1kg");

        let excluded: HashSet<String> = ["Parsnip 1kg".to_string()].into();
        let pick = matcher.find_swap_candidate(beetroot, &excluded).unwrap();
        assert_eq!(pick.title, "Turnips");

        let tight = CatalogMatcher::new(&produce_box, 10);
        assert!(tight.find_swap_candidate(beetroot, &excluded).is_none());
    }
}
