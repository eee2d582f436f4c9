//! Catalog products
//!
//! A [`Product`] is one line of a weekly catalog snapshot. The [`ProductId`]
//! is the stable join key across catalog, personalization and billing; the
//! title is kept for display and as a fallback when no id is known.

use serde::{Deserialize, Serialize};

/// Catalog product identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A product offered in a box catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    /// Catalog id
    pub id: ProductId,
    /// Display title (legacy join key)
    pub title: String,
    /// Price in minor currency units
    pub price: u64,
    /// Category used for swap compatibility
    pub tag: String,
}

impl Product {
    /// Create new product
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        price: u64,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            tag: tag.into(),
        }
    }

    /// Whether `other` is priced within `tolerance` minor units of this product
    #[inline]
    #[must_use]
    pub fn price_within(&self, other: &Product, tolerance: u64) -> bool {
        self.price.abs_diff(other.price) <= tolerance
    }

    /// Whether `other` shares this product's swap category
    #[inline]
    #[must_use]
    pub fn same_tag(&self, other: &Product) -> bool {
        self.tag == other.tag
    }
}
