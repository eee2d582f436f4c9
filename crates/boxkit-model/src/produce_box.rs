//! Weekly box catalog snapshots
//!
//! A [`ProduceBox`] is immutable once fetched: the catalog for one delivery
//! date, split into the standard items delivered by default and the add-on
//! products a customer may buy or swap in.

use crate::error::WireError;
use crate::product::{Product, ProductId};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Wire format of delivery dates, e.g. `Tue Feb 20 2024`
pub const DELIVERY_DATE_FORMAT: &str = "%a %b %d %Y";

/// Calendar date a box is delivered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeliveryDate(NaiveDate);

impl DeliveryDate {
    /// Wrap a calendar date
    #[inline]
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build from year, month and day
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Underlying date
    #[inline]
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for DeliveryDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DELIVERY_DATE_FORMAT))
    }
}

impl FromStr for DeliveryDate {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DELIVERY_DATE_FORMAT)
            .map(Self)
            .map_err(|e| WireError::invalid_delivery_date(s, e))
    }
}

impl Serialize for DeliveryDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeliveryDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Catalog snapshot for one delivery date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProduceBox {
    /// Id of the box product itself
    pub id: ProductId,
    /// Title of the box product itself
    pub title: String,
    /// Delivery date this catalog applies to
    pub delivery_date: DeliveryDate,
    /// Standard items, in catalog order
    #[serde(default)]
    pub included_products: Vec<Product>,
    /// Add-on items, in catalog order
    #[serde(default)]
    pub add_on_products: Vec<Product>,
}

impl ProduceBox {
    /// Create an empty box catalog
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, delivery_date: DeliveryDate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            delivery_date,
            included_products: Vec::new(),
            add_on_products: Vec::new(),
        }
    }

    /// With standard items
    #[inline]
    #[must_use]
    pub fn with_included(mut self, products: Vec<Product>) -> Self {
        self.included_products = products;
        self
    }

    /// With add-on items
    #[inline]
    #[must_use]
    pub fn with_add_ons(mut self, products: Vec<Product>) -> Self {
        self.add_on_products = products;
        self
    }

    /// Standard item by exact title
    #[must_use]
    pub fn included_by_title(&self, title: &str) -> Option<&Product> {
        self.included_products.iter().find(|p| p.title == title)
    }

    /// Add-on item by exact title
    #[must_use]
    pub fn add_on_by_title(&self, title: &str) -> Option<&Product> {
        self.add_on_products.iter().find(|p| p.title == title)
    }

    /// Standard item by id
    #[must_use]
    pub fn included_by_id(&self, id: ProductId) -> Option<&Product> {
        self.included_products.iter().find(|p| p.id == id)
    }

    /// Add-on item by id
    #[must_use]
    pub fn add_on_by_id(&self, id: ProductId) -> Option<&Product> {
        self.add_on_products.iter().find(|p| p.id == id)
    }

    /// Whether a product reference names the box product itself
    #[must_use]
    pub fn is_box_product(&self, id: Option<ProductId>, title: &str) -> bool {
        match id {
            Some(id) => id == self.id,
            None => title == self.title,
        }
    }

    /// All catalog products, standard items first
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.included_products
            .iter()
            .chain(self.add_on_products.iter())
    }
}
