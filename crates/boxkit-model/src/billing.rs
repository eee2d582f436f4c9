//! Billing records
//!
//! The billing system keeps one recurring charge per distinct extra product
//! a customer buys on top of the box price.

use crate::produce_box::DeliveryDate;
use crate::product::ProductId;
use serde::{Deserialize, Serialize};

/// Billing customer identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Billing record identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recurring charge for one extra product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRecord {
    /// Record id in the billing system
    pub id: RecordId,
    /// Catalog id, when the billing system stored one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    /// Product title as billed
    pub product_title: String,
    /// Units charged
    pub quantity: u32,
    /// Next delivery the charge applies to
    pub delivery_date: DeliveryDate,
}

/// Fields needed to create a billing record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBillingRecord {
    /// Catalog id
    pub product_id: Option<ProductId>,
    /// Product title
    pub product_title: String,
    /// Units to charge
    pub quantity: u32,
    /// Delivery date
    pub delivery_date: DeliveryDate,
}

impl NewBillingRecord {
    /// Materialise with an id assigned by the billing system
    #[must_use]
    pub fn into_record(self, id: RecordId) -> BillingRecord {
        BillingRecord {
            id,
            product_id: self.product_id,
            product_title: self.product_title,
            quantity: self.quantity,
            delivery_date: self.delivery_date,
        }
    }
}
