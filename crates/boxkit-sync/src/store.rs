//! Collaborator interfaces
//!
//! The catalog and billing systems are reached only through these traits, so
//! every component can be driven in tests without a running service.

use crate::error::StoreError;
use async_trait::async_trait;
use boxkit_model::{BillingRecord, CustomerId, DeliveryDate, NewBillingRecord, ProduceBox, ProductId, RecordId};

/// Read-only catalog access
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Catalog snapshot of a box for one delivery date
    async fn box_by_delivery_date(
        &self,
        product: &ProductId,
        date: DeliveryDate,
    ) -> Result<ProduceBox, StoreError>;
}

/// Recurring charges for extra products
///
/// Writes are issued only for operator-confirmed actions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingStore: Send + Sync {
    /// Records of a customer for one delivery date
    async fn list_billing_records(
        &self,
        customer: &CustomerId,
        date: DeliveryDate,
    ) -> Result<Vec<BillingRecord>, StoreError>;

    /// Start charging for an extra product
    async fn create_billing_record(
        &self,
        customer: &CustomerId,
        record: NewBillingRecord,
    ) -> Result<BillingRecord, StoreError>;

    /// Change the charged quantity
    async fn update_billing_quantity(&self, record: &RecordId, quantity: u32) -> Result<(), StoreError>;

    /// Stop charging
    async fn delete_billing_record(&self, record: &RecordId) -> Result<(), StoreError>;
}
