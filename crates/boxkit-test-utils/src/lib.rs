//! Testing utilities for the boxkit workspace
//!
//! Shared fixtures and in-memory collaborator stores.

#![allow(missing_docs)]

use async_trait::async_trait;
use boxkit_model::{
    BillingRecord, CustomerId, DeliveryDate, NewBillingRecord, Personalization, ProduceBox, Product, ProductId,
    PropertyCodec, RecordId, WireProperties,
};
use boxkit_sync::{BillingStore, CatalogStore, StoreError};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub const BOX_PRODUCT: ProductId = ProductId(1);

pub const WEEK_ONE_PROPERTIES: &str = r#"{"Delivery Date":"Tue Feb 20 2024",
    "Including":"Carrots 1kg (2)",
    "Add on Items":"Cabbage Green (2)",
    "Swapped Items":"Silverbeet (2)",
    "Removed Items":"Beetroot 1kg"}"#;

pub fn week_one() -> DeliveryDate {
    DeliveryDate::from_ymd(2024, 2, 20).unwrap()
}

pub fn customer() -> CustomerId {
    CustomerId("cus_001".to_string())
}

/// Box holding every title of the week-one personalization
pub fn sample_box() -> ProduceBox {
    ProduceBox::new(BOX_PRODUCT, "Small Veg Box", week_one())
        .with_included(vec![
            Product::new(10, "Carrots 1kg", 400, "veg"),
            Product::new(11, "Beetroot 1kg", 450, "veg"),
        ])
        .with_add_ons(vec![
            Product::new(20, "Cabbage Green", 500, "veg"),
            Product::new(21, "Silverbeet", 420, "veg"),
        ])
}

/// Sample box without Silverbeet, offering Parsnip instead
pub fn box_with_parsnip() -> ProduceBox {
    let mut produce_box = sample_box();
    produce_box.add_on_products.retain(|p| p.title != "Silverbeet");
    produce_box.add_on_products.push(Product::new(22, "Parsnip 1kg", 480, "veg"));
    produce_box
}

pub fn sample_properties() -> WireProperties {
    WireProperties::from_json(WEEK_ONE_PROPERTIES).unwrap()
}

pub fn sample_state() -> Personalization {
    PropertyCodec::decode(&sample_properties()).unwrap().value
}

pub fn record(id: &str, title: &str, quantity: u32) -> BillingRecord {
    BillingRecord {
        id: RecordId(id.to_string()),
        product_id: None,
        product_title: title.to_string(),
        quantity,
        delivery_date: week_one(),
    }
}

/// Catalog keyed by box product and delivery date
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    boxes: DashMap<(ProductId, DeliveryDate), ProduceBox>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_box(self, produce_box: ProduceBox) -> Self {
        self.insert(produce_box);
        self
    }

    pub fn insert(&self, produce_box: ProduceBox) {
        self.boxes
            .insert((produce_box.id, produce_box.delivery_date), produce_box);
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn box_by_delivery_date(&self, product: &ProductId, date: DeliveryDate) -> Result<ProduceBox, StoreError> {
        self.boxes
            .get(&(*product, date))
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::BoxNotFound { product: *product, date })
    }
}

/// Billing records with a write log and switchable write failures
#[derive(Debug, Default)]
pub struct InMemoryBilling {
    records: Mutex<Vec<(CustomerId, BillingRecord)>>,
    writes: Mutex<Vec<String>>,
    next_id: AtomicU64,
    fail_writes: AtomicBool,
    fail_once_after: Mutex<Option<usize>>,
}

impl InMemoryBilling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, customer: &CustomerId, record: BillingRecord) -> Self {
        self.records.lock().push((customer.clone(), record));
        self
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Let `successes` more writes through, then fail exactly one
    pub fn fail_once_after(&self, successes: usize) {
        *self.fail_once_after.lock() = Some(successes);
    }

    pub fn records(&self, customer: &CustomerId) -> Vec<BillingRecord> {
        self.records
            .lock()
            .iter()
            .filter(|(owner, _)| owner == customer)
            .map(|(_, record)| record.clone())
            .collect()
    }

    /// Writes applied so far, as `op:title:quantity` or `op:record`
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("billing writes disabled"));
        }
        let mut countdown = self.fail_once_after.lock();
        match *countdown {
            Some(0) => {
                *countdown = None;
                Err(StoreError::unavailable("billing write dropped"))
            }
            Some(left) => {
                *countdown = Some(left - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BillingStore for InMemoryBilling {
    async fn list_billing_records(
        &self,
        customer: &CustomerId,
        date: DeliveryDate,
    ) -> Result<Vec<BillingRecord>, StoreError> {
        Ok(self
            .records(customer)
            .into_iter()
            .filter(|record| record.delivery_date == date)
            .collect())
    }

    async fn create_billing_record(
        &self,
        customer: &CustomerId,
        record: NewBillingRecord,
    ) -> Result<BillingRecord, StoreError> {
        self.check_writable()?;
        let id = RecordId(format!("rec_{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        let record = record.into_record(id);
        self.writes
            .lock()
            .push(format!("create:{}:{}", record.product_title, record.quantity));
        self.records.lock().push((customer.clone(), record.clone()));
        Ok(record)
    }

    async fn update_billing_quantity(&self, record: &RecordId, quantity: u32) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut records = self.records.lock();
        let (_, existing) = records
            .iter_mut()
            .find(|(_, r)| &r.id == record)
            .ok_or_else(|| StoreError::RecordNotFound(record.clone()))?;
        existing.quantity = quantity;
        self.writes.lock().push(format!("update:{record}:{quantity}"));
        Ok(())
    }

    async fn delete_billing_record(&self, record: &RecordId) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|(_, r)| &r.id != record);
        if records.len() == before {
            return Err(StoreError::RecordNotFound(record.clone()));
        }
        self.writes.lock().push(format!("delete:{record}"));
        Ok(())
    }
}
