//! Boxkit Model
//!
//! Value types shared across the workspace.
//!
//! # Core Concepts
//!
//! - [`ProduceBox`]: immutable catalog snapshot for one delivery date
//! - [`Personalization`]: a customer's customisation, as tagged [`Entry`]s
//! - [`BillingRecord`]: an external recurring charge for an extra product
//! - [`PropertyCodec`]: the persisted string-list wire format
//!
//! # Example
//!
//! ```rust,ignore
//! use boxkit_model::{PropertyCodec, WireProperties, ListKind};
//!
//! let props = WireProperties::from_json(json)?;
//! let decoded = PropertyCodec::decode(&props)?;
//! for error in &decoded.errors {
//!     eprintln!("repaired: {error}");
//! }
//! let titles = decoded.value.titles(ListKind::AddOnItems);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod billing;
pub mod codec;
pub mod entry;
pub mod error;
pub mod personalization;
pub mod produce_box;
pub mod product;

// Re-exports
pub use billing::{BillingRecord, CustomerId, NewBillingRecord, RecordId};
pub use codec::{Decoded, PropertyCodec, WireProperties, NONE_SENTINEL};
pub use entry::{Entry, EntryKind, ListItem, ListKind};
pub use error::{DecodeError, WireError};
pub use personalization::Personalization;
pub use produce_box::{DeliveryDate, ProduceBox, DELIVERY_DATE_FORMAT};
pub use product::{Product, ProductId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
