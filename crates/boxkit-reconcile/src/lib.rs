//! Boxkit Reconcile
//!
//! Re-derives a customer's box personalization when the weekly catalog
//! changes, keeping as much of their intent as the new catalog allows.
//!
//! # Core Concepts
//!
//! - [`CatalogMatcher`]: where a product sits in a box (standard, add-on, gone)
//! - [`ReconciliationEngine`]: per-entry transitions, swap balancing and the
//!   rebuild of standard items
//! - [`Adjustment`]: every automatic correction, with its customer message
//! - [`ReconcileConfig`]: removal limit and swap price tolerance
//!
//! # Example
//!
//! ```rust,ignore
//! use boxkit_reconcile::{ReconcileConfig, ReconciliationEngine};
//!
//! let engine = ReconciliationEngine::new(ReconcileConfig::from_path("boxkit.toml")?);
//! let reconciled = engine.reconcile(&previous, &next_week);
//! for message in reconciled.messages() {
//!     println!("{message}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod adjustment;
mod balance;
pub mod config;
pub mod engine;
pub mod matcher;

// Re-exports
pub use adjustment::Adjustment;
pub use config::{ConfigError, ReconcileConfig};
pub use engine::{ReconciledState, ReconciliationEngine};
pub use matcher::{Availability, CatalogMatcher};

use boxkit_model::{Personalization, ProduceBox};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reconcile with the default configuration
#[must_use]
pub fn reconcile(previous: &Personalization, produce_box: &ProduceBox) -> ReconciledState {
    ReconciliationEngine::default().reconcile(previous, produce_box)
}
