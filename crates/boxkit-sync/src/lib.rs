//! Boxkit Sync
//!
//! Keeps billing in step with reconciled produce box personalizations.
//!
//! # Core Concepts
//!
//! - [`SyncClassifier`]: compares implied extra units with billing records and
//!   queues [`RequiredAction`]s in priority order
//! - [`ActionChainSupervisor`]: presents one action at a time and applies the
//!   operator's [`Resolution`]
//! - [`CatalogStore`] / [`BillingStore`]: the collaborator systems
//! - [`BoxSyncService`]: fetch, reconcile and classify for one subscription
//!
//! # Example
//!
//! ```rust,ignore
//! use boxkit_sync::{BoxSyncService, Resolution, Subscription};
//!
//! let service = BoxSyncService::new(catalog, billing, ReconcileConfig::default());
//! let plan = service.plan(&subscription, &previous, date).await?;
//! let mut supervisor = service.supervise(plan)?;
//! while let Some(action) = supervisor.current() {
//!     let id = action.id;
//!     supervisor.confirm(id, Resolution::Skip).await?;
//! }
//! let state = supervisor.into_personalization();
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod action;
pub mod classifier;
pub mod error;
pub mod service;
pub mod store;
pub mod supervisor;

// Re-exports
pub use action::{ActionId, ActionItem, ActionKind, RequiredAction, Resolution};
pub use classifier::SyncClassifier;
pub use error::{StoreError, SupervisorError, SyncError};
pub use service::{BoxSyncService, Subscription, SyncPlan};
pub use store::{BillingStore, CatalogStore};
pub use supervisor::{Abandoned, ActionChainSupervisor, ChainState, Confirmed};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
