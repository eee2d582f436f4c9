//! Error types for billing sync
//!
//! Data-shape problems never surface here; they become adjustments or
//! required actions. These errors cover structural failures only:
//! - Collaborator store failures
//! - Misdriven action chains
//! - Unreadable persisted state

use crate::action::{ActionId, Resolution};
use boxkit_model::{DeliveryDate, ProductId, RecordId, WireError};

/// Catalog or billing store failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No catalog snapshot for the box and date
    #[error("no box {product} for delivery {date}")]
    BoxNotFound {
        /// Box product
        product: ProductId,
        /// Requested delivery date
        date: DeliveryDate,
    },

    /// Billing record does not exist
    #[error("billing record not found: {0}")]
    RecordNotFound(RecordId),

    /// Store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create unavailable error
    #[inline]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Check if a retry may succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Action chain misuse or failed mutation
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// Nothing is awaiting confirmation
    #[error("no action awaiting confirmation")]
    NoPendingAction,

    /// Confirmation names an action that is not the pending one
    #[error("confirmation for {received} but {pending} is pending")]
    StaleConfirmation {
        /// Pending action
        pending: ActionId,
        /// Action named by the confirmation
        received: ActionId,
    },

    /// Resolution is not one of the pending action's options
    #[error("resolution {resolution} not offered for action {action}")]
    ResolutionNotOffered {
        /// Pending action
        action: ActionId,
        /// Rejected resolution
        resolution: Resolution,
    },

    /// Chain was started twice
    #[error("action chain already started")]
    AlreadyStarted,

    /// Resolution would move billed units into an entry the personalization lacks
    #[error("no {title} entry to carry billed units for action {action}")]
    NoPersonalizationEntry {
        /// Pending action
        action: ActionId,
        /// Product without an entry
        title: String,
    },

    /// Billing mutation failed; the action stays pending
    #[error("billing store error: {0}")]
    Store(#[from] StoreError),
}

/// Top-level sync error
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Collaborator store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Action chain failure
    #[error("supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),

    /// Persisted personalization unreadable
    #[error("wire error: {0}")]
    Wire(#[from] WireError),
}

impl SyncError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) | Self::Supervisor(SupervisorError::Store(e)) => e.is_transient(),
            _ => false,
        }
    }

    /// Check if an operator must step in
    #[inline]
    #[must_use]
    pub fn requires_operator(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::BoxNotFound { .. } | StoreError::RecordNotFound(_))
                | Self::Supervisor(
                    SupervisorError::StaleConfirmation { .. }
                        | SupervisorError::ResolutionNotOffered { .. }
                        | SupervisorError::NoPersonalizationEntry { .. }
                        | SupervisorError::Store(StoreError::RecordNotFound(_))
                )
                | Self::Wire(_)
        )
    }
}
