//! Per-subscription sync orchestration
//!
//! Fetches the week's catalog, reconciles the stored personalization against
//! it, and classifies billing drift. The caller persists the reconciled state
//! and walks the operator through the returned plan.

use crate::action::RequiredAction;
use crate::classifier::SyncClassifier;
use crate::error::SyncError;
use crate::store::{BillingStore, CatalogStore};
use crate::supervisor::ActionChainSupervisor;
use boxkit_model::{CustomerId, DeliveryDate, Personalization, ProductId};
use boxkit_reconcile::{ReconcileConfig, ReconciledState, ReconciliationEngine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Subscription to sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Billing customer
    pub customer: CustomerId,
    /// Box product subscribed to
    pub box_product: ProductId,
}

/// Outcome of one sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPlan {
    /// Subscription the plan is for
    pub subscription: Subscription,
    /// Reconciled personalization and its adjustments
    pub reconciled: ReconciledState,
    /// Drift awaiting an operator, in priority order
    pub actions: Vec<RequiredAction>,
}

impl SyncPlan {
    /// Whether billing already matches the reconciled state
    #[inline]
    #[must_use]
    pub fn is_in_sync(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Sync service over the catalog and billing stores
pub struct BoxSyncService {
    catalog: Arc<dyn CatalogStore>,
    billing: Arc<dyn BillingStore>,
    engine: ReconciliationEngine,
}

impl std::fmt::Debug for BoxSyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxSyncService")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl BoxSyncService {
    /// Create service
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>, billing: Arc<dyn BillingStore>, config: ReconcileConfig) -> Self {
        Self {
            catalog,
            billing,
            engine: ReconciliationEngine::new(config),
        }
    }

    /// Reconcile and classify one subscription for a delivery date
    ///
    /// # Errors
    /// Returns [`SyncError::Store`] if the box is missing or a store fails
    pub async fn plan(
        &self,
        subscription: &Subscription,
        previous: &Personalization,
        date: DeliveryDate,
    ) -> Result<SyncPlan, SyncError> {
        let produce_box = self
            .catalog
            .box_by_delivery_date(&subscription.box_product, date)
            .await
            .map_err(|e| {
                tracing::error!(box_product = %subscription.box_product, %date, error = %e, "catalog lookup failed");
                e
            })?;

        let reconciled = self.engine.reconcile(previous, &produce_box);
        let records = self
            .billing
            .list_billing_records(&subscription.customer, date)
            .await
            .map_err(|e| {
                tracing::error!(customer = %subscription.customer, %date, error = %e, "billing lookup failed");
                e
            })?;

        let actions = SyncClassifier::new(&produce_box).classify(&reconciled, &records);

        tracing::info!(
            customer = %subscription.customer,
            %date,
            adjustments = reconciled.adjustments.len(),
            actions = actions.len(),
            "sync planned"
        );

        Ok(SyncPlan {
            subscription: subscription.clone(),
            reconciled,
            actions,
        })
    }

    /// Supervisor over the plan's reconciled state, already started
    ///
    /// # Errors
    /// Never fails for a fresh plan; the error type is shared with `start`
    pub fn supervise(&self, plan: SyncPlan) -> Result<ActionChainSupervisor, SyncError> {
        let mut supervisor = ActionChainSupervisor::new(
            Arc::clone(&self.billing),
            plan.subscription.customer,
            plan.reconciled.state,
        );
        supervisor.start(plan.actions)?;
        Ok(supervisor)
    }
}
