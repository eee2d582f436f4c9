//! Operator-driven action chain
//!
//! A small state machine that presents required actions one at a time and
//! applies each confirmed resolution before moving on.
//!
//! ```text
//! Idle --start--> AwaitingConfirmation(a1) --confirm--> AwaitingConfirmation(a2) --confirm--> Done
//!   \--start(empty)--------------------------------------------------------------------------^
//! ```
//!
//! The queue is fixed once started. Every confirmation is applied on its own;
//! abandoning the chain keeps confirmed mutations and discards the rest.
//!
//! A confirmation that fails part way through its billing writes leaves the
//! action pending. Confirming it again with the same resolution resumes after
//! the last item written.

use crate::action::{ActionId, ActionItem, ActionKind, RequiredAction, Resolution};
use crate::error::SupervisorError;
use crate::store::BillingStore;
use boxkit_model::{CustomerId, EntryKind, ListKind, NewBillingRecord, Personalization};
use std::collections::VecDeque;
use std::sync::Arc;

/// Where the chain is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainState {
    /// Not started
    Idle,
    /// One action is waiting for the operator
    AwaitingConfirmation(RequiredAction),
    /// Every action has been answered
    Done,
}

/// A confirmed action and the resolution applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed {
    /// Action answered
    pub action: ActionId,
    /// Resolution applied
    pub resolution: Resolution,
}

/// What remains after the operator walks away
#[derive(Debug, Clone)]
pub struct Abandoned {
    /// Personalization with every confirmed mutation applied
    pub state: Personalization,
    /// Actions never confirmed, pending one first
    pub discarded: Vec<RequiredAction>,
}

/// Billing writes already made for the pending action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Progress {
    resolution: Resolution,
    applied: usize,
}

/// Sequential approval chain for one customer
pub struct ActionChainSupervisor {
    billing: Arc<dyn BillingStore>,
    customer: CustomerId,
    personalization: Personalization,
    chain: ChainState,
    queue: VecDeque<RequiredAction>,
    confirmed: Vec<Confirmed>,
    progress: Option<Progress>,
}

impl std::fmt::Debug for ActionChainSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionChainSupervisor")
            .field("customer", &self.customer)
            .field("chain", &self.chain)
            .field("queued", &self.queue.len())
            .field("confirmed", &self.confirmed.len())
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl ActionChainSupervisor {
    /// Create an idle supervisor over a personalization
    #[must_use]
    pub fn new(billing: Arc<dyn BillingStore>, customer: CustomerId, personalization: Personalization) -> Self {
        Self {
            billing,
            customer,
            personalization,
            chain: ChainState::Idle,
            queue: VecDeque::new(),
            confirmed: Vec::new(),
            progress: None,
        }
    }

    /// Begin the chain
    ///
    /// Returns the first action, or `None` if the queue is empty and the chain
    /// is already done.
    ///
    /// # Errors
    /// Returns [`SupervisorError::AlreadyStarted`] unless the chain is idle
    pub fn start(&mut self, actions: Vec<RequiredAction>) -> Result<Option<&RequiredAction>, SupervisorError> {
        if self.chain != ChainState::Idle {
            return Err(SupervisorError::AlreadyStarted);
        }
        tracing::info!(customer = %self.customer, actions = actions.len(), "action chain started");
        self.queue = actions.into();
        self.advance();
        Ok(self.current())
    }

    /// Action waiting for the operator
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&RequiredAction> {
        match &self.chain {
            ChainState::AwaitingConfirmation(action) => Some(action),
            ChainState::Idle | ChainState::Done => None,
        }
    }

    /// Chain state
    #[inline]
    #[must_use]
    pub fn chain(&self) -> &ChainState {
        &self.chain
    }

    /// Whether every action has been answered
    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.chain == ChainState::Done
    }

    /// Personalization with confirmed mutations applied
    #[inline]
    #[must_use]
    pub fn personalization(&self) -> &Personalization {
        &self.personalization
    }

    /// Confirmations applied so far
    #[inline]
    #[must_use]
    pub fn confirmed(&self) -> &[Confirmed] {
        &self.confirmed
    }

    /// Apply the operator's answer to the pending action
    ///
    /// Returns the next action, or `None` when the chain is done.
    ///
    /// # Errors
    /// - [`SupervisorError::NoPendingAction`] if nothing is pending
    /// - [`SupervisorError::StaleConfirmation`] if `action` is not the pending one
    /// - [`SupervisorError::ResolutionNotOffered`] if the resolution is not an option
    /// - [`SupervisorError::NoPersonalizationEntry`] if billed units have no
    ///   entry to go to; nothing is written
    /// - [`SupervisorError::Store`] if a billing write fails; the action stays
    ///   pending, earlier writes for it are kept and a retry skips them
    pub async fn confirm(
        &mut self,
        action: ActionId,
        resolution: Resolution,
    ) -> Result<Option<&RequiredAction>, SupervisorError> {
        let ChainState::AwaitingConfirmation(pending) = &self.chain else {
            return Err(SupervisorError::NoPendingAction);
        };
        if pending.id != action {
            return Err(SupervisorError::StaleConfirmation {
                pending: pending.id,
                received: action,
            });
        }
        if !pending.offers(resolution) {
            return Err(SupervisorError::ResolutionNotOffered {
                action,
                resolution,
            });
        }
        let pending = pending.clone();

        if matches!(
            resolution,
            Resolution::AddToPersonalization | Resolution::AdjustPersonalization
        ) {
            if let Some(item) = pending
                .items
                .iter()
                .find(|item| !item.can_carry_units_in(&self.personalization))
            {
                return Err(SupervisorError::NoPersonalizationEntry {
                    action,
                    title: item.title.clone(),
                });
            }
        }

        self.apply_billing(&pending, resolution).await?;
        apply_personalization(&mut self.personalization, &pending, resolution);

        tracing::info!(
            customer = %self.customer,
            action = %action,
            kind = ?pending.kind,
            resolution = %resolution,
            "action confirmed"
        );
        self.confirmed.push(Confirmed { action, resolution });
        self.advance();
        Ok(self.current())
    }

    /// End the chain early
    #[must_use]
    pub fn abandon(self) -> Abandoned {
        let mut discarded: Vec<RequiredAction> = Vec::with_capacity(self.queue.len() + 1);
        if let ChainState::AwaitingConfirmation(pending) = self.chain {
            discarded.push(pending);
        }
        discarded.extend(self.queue);
        if !discarded.is_empty() {
            tracing::warn!(
                customer = %self.customer,
                discarded = discarded.len(),
                "action chain abandoned"
            );
        }
        Abandoned {
            state: self.personalization,
            discarded,
        }
    }

    /// Finish, keeping the personalization
    #[must_use]
    pub fn into_personalization(self) -> Personalization {
        self.personalization
    }

    fn advance(&mut self) {
        self.progress = None;
        self.chain = match self.queue.pop_front() {
            Some(next) => ChainState::AwaitingConfirmation(next),
            None => {
                tracing::info!(customer = %self.customer, confirmed = self.confirmed.len(), "action chain done");
                ChainState::Done
            }
        };
    }

    async fn apply_billing(&mut self, action: &RequiredAction, resolution: Resolution) -> Result<(), SupervisorError> {
        let skip = match self.progress {
            Some(done) if done.resolution == resolution => done.applied,
            Some(done) => {
                tracing::warn!(
                    action = %action.id,
                    earlier = %done.resolution,
                    applied = done.applied,
                    "resolution changed after partial billing writes"
                );
                0
            }
            None => 0,
        };
        if skip > 0 {
            tracing::info!(action = %action.id, skipped = skip, "resuming billing writes");
        }

        for (index, item) in action.items.iter().enumerate().skip(skip) {
            self.apply_billing_item(item, resolution).await?;
            self.progress = Some(Progress {
                resolution,
                applied: index + 1,
            });
        }
        Ok(())
    }

    async fn apply_billing_item(&self, item: &ActionItem, resolution: Resolution) -> Result<(), SupervisorError> {
        match (resolution, &item.record) {
            (Resolution::CreateBilling, _) if item.expected > 0 => {
                let record = NewBillingRecord {
                    product_id: item.product_id,
                    product_title: item.title.clone(),
                    quantity: item.expected,
                    delivery_date: self.personalization.delivery_date,
                };
                let created = self.billing.create_billing_record(&self.customer, record).await?;
                tracing::debug!(record = %created.id, title = %item.title, "billing record created");
            }
            (Resolution::UpdateBillingQuantity, Some(record)) => {
                if item.expected == 0 {
                    self.billing.delete_billing_record(record).await?;
                } else {
                    self.billing.update_billing_quantity(record, item.expected).await?;
                }
            }
            (Resolution::DeleteBilling, Some(record)) => {
                self.billing.delete_billing_record(record).await?;
            }
            (resolution, None) if resolution.touches_billing() && resolution != Resolution::CreateBilling => {
                tracing::warn!(title = %item.title, %resolution, "no billing record to change");
            }
            _ => {}
        }
        Ok(())
    }
}

fn apply_personalization(state: &mut Personalization, action: &RequiredAction, resolution: Resolution) {
    for item in &action.items {
        match (resolution, action.kind) {
            (Resolution::RemoveFromPersonalization, ActionKind::OrphanedItem) => {
                if let Some(kind) = item.list.map(ListKind::entry_kind) {
                    state.remove(kind, item.product_id, &item.title);
                }
            }
            (Resolution::RemoveFromPersonalization, _) => set_extra_units(state, item, 0),
            (Resolution::AddToPersonalization | Resolution::AdjustPersonalization, _) => {
                set_extra_units(state, item, item.billed);
            }
            _ => {}
        }
    }
}

/// Make the personalization imply exactly `units` extra units of the item
fn set_extra_units(state: &mut Personalization, item: &ActionItem, units: u32) {
    let id = item.product_id;
    let title = item.title.as_str();

    match item.list {
        Some(ListKind::AddOnItems) => state.set_quantity(EntryKind::Addon, id, title, units),
        Some(list @ (ListKind::Including | ListKind::SwappedItems)) => {
            let kind = list.entry_kind();
            match state.find_mut(kind, id, title) {
                Some(entry) => entry.quantity = units.saturating_add(1),
                None => tracing::warn!(title, %list, "no entry to carry extra units"),
            }
        }
        Some(ListKind::RemovedItems) | None => {
            tracing::warn!(title, "extra units have no list to live in");
        }
    }
}
