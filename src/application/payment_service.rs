//! Reconciliation of asynchronous payment-gateway notifications.
//!
//! The gateway delivers at least once, with retries and no ordering
//! guarantee. Safety rests on two things: the pure state machine decides
//! whether a transition applies, and the store's conditional write decides
//! who wins when deliveries race. Notifications go out only when THIS call
//! won the transition into `paid`.

use std::sync::Arc;

use crate::application::notifications::NotificationDispatcher;
use crate::domain::errors::DomainError;
use crate::domain::payment::IncomingPaymentNotification;
use crate::domain::ports::OrderRepository;
use crate::domain::status::{self, Transition, PAYMENT_ENTRY};

/// What a durably processed notification amounted to. All three variants are
/// acknowledged to the gateway as success; the distinction exists for logging
/// and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// This delivery confirmed the payment; notifications were dispatched.
    Confirmed,
    /// The order was already paid (or further along). Nothing changed.
    AlreadyPaid,
    /// Non-success payment status. The order keeps its prior status so a
    /// later valid notification, or a human, can still complete it.
    Ignored,
}

#[derive(Clone)]
pub struct PaymentService {
    repo: Arc<dyn OrderRepository>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl PaymentService {
    pub fn new(repo: Arc<dyn OrderRepository>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { repo, dispatcher }
    }

    /// Apply one validated gateway notification.
    ///
    /// Unknown references are an error: an order is never created from a
    /// webhook. Everything else is idempotent and safe to retry wholesale.
    pub fn reconcile(
        &self,
        notification: &IncomingPaymentNotification,
    ) -> Result<ReconcileOutcome, DomainError> {
        let order = self
            .repo
            .find_by_reference(&notification.order_reference)?
            .ok_or(DomainError::NotFound)?;

        if !notification.is_success() {
            log::info!(
                "order {}: non-success payment status {:?}, leaving status {}",
                order.reference,
                notification.payment_status,
                order.status.as_str()
            );
            return Ok(ReconcileOutcome::Ignored);
        }

        match status::on_payment_success(order.status) {
            Transition::Noop => Ok(ReconcileOutcome::AlreadyPaid),
            Transition::Apply { to } => {
                if !self.repo.transition(order.id, &PAYMENT_ENTRY, to)? {
                    // A concurrent delivery won the same transition.
                    return Ok(ReconcileOutcome::AlreadyPaid);
                }
                let confirmed = self.repo.find_by_id(order.id)?.ok_or_else(|| {
                    DomainError::Internal(format!("order {} vanished after transition", order.id))
                })?;
                log::info!("order {} confirmed paid", confirmed.reference);

                // Best-effort: the transition is committed and stays
                // committed whether or not the mail goes out.
                if let Err(e) = self.dispatcher.send_receipt(&confirmed) {
                    log::warn!("order {}: receipt delivery failed: {}", confirmed.reference, e);
                }
                if let Err(e) = self.dispatcher.send_fulfilment_alert(&confirmed) {
                    log::warn!(
                        "order {}: fulfilment alert delivery failed: {}",
                        confirmed.reference,
                        e
                    );
                }
                Ok(ReconcileOutcome::Confirmed)
            }
        }
    }
}
