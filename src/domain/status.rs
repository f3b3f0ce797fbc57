use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of an order.
///
/// The chain is forward-only: `pending → awaiting_payment → paid →
/// processing → shipped → delivered`. There is no cancelled or refunded
/// state; see DESIGN.md for why that gap is left open rather than guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    AwaitingPayment,
    Paid,
    Processing,
    Shipped,
    Delivered,
}

/// Statuses from which a successful payment notification may confirm an
/// order. Used as the predicate of the conditional store write.
pub const PAYMENT_ENTRY: [OrderStatus; 2] = [OrderStatus::Pending, OrderStatus::AwaitingPayment];

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::AwaitingPayment => "awaiting_payment",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "awaiting_payment" => Some(OrderStatus::AwaitingPayment),
            "paid" => Some(OrderStatus::Paid),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }

    /// Payment has been confirmed for this order (or it is further along).
    pub fn is_paid_or_later(self) -> bool {
        !matches!(self, OrderStatus::Pending | OrderStatus::AwaitingPayment)
    }

    /// The single legal next step an administrator may move a paid order to.
    pub fn next_fulfilment_step(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Paid => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            _ => None,
        }
    }
}

/// Outcome of asking the state machine about a transition. `Noop` covers
/// every illegal or repeated request: the order is left exactly as it was
/// and no side effect is authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Apply { to: OrderStatus },
    Noop,
}

/// A validated, successful payment notification arrived for an order in
/// `current` status. Only the two entry states confirm; anything later is a
/// duplicate delivery and must not re-trigger notifications.
pub fn on_payment_success(current: OrderStatus) -> Transition {
    if PAYMENT_ENTRY.contains(&current) {
        Transition::Apply {
            to: OrderStatus::Paid,
        }
    } else {
        Transition::Noop
    }
}

/// Checkout handed the customer over to the gateway.
pub fn on_checkout_redirect(current: OrderStatus) -> Transition {
    if current == OrderStatus::Pending {
        Transition::Apply {
            to: OrderStatus::AwaitingPayment,
        }
    } else {
        Transition::Noop
    }
}

/// An administrator asked to move the order to `target`. Only the next step
/// of the fulfilment chain is legal; everything else (backwards jumps, skips,
/// re-applying the current status) is a no-op.
pub fn on_admin_set(current: OrderStatus, target: OrderStatus) -> Transition {
    if current.next_fulfilment_step() == Some(target) {
        Transition::Apply { to: target }
    } else {
        Transition::Noop
    }
}
