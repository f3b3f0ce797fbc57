//! Composes and transmits order notifications.
//!
//! Three kinds exist: the customer receipt and the business fulfilment alert
//! (both authorized only by the transition into `paid`), and the free-text
//! status update an administrator composes by hand. The dispatcher never
//! touches order state; deciding *whether* a transition authorizes a send is
//! the caller's job.

use std::fmt::Write as _;
use std::sync::Arc;

use bigdecimal::Zero;

use crate::domain::errors::NotificationError;
use crate::domain::order::{format_amount, DeliveryType, OrderView, PaymentMethod};
use crate::domain::ports::Mailer;

pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    fulfilment_address: String,
}

impl NotificationDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, fulfilment_address: String) -> Self {
        Self {
            mailer,
            fulfilment_address,
        }
    }

    /// Customer receipt for a freshly confirmed payment.
    pub fn send_receipt(&self, order: &OrderView) -> Result<(), NotificationError> {
        self.mailer.send(
            &order.customer.email,
            &receipt_subject(order),
            &receipt_body(order),
        )
    }

    /// Alert to the business so fulfilment can start.
    pub fn send_fulfilment_alert(&self, order: &OrderView) -> Result<(), NotificationError> {
        self.mailer.send(
            &self.fulfilment_address,
            &fulfilment_subject(order),
            &fulfilment_body(order),
        )
    }

    /// Admin-composed status update. Subject and body are free text; nothing
    /// here changes the order's status.
    pub fn send_status_update(
        &self,
        order: &OrderView,
        subject: &str,
        body: &str,
    ) -> Result<(), NotificationError> {
        self.mailer.send(&order.customer.email, subject, body)
    }
}

// ── Content builders (pure, no transmission) ─────────────────────────────────

pub fn payment_method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Gateway => "Online payment",
        PaymentMethod::BankTransfer => "Bank transfer (EFT)",
    }
}

fn delivery_line(order: &OrderView) -> String {
    match order.delivery_type {
        DeliveryType::Pickup => "Collection: we will be in touch when your order is ready".to_string(),
        DeliveryType::Delivery => format!(
            "Delivery to: {}",
            order.delivery_address.as_deref().unwrap_or("(no address on file)")
        ),
        DeliveryType::Digital => {
            "Digital delivery: your items will be sent to this e-mail address".to_string()
        }
    }
}

/// Itemized listing shared by the receipt and the fulfilment alert: one line
/// per item, then subtotal, delivery fee (only when nonzero) and total.
fn itemized_summary(order: &OrderView) -> String {
    let mut out = String::new();
    for line in &order.lines {
        let _ = writeln!(
            out,
            "  {} x{} @ {} = {}",
            line.product_name,
            line.quantity,
            format_amount(&line.unit_price),
            format_amount(&line.line_total()),
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Subtotal: {}", format_amount(&order.subtotal()));
    if !order.delivery_fee.is_zero() {
        let _ = writeln!(out, "Delivery fee: {}", format_amount(&order.delivery_fee));
    }
    let _ = writeln!(out, "Total: {}", format_amount(&order.total));
    out
}

pub fn receipt_subject(order: &OrderView) -> String {
    format!("Order {} confirmed", order.reference)
}

pub fn receipt_body(order: &OrderView) -> String {
    format!(
        "Hi {},\n\n\
         We have received your payment for order {}.\n\n\
         Your items:\n{}\n\
         {}\n\
         Payment method: {}\n\n\
         Thank you for your support!\n",
        order.customer.name,
        order.reference,
        itemized_summary(order),
        delivery_line(order),
        payment_method_label(order.payment_method),
    )
}

pub fn fulfilment_subject(order: &OrderView) -> String {
    format!("New paid order {}", order.reference)
}

pub fn fulfilment_body(order: &OrderView) -> String {
    format!(
        "Order {} has been paid and is ready for fulfilment.\n\n\
         Items:\n{}\n\
         {}\n\
         Payment method: {}\n\n\
         Customer: {}\n\
         E-mail: {}\n\
         Phone: {}\n",
        order.reference,
        itemized_summary(order),
        delivery_line(order),
        payment_method_label(order.payment_method),
        order.customer.name,
        order.customer.email,
        order.customer.phone,
    )
}
