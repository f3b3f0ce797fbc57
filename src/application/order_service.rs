//! Checkout and admin-side order operations.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    format_amount, CustomerDetails, DeliveryType, OrderDraft, OrderLineDraft, OrderPage,
    OrderView, PaymentMethod, ProductView,
};
use crate::domain::ports::{OrderRepository, ProductCatalog};
use crate::domain::status::{self, OrderStatus, Transition};

#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Checkout input after DTO deserialization. Deliberately carries no prices:
/// the cart's stored prices are display-only and every line is re-priced from
/// the canonical catalog here.
#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub lines: Vec<CheckoutLine>,
    pub delivery_type: DeliveryType,
    pub delivery_address: Option<String>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Flat fee added to the total for door-to-door delivery orders.
    pub delivery_fee: BigDecimal,
    /// Base URL of the gateway's process endpoint; the order reference and
    /// amount are appended at redirect time.
    pub gateway_process_url: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: OrderView,
    /// Where to send the customer next. `None` for bank-transfer orders.
    pub payment_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub updated: bool,
}

#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    catalog: Arc<dyn ProductCatalog>,
    settings: CheckoutSettings,
}

impl OrderService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        catalog: Arc<dyn ProductCatalog>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            repo,
            catalog,
            settings,
        }
    }

    /// Turn a cart into a persisted order.
    ///
    /// Lines are snapshotted against the canonical catalog, the total is
    /// computed once and never changes again. Gateway orders move straight to
    /// `awaiting_payment` and get a redirect URL; bank-transfer orders stay
    /// `pending` for manual reconciliation.
    pub fn checkout(&self, input: CheckoutInput) -> Result<CheckoutOutcome, DomainError> {
        validate(&input)?;

        let ids: Vec<Uuid> = input.lines.iter().map(|l| l.product_id).collect();
        let products = self.catalog.find_many(&ids)?;

        let lines = input
            .lines
            .iter()
            .map(|line| {
                let product = products
                    .iter()
                    .find(|p| p.id == line.product_id)
                    .ok_or_else(|| {
                        DomainError::InvalidInput(format!("unknown product {}", line.product_id))
                    })?;
                Ok(snapshot_line(product, line.quantity))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let subtotal = lines.iter().fold(BigDecimal::from(0), |acc, l| {
            acc + &l.unit_price * BigDecimal::from(l.quantity)
        });
        let delivery_fee = match input.delivery_type {
            DeliveryType::Delivery => self.settings.delivery_fee.clone(),
            DeliveryType::Pickup | DeliveryType::Digital => BigDecimal::from(0),
        };
        let total = &subtotal + &delivery_fee;

        let delivery_address = match input.delivery_type {
            DeliveryType::Delivery => input.delivery_address,
            _ => None,
        };

        let draft = OrderDraft {
            reference: Uuid::new_v4().simple().to_string(),
            customer: CustomerDetails {
                name: input.customer_name,
                email: input.customer_email,
                phone: input.customer_phone,
            },
            lines,
            delivery_type: input.delivery_type,
            delivery_address,
            payment_method: input.payment_method,
            delivery_fee,
            total,
        };

        let mut order = self.repo.create(draft)?;
        log::info!(
            "order {} created ({} lines, total {})",
            order.reference,
            order.lines.len(),
            format_amount(&order.total)
        );

        let payment_url = if input.payment_method == PaymentMethod::Gateway {
            if let Transition::Apply { to } = status::on_checkout_redirect(order.status) {
                if self.repo.transition(order.id, &[order.status], to)? {
                    order.status = to;
                }
            }
            Some(format!(
                "{}?reference={}&amount={}",
                self.settings.gateway_process_url,
                order.reference,
                format_amount(&order.total)
            ))
        } else {
            None
        };

        Ok(CheckoutOutcome { order, payment_url })
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        self.repo.find_by_id(id)
    }

    pub fn list_orders(&self, page: i64, limit: i64) -> Result<OrderPage, DomainError> {
        self.repo.list(page, limit)
    }

    /// Apply an administrator's status change. Illegal targets are a no-op:
    /// the current status is reported back with `updated: false` and nothing
    /// is written.
    pub fn set_status(&self, id: Uuid, target: OrderStatus) -> Result<StatusChange, DomainError> {
        let order = self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)?;
        match status::on_admin_set(order.status, target) {
            Transition::Apply { to } => {
                if self.repo.transition(order.id, &[order.status], to)? {
                    log::info!("order {} moved to {}", order.reference, to.as_str());
                    Ok(StatusChange {
                        status: to,
                        updated: true,
                    })
                } else {
                    // Raced another admin; report whatever won.
                    let current = self
                        .repo
                        .find_by_id(id)?
                        .map(|o| o.status)
                        .unwrap_or(order.status);
                    Ok(StatusChange {
                        status: current,
                        updated: false,
                    })
                }
            }
            Transition::Noop => Ok(StatusChange {
                status: order.status,
                updated: false,
            }),
        }
    }
}

fn snapshot_line(product: &ProductView, quantity: i32) -> OrderLineDraft {
    OrderLineDraft {
        product_id: product.id,
        product_name: product.name.clone(),
        quantity,
        unit_price: product.unit_price.clone(),
    }
}

fn validate(input: &CheckoutInput) -> Result<(), DomainError> {
    if input.customer_name.trim().is_empty() {
        return Err(DomainError::InvalidInput("customer name is required".to_string()));
    }
    if input.customer_email.trim().is_empty() {
        return Err(DomainError::InvalidInput("customer e-mail is required".to_string()));
    }
    if input.lines.is_empty() {
        return Err(DomainError::InvalidInput("order has no items".to_string()));
    }
    if input.lines.iter().any(|l| l.quantity < 1) {
        return Err(DomainError::InvalidInput(
            "item quantity must be at least 1".to_string(),
        ));
    }
    if input.delivery_type == DeliveryType::Delivery
        && input
            .delivery_address
            .as_deref()
            .map_or(true, |a| a.trim().is_empty())
    {
        return Err(DomainError::InvalidInput(
            "delivery address is required for delivery orders".to_string(),
        ));
    }
    Ok(())
}
