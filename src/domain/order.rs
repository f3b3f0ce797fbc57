use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::status::OrderStatus;

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryType {
    Pickup,
    Delivery,
    Digital,
}

impl DeliveryType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryType::Pickup => "pickup",
            DeliveryType::Delivery => "delivery",
            DeliveryType::Digital => "digital",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pickup" => Some(DeliveryType::Pickup),
            "delivery" => Some(DeliveryType::Delivery),
            "digital" => Some(DeliveryType::Digital),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Gateway,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Gateway => "gateway",
            PaymentMethod::BankTransfer => "bank-transfer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gateway" => Some(PaymentMethod::Gateway),
            "bank-transfer" => Some(PaymentMethod::BankTransfer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// One line of an order: a snapshot of the product as it was sold. The name
/// and unit price are copied at checkout time so later catalog edits never
/// change what the customer agreed to pay.
#[derive(Debug, Clone)]
pub struct OrderLineDraft {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl OrderLineView {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

/// Everything the store needs to persist a new order. The total is computed
/// by the checkout service before the draft is built and never recomputed or
/// amended afterwards.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub reference: String,
    pub customer: CustomerDetails,
    pub lines: Vec<OrderLineDraft>,
    pub delivery_type: DeliveryType,
    pub delivery_address: Option<String>,
    pub payment_method: PaymentMethod,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub reference: String,
    pub customer: CustomerDetails,
    pub lines: Vec<OrderLineView>,
    pub delivery_type: DeliveryType,
    pub delivery_address: Option<String>,
    pub payment_method: PaymentMethod,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl OrderView {
    /// Sum of the line totals, excluding the delivery fee.
    pub fn subtotal(&self) -> BigDecimal {
        self.lines
            .iter()
            .fold(BigDecimal::from(0), |acc, l| acc + l.line_total())
    }
}

#[derive(Debug, Clone)]
pub struct OrderPage {
    pub items: Vec<OrderView>,
    pub total: i64,
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub unit_price: BigDecimal,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub unit_price: BigDecimal,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Render a money amount with two decimal places, e.g. "380.00".
pub fn format_amount(amount: &BigDecimal) -> String {
    amount.with_scale_round(2, RoundingMode::HalfUp).to_string()
}
