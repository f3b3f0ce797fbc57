//! In-memory port implementations for tests. Logic tests run against these
//! instead of a database; the diesel repositories have their own
//! Docker-gated tests.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::application::notifications::NotificationDispatcher;
use crate::application::order_service::{CheckoutSettings, OrderService};
use crate::application::payment_service::PaymentService;
use crate::domain::errors::{DomainError, NotificationError};
use crate::domain::order::{
    CustomerDetails, DeliveryType, NewProduct, OrderDraft, OrderLineDraft, OrderLineView,
    OrderPage, OrderView, PaymentMethod, ProductView,
};
use crate::domain::ports::{AdminPolicy, Mailer, OrderRepository, ProductCatalog};
use crate::domain::status::OrderStatus;
use crate::state::AppState;

pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<HashMap<Uuid, OrderView>>,
}

impl InMemoryOrderRepository {
    pub fn order_count(&self) -> usize {
        self.orders.lock().expect("lock").len()
    }

    /// Test hook: place an order directly into a given status.
    pub fn force_status(&self, id: Uuid, status: OrderStatus) {
        let mut orders = self.orders.lock().expect("lock");
        if let Some(order) = orders.get_mut(&id) {
            order.status = status;
            if status.is_paid_or_later() && order.paid_at.is_none() {
                order.paid_at = Some(Utc::now());
            }
        }
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, draft: OrderDraft) -> Result<OrderView, DomainError> {
        let order = OrderView {
            id: Uuid::new_v4(),
            reference: draft.reference,
            customer: draft.customer,
            lines: draft
                .lines
                .into_iter()
                .map(|l| OrderLineView {
                    id: Uuid::new_v4(),
                    product_id: l.product_id,
                    product_name: l.product_name,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect(),
            delivery_type: draft.delivery_type,
            delivery_address: draft.delivery_address,
            payment_method: draft.payment_method,
            delivery_fee: draft.delivery_fee,
            total: draft.total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            paid_at: None,
        };
        self.orders
            .lock()
            .expect("lock")
            .insert(order.id, order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        Ok(self.orders.lock().expect("lock").get(&id).cloned())
    }

    fn find_by_reference(&self, reference: &str) -> Result<Option<OrderView>, DomainError> {
        Ok(self
            .orders
            .lock()
            .expect("lock")
            .values()
            .find(|o| o.reference == reference)
            .cloned())
    }

    fn list(&self, page: i64, limit: i64) -> Result<OrderPage, DomainError> {
        let orders = self.orders.lock().expect("lock");
        let mut items: Vec<OrderView> = orders.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = items.len() as i64;
        let offset = ((page - 1) * limit).max(0) as usize;
        let items = items
            .into_iter()
            .skip(offset)
            .take(limit.max(0) as usize)
            .collect();
        Ok(OrderPage { items, total })
    }

    fn transition(
        &self,
        id: Uuid,
        from: &[OrderStatus],
        to: OrderStatus,
    ) -> Result<bool, DomainError> {
        // Single lock hold: the check and the write are one atomic step, the
        // in-memory analogue of the conditional UPDATE.
        let mut orders = self.orders.lock().expect("lock");
        let Some(order) = orders.get_mut(&id) else {
            return Ok(false);
        };
        if !from.contains(&order.status) {
            return Ok(false);
        }
        order.status = to;
        if to == OrderStatus::Paid {
            order.paid_at = Some(Utc::now());
        }
        Ok(true)
    }
}

/// Seed the repository with a known order: Tote Bag x2 @ 150.00 plus
/// Mug x1 @ 80.00, no delivery fee, total 380.00.
pub fn seeded_order(repo: &InMemoryOrderRepository, status: OrderStatus) -> OrderView {
    let draft = OrderDraft {
        reference: Uuid::new_v4().simple().to_string(),
        customer: CustomerDetails {
            name: "Thandi".to_string(),
            email: "thandi@example.org".to_string(),
            phone: "555-0100".to_string(),
        },
        lines: vec![
            OrderLineDraft {
                product_id: Uuid::new_v4(),
                product_name: "Tote Bag".to_string(),
                quantity: 2,
                unit_price: BigDecimal::from_str("150.00").expect("valid decimal"),
            },
            OrderLineDraft {
                product_id: Uuid::new_v4(),
                product_name: "Mug".to_string(),
                quantity: 1,
                unit_price: BigDecimal::from_str("80.00").expect("valid decimal"),
            },
        ],
        delivery_type: DeliveryType::Pickup,
        delivery_address: None,
        payment_method: PaymentMethod::Gateway,
        delivery_fee: BigDecimal::from(0),
        total: BigDecimal::from_str("380.00").expect("valid decimal"),
    };
    let order = repo.create(draft).expect("seed order");
    repo.force_status(order.id, status);
    repo.find_by_id(order.id).expect("find").expect("exists")
}

// ── Product catalog ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryCatalog {
    products: Mutex<Vec<ProductView>>,
}

impl InMemoryCatalog {
    pub fn seed(&self, name: &str, unit_price: &str) -> ProductView {
        self.create(NewProduct {
            name: name.to_string(),
            unit_price: BigDecimal::from_str(unit_price).expect("valid decimal"),
            image_url: None,
        })
        .expect("seed product")
    }

    pub fn reprice(&self, id: Uuid, unit_price: &str) {
        let mut products = self.products.lock().expect("lock");
        if let Some(product) = products.iter_mut().find(|p| p.id == id) {
            product.unit_price = BigDecimal::from_str(unit_price).expect("valid decimal");
        }
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn create(&self, product: NewProduct) -> Result<ProductView, DomainError> {
        let view = ProductView {
            id: Uuid::new_v4(),
            name: product.name,
            unit_price: product.unit_price,
            image_url: product.image_url,
            created_at: Utc::now(),
        };
        self.products.lock().expect("lock").push(view.clone());
        Ok(view)
    }

    fn list(&self) -> Result<Vec<ProductView>, DomainError> {
        Ok(self.products.lock().expect("lock").clone())
    }

    fn find_many(&self, ids: &[Uuid]) -> Result<Vec<ProductView>, DomainError> {
        let products = self.products.lock().expect("lock");
        Ok(products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

// ── Mailers ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().expect("lock").clone()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        self.sent.lock().expect("lock").push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Always fails; for asserting that transport failure never unwinds state.
pub struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), NotificationError> {
        Err(NotificationError::Transport(
            "connection refused".to_string(),
        ))
    }
}

// ── Admin policy ─────────────────────────────────────────────────────────────

pub struct StaticAdminPolicy {
    token: String,
}

impl StaticAdminPolicy {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }
}

impl AdminPolicy for StaticAdminPolicy {
    fn is_admin(&self, token: &str) -> bool {
        token == self.token
    }
}

// ── Fully wired in-memory application state ──────────────────────────────────

pub fn test_state() -> (
    AppState,
    Arc<InMemoryOrderRepository>,
    Arc<InMemoryCatalog>,
    Arc<RecordingMailer>,
) {
    let repo = Arc::new(InMemoryOrderRepository::default());
    let catalog = Arc::new(InMemoryCatalog::default());
    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher = Arc::new(NotificationDispatcher::new(
        mailer.clone(),
        "orders@example.org".to_string(),
    ));
    let settings = CheckoutSettings {
        delivery_fee: BigDecimal::from(0),
        gateway_process_url: "https://pay.example.org/process".to_string(),
    };
    let state = AppState {
        orders: OrderService::new(repo.clone(), catalog.clone(), settings),
        payments: PaymentService::new(repo.clone(), dispatcher.clone()),
        dispatcher,
        catalog: catalog.clone(),
        admin: Arc::new(StaticAdminPolicy::new(TEST_ADMIN_TOKEN)),
    };
    (state, repo, catalog, mailer)
}
