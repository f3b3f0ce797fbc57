use uuid::Uuid;

use super::errors::{DomainError, NotificationError};
use super::order::{NewProduct, OrderDraft, OrderPage, OrderView, ProductView};
use super::status::OrderStatus;

/// Persistence port for orders.
///
/// `transition` is the only mutation after creation: a conditional write that
/// moves the order to `to` if and only if its current status is one of
/// `from`, stamping `paid_at` together with the status when `to` is `paid`.
/// Returning `false` means the precondition did not hold (a duplicate or
/// racing request) and nothing was written. The status update, its
/// timestamps, and the transition's audit event are one atomic write.
pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, draft: OrderDraft) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn find_by_reference(&self, reference: &str) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<OrderPage, DomainError>;
    fn transition(
        &self,
        id: Uuid,
        from: &[OrderStatus],
        to: OrderStatus,
    ) -> Result<bool, DomainError>;
}

/// Canonical product catalog. Checkout prices come from here, never from the
/// client-held cart.
pub trait ProductCatalog: Send + Sync + 'static {
    fn create(&self, product: NewProduct) -> Result<ProductView, DomainError>;
    fn list(&self) -> Result<Vec<ProductView>, DomainError>;
    fn find_many(&self, ids: &[Uuid]) -> Result<Vec<ProductView>, DomainError>;
}

/// Outbound e-mail transport. Implementations deliver a plain-text message;
/// composition is the dispatcher's job.
pub trait Mailer: Send + Sync + 'static {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError>;
}

/// Capability check for the admin surface. Swappable so the authorization
/// rule can be tested independently of order logic.
pub trait AdminPolicy: Send + Sync + 'static {
    fn is_admin(&self, token: &str) -> bool;
}
