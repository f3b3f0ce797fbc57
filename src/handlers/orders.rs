use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::{CheckoutInput, CheckoutLine, CheckoutOutcome};
use crate::domain::errors::DomainError;
use crate::domain::order::{format_amount, DeliveryType, OrderView, PaymentMethod};
use crate::domain::status::OrderStatus;
use crate::errors::AppError;
use crate::handlers::AdminGuard;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Checkout payload. Carries no prices on purpose: every line is re-priced
/// from the canonical catalog server-side, so a tampered cart cannot change
/// what an order costs.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub lines: Vec<CheckoutLineRequest>,
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub delivery_address: Option<String>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: Uuid,
    pub reference: String,
    pub status: OrderStatus,
    /// Decimal total as a string to avoid floating-point issues, e.g. "380.00"
    pub total: String,
    /// Where to redirect the customer; absent for bank-transfer orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub reference: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub lines: Vec<OrderLineResponse>,
    pub delivery_type: DeliveryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    pub payment_method: PaymentMethod,
    pub delivery_fee: String,
    pub total: String,
    pub status: OrderStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        Self {
            id: order.id,
            reference: order.reference.clone(),
            customer_name: order.customer.name.clone(),
            customer_email: order.customer.email.clone(),
            customer_phone: order.customer.phone.clone(),
            lines: order
                .lines
                .iter()
                .map(|l| OrderLineResponse {
                    id: l.id,
                    product_id: l.product_id,
                    product_name: l.product_name.clone(),
                    quantity: l.quantity,
                    unit_price: format_amount(&l.unit_price),
                    line_total: format_amount(&l.line_total()),
                })
                .collect(),
            delivery_type: order.delivery_type,
            delivery_address: order.delivery_address.clone(),
            payment_method: order.payment_method,
            delivery_fee: format_amount(&order.delivery_fee),
            total: format_amount(&order.total),
            status: order.status,
            created_at: order.created_at.to_rfc3339(),
            paid_at: order.paid_at.map(|t| t.to_rfc3339()),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SetStatusResponse {
    pub id: Uuid,
    pub status: OrderStatus,
    /// `false` when the requested transition was a no-op (illegal target or
    /// lost race) and the order kept its current status.
    pub updated: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendEmailRequest {
    pub subject: String,
    pub body: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates an order from the shopper's cart: snapshots the items at
/// canonical catalog prices, computes the immutable total, and (for gateway
/// payment) hands back the redirect URL.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Validation failure (unknown product, bad quantity, missing delivery address)"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = CheckoutInput {
        customer_name: body.customer_name,
        customer_email: body.customer_email,
        customer_phone: body.customer_phone,
        lines: body
            .lines
            .into_iter()
            .map(|l| CheckoutLine {
                product_id: l.product_id,
                quantity: l.quantity,
            })
            .collect(),
        delivery_type: body.delivery_type,
        delivery_address: body.delivery_address,
        payment_method: body.payment_method,
    };

    let service = state.orders.clone();
    let CheckoutOutcome { order, payment_url } = web::block(move || service.checkout(input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CreateOrderResponse {
        id: order.id,
        reference: order.reference,
        status: order.status,
        total: format_amount(&order.total),
        payment_url,
    }))
}

/// GET /orders/{id}
///
/// Order confirmation view, itemized.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let service = state.orders.clone();
    let order = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    match order {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}

/// GET /orders
///
/// Admin listing, newest first. Lines are omitted from the listing; fetch a
/// single order for the itemized view.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let service = state.orders.clone();
    let result = web::block(move || service.list_orders(page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// POST /orders/{id}/status
///
/// Admin fulfilment step: paid → processing → shipped → delivered, one step
/// at a time. Anything else is a no-op reported as `updated: false`.
#[utoipa::path(
    post,
    path = "/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Transition applied, or no-op with current status", body = SetStatusResponse),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn set_order_status(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SetStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let target = body.into_inner().status;

    let service = state.orders.clone();
    let change = web::block(move || service.set_status(order_id, target))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(SetStatusResponse {
        id: order_id,
        status: change.status,
        updated: change.updated,
    }))
}

/// POST /orders/{id}/notify
///
/// Admin-composed status update e-mail to the order's customer. Does not
/// change the order; a failed send surfaces as 502 and leaves the order's
/// recorded status exactly as it was.
#[utoipa::path(
    post,
    path = "/orders/{id}/notify",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = SendEmailRequest,
    responses(
        (status = 200, description = "E-mail sent"),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 404, description = "Order not found"),
        (status = 502, description = "Notification transport failure"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn send_order_email(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SendEmailRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let request = body.into_inner();

    let service = state.orders.clone();
    let dispatcher = state.dispatcher.clone();
    let sent = web::block(move || {
        let order = service
            .get_order(order_id)?
            .ok_or(DomainError::NotFound)?;
        Ok::<_, DomainError>(dispatcher.send_status_update(&order, &request.subject, &request.body))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    sent.map_err(|e| AppError::Notification(e.to_string()))?;
    Ok(HttpResponse::Ok().json(json!({ "sent": true })))
}
