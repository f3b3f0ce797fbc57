//! Payment-gateway webhook.
//!
//! The gateway POSTs a URL-form-encoded notification after the customer
//! completes (or abandons) payment, and redelivers it until it gets a
//! success acknowledgment. The handler therefore answers 200 for every
//! durably processed payload, including duplicates and non-success
//! outcomes, and reserves 4xx for input it could never match to an order.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::payment::IncomingPaymentNotification;
use crate::errors::AppError;
use crate::state::AppState;

/// Raw webhook fields. Everything is optional at this layer; validation
/// happens when the form is lifted into `IncomingPaymentNotification`.
/// Gateway-specific fields we do not interpret are ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentNotificationForm {
    pub order_reference: Option<String>,
    pub payment_status: Option<String>,
}

/// POST /payments/notify
///
/// Asynchronous payment notification from the gateway. May arrive multiple
/// times per order; processing is idempotent and notifications are sent only
/// by the delivery that first confirms the payment.
#[utoipa::path(
    post,
    path = "/payments/notify",
    request_body(
        content = PaymentNotificationForm,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "Notification durably processed (including no-ops)"),
        (status = 400, description = "Malformed payload or missing order reference"),
        (status = 404, description = "Order reference does not match any order"),
        (status = 500, description = "Store failure; safe for the gateway to retry"),
    ),
    tag = "payments"
)]
pub async fn payment_notification(
    state: web::Data<AppState>,
    form: web::Form<PaymentNotificationForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let notification =
        IncomingPaymentNotification::from_fields(form.order_reference, form.payment_status)?;

    let service = state.payments.clone();
    let outcome = web::block(move || service.reconcile(&notification))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    log::debug!("payment notification processed: {outcome:?}");

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App};

    use crate::configure_api;
    use crate::domain::ports::OrderRepository;
    use crate::domain::status::OrderStatus;
    use crate::testsupport::{seeded_order, test_state};

    #[actix_web::test]
    async fn duplicate_webhook_confirms_once_and_sends_one_receipt() {
        let (state, repo, _catalog, mailer) = test_state();
        let order = seeded_order(&repo, OrderStatus::Pending);
        let app =
            test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_api))
                .await;

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/payments/notify")
                .set_form([
                    ("order_reference", order.reference.as_str()),
                    ("payment_status", "COMPLETE"),
                ])
                .to_request();
            let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["success"], true);
        }

        let stored = repo.find_by_id(order.id).expect("find").expect("exists");
        assert_eq!(stored.status, OrderStatus::Paid);
        // One receipt to the customer, one fulfilment alert; not two of each.
        assert_eq!(mailer.sent().len(), 2);
    }

    #[actix_web::test]
    async fn non_success_status_is_acknowledged_but_inert() {
        let (state, repo, _catalog, mailer) = test_state();
        let order = seeded_order(&repo, OrderStatus::Pending);
        let app =
            test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_api))
                .await;

        let req = test::TestRequest::post()
            .uri("/payments/notify")
            .set_form([
                ("order_reference", order.reference.as_str()),
                ("payment_status", "CANCELLED"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

        let stored = repo.find_by_id(order.id).expect("find").expect("exists");
        assert_eq!(stored.status, OrderStatus::Pending);
        assert!(mailer.sent().is_empty());
    }

    #[actix_web::test]
    async fn missing_order_reference_is_a_client_error() {
        let (state, repo, _catalog, mailer) = test_state();
        let order = seeded_order(&repo, OrderStatus::Pending);
        let app =
            test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_api))
                .await;

        let req = test::TestRequest::post()
            .uri("/payments/notify")
            .set_form([("payment_status", "COMPLETE")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        // No order in the store was touched.
        let stored = repo.find_by_id(order.id).expect("find").expect("exists");
        assert_eq!(stored.status, OrderStatus::Pending);
        assert!(mailer.sent().is_empty());
    }

    #[actix_web::test]
    async fn unknown_reference_is_an_error_and_creates_nothing() {
        let (state, repo, _catalog, _mailer) = test_state();
        let app =
            test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_api))
                .await;

        let req = test::TestRequest::post()
            .uri("/payments/notify")
            .set_form([
                ("order_reference", "no-such-order"),
                ("payment_status", "COMPLETE"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
        assert_eq!(repo.order_count(), 0);
    }

    #[actix_web::test]
    async fn unrecognized_gateway_fields_are_ignored() {
        let (state, repo, _catalog, _mailer) = test_state();
        let order = seeded_order(&repo, OrderStatus::AwaitingPayment);
        let app =
            test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_api))
                .await;

        let req = test::TestRequest::post()
            .uri("/payments/notify")
            .set_form([
                ("order_reference", order.reference.as_str()),
                ("payment_status", "COMPLETE"),
                ("gateway_txn_id", "9911"),
                ("signature", "abcd1234"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

        let stored = repo.find_by_id(order.id).expect("find").expect("exists");
        assert_eq!(stored.status, OrderStatus::Paid);
    }
}
