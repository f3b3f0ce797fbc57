pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

#[cfg(test)]
pub(crate) mod testsupport;

use actix_web::middleware::Logger;
use actix_web::{error::InternalError, web, App, HttpResponse, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::Config;
pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::list_orders,
        handlers::orders::set_order_status,
        handlers::orders::send_order_email,
        handlers::payments::payment_notification,
    ),
    components(schemas(
        handlers::products::CreateProductRequest,
        handlers::products::ProductResponse,
        handlers::orders::CheckoutLineRequest,
        handlers::orders::CreateOrderRequest,
        handlers::orders::CreateOrderResponse,
        handlers::orders::OrderLineResponse,
        handlers::orders::OrderResponse,
        handlers::orders::ListOrdersParams,
        handlers::orders::ListOrdersResponse,
        handlers::orders::SetStatusRequest,
        handlers::orders::SetStatusResponse,
        handlers::orders::SendEmailRequest,
        handlers::payments::PaymentNotificationForm,
        domain::status::OrderStatus,
        domain::order::DeliveryType,
        domain::order::PaymentMethod,
    )),
    tags(
        (name = "products", description = "Canonical product catalog"),
        (name = "orders", description = "Checkout and fulfilment"),
        (name = "payments", description = "Payment-gateway reconciliation"),
    )
)]
pub struct ApiDoc;

/// Route table, shared between the real server and handler tests.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .route("", web::post().to(handlers::products::create_product))
            .route("", web::get().to(handlers::products::list_products)),
    )
    .service(
        web::scope("/orders")
            .route("", web::post().to(handlers::orders::create_order))
            .route("", web::get().to(handlers::orders::list_orders))
            .route("/{id}", web::get().to(handlers::orders::get_order))
            .route("/{id}/status", web::post().to(handlers::orders::set_order_status))
            .route("/{id}/notify", web::post().to(handlers::orders::send_order_email)),
    )
    .service(
        web::scope("/payments")
            .route("/notify", web::post().to(handlers::payments::payment_notification)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            // The payment gateway's retry policy keys off our response code,
            // so malformed bodies must come back as clean 400s with a JSON
            // error object rather than the default plain-text rejection.
            .app_data(web::FormConfig::default().error_handler(|err, _req| {
                InternalError::from_response(
                    err,
                    HttpResponse::BadRequest()
                        .json(serde_json::json!({ "error": "malformed form payload" })),
                )
                .into()
            }))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                InternalError::from_response(
                    err,
                    HttpResponse::BadRequest()
                        .json(serde_json::json!({ "error": "malformed JSON payload" })),
                )
                .into()
            }))
            .wrap(Logger::default())
            .configure(configure_api)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
