use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::{format_amount, NewProduct, ProductView};
use crate::errors::AppError;
use crate::handlers::AdminGuard;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "150.00"
    pub unit_price: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub unit_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: String,
}

impl From<ProductView> for ProductResponse {
    fn from(product: ProductView) -> Self {
        Self {
            id: product.id,
            name: product.name,
            unit_price: format_amount(&product.unit_price),
            image_url: product.image_url,
            created_at: product.created_at.to_rfc3339(),
        }
    }
}

/// POST /products
///
/// Adds a product to the canonical catalog.
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid name or price"),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn create_product(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("product name is required".to_string()));
    }
    let unit_price = BigDecimal::from_str(&body.unit_price).map_err(|e| {
        AppError::BadRequest(format!("Invalid unit_price '{}': {}", body.unit_price, e))
    })?;
    if unit_price < BigDecimal::from(0) {
        return Err(AppError::BadRequest(
            "unit_price must not be negative".to_string(),
        ));
    }

    let catalog = state.catalog.clone();
    let product = web::block(move || {
        catalog.create(NewProduct {
            name: body.name,
            unit_price,
            image_url: body.image_url,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// GET /products
///
/// Storefront catalog listing.
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products, newest first", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let catalog = state.catalog.clone();
    let products = web::block(move || catalog.list())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(
        products
            .into_iter()
            .map(ProductResponse::from)
            .collect::<Vec<_>>(),
    ))
}
