pub mod orders;
pub mod payments;
pub mod products;

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};

use crate::errors::AppError;
use crate::state::AppState;

/// Header carrying the shared admin token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Extractor that gates a handler on the admin capability. Presence of this
/// parameter is the whole authorization check; the decision itself lives
/// behind the `AdminPolicy` port.
pub struct AdminGuard;

impl FromRequest for AdminGuard {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let authorized = req
            .app_data::<web::Data<AppState>>()
            .zip(
                req.headers()
                    .get(ADMIN_TOKEN_HEADER)
                    .and_then(|v| v.to_str().ok()),
            )
            .is_some_and(|(state, token)| state.admin.is_admin(token));
        ready(if authorized {
            Ok(AdminGuard)
        } else {
            Err(AppError::Unauthorized)
        })
    }
}
