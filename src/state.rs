//! Wiring of concrete adapters into the application services.

use std::sync::Arc;

use crate::application::notifications::NotificationDispatcher;
use crate::application::order_service::{CheckoutSettings, OrderService};
use crate::application::payment_service::PaymentService;
use crate::config::Config;
use crate::db::DbPool;
use crate::domain::errors::NotificationError;
use crate::domain::ports::{AdminPolicy, Mailer, OrderRepository, ProductCatalog};
use crate::infrastructure::admin::TokenAdminPolicy;
use crate::infrastructure::mailer::{LogMailer, SmtpMailer};
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::product_repo::DieselProductCatalog;

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub payments: PaymentService,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub admin: Arc<dyn AdminPolicy>,
}

impl AppState {
    pub fn build(pool: DbPool, config: &Config) -> Result<Self, NotificationError> {
        let repo: Arc<dyn OrderRepository> = Arc::new(DieselOrderRepository::new(pool.clone()));
        let catalog: Arc<dyn ProductCatalog> = Arc::new(DieselProductCatalog::new(pool));

        let mailer: Arc<dyn Mailer> = match &config.mail.smtp_host {
            Some(host) => {
                let credentials = config
                    .mail
                    .smtp_username
                    .clone()
                    .zip(config.mail.smtp_password.clone());
                Arc::new(SmtpMailer::new(
                    host,
                    config.mail.smtp_port,
                    credentials,
                    &config.mail.from_address,
                )?)
            }
            None => {
                log::warn!("SMTP_HOST is not set; notifications will only be logged");
                Arc::new(LogMailer)
            }
        };
        let dispatcher = Arc::new(NotificationDispatcher::new(
            mailer,
            config.mail.fulfilment_address.clone(),
        ));

        let settings = CheckoutSettings {
            delivery_fee: config.delivery_fee.clone(),
            gateway_process_url: config.gateway_process_url.clone(),
        };

        Ok(Self {
            orders: OrderService::new(repo.clone(), catalog.clone(), settings),
            payments: PaymentService::new(repo, dispatcher.clone()),
            dispatcher,
            catalog,
            admin: Arc::new(TokenAdminPolicy::new(config.admin_token.clone())),
        })
    }
}
