//! Environment-driven configuration, loaded once at startup.

use std::env;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP relay host. When unset, mail is logged instead of delivered.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// Sender address for all outgoing mail.
    pub from_address: String,
    /// Where fulfilment alerts for paid orders go.
    pub fulfilment_address: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Shared admin token; `None` disables the admin surface.
    pub admin_token: Option<String>,
    /// Flat fee for door-to-door delivery orders.
    pub delivery_fee: BigDecimal,
    /// Base URL of the payment gateway's process endpoint.
    pub gateway_process_url: String,
    pub mail: MailConfig,
}

fn optional(key: &'static str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = optional("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match optional("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            None => 8080,
        };
        let delivery_fee = match optional("DELIVERY_FEE") {
            Some(raw) => BigDecimal::from_str(&raw)
                .map_err(|_| ConfigError::Invalid("DELIVERY_FEE", raw))?,
            None => BigDecimal::from(0),
        };
        let smtp_port = match optional("SMTP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("SMTP_PORT", raw))?,
            None => 587,
        };
        let from_address =
            optional("MAIL_FROM").unwrap_or_else(|| "orders@localhost".to_string());
        let fulfilment_address = optional("FULFILMENT_EMAIL").unwrap_or_else(|| from_address.clone());

        Ok(Self {
            host,
            port,
            database_url,
            admin_token: optional("ADMIN_TOKEN"),
            delivery_fee,
            gateway_process_url: optional("GATEWAY_PROCESS_URL")
                .unwrap_or_else(|| "https://pay.example.com/process".to_string()),
            mail: MailConfig {
                smtp_host: optional("SMTP_HOST"),
                smtp_port,
                smtp_username: optional("SMTP_USERNAME"),
                smtp_password: optional("SMTP_PASSWORD"),
                from_address,
                fulfilment_address,
            },
        })
    }
}
