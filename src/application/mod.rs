pub mod notifications;
pub mod order_service;
pub mod payment_service;
