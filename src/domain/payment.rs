use super::errors::DomainError;

/// The exact value the gateway sends in its `payment_status` field when a
/// payment completed. Anything else, including casing variants and absent
/// statuses, is non-success and must leave the order untouched.
pub const SUCCESS_TOKEN: &str = "COMPLETE";

/// A payment-gateway notification after boundary validation.
///
/// The raw webhook body is an untrusted bag of form fields; this type is the
/// only shape business logic is allowed to see. Gateway-specific fields we do
/// not interpret are dropped at parse time.
#[derive(Debug, Clone)]
pub struct IncomingPaymentNotification {
    /// The reference generated at checkout and echoed back by the gateway.
    pub order_reference: String,
    /// The gateway's payment outcome, verbatim. `None` when the field was
    /// missing from the payload.
    pub payment_status: Option<String>,
}

impl IncomingPaymentNotification {
    /// Validate raw form fields into a typed notification.
    ///
    /// A missing or blank order reference means the notification cannot be
    /// matched to an order at all; that is a client error, not a failed
    /// payment.
    pub fn from_fields(
        order_reference: Option<String>,
        payment_status: Option<String>,
    ) -> Result<Self, DomainError> {
        let order_reference = order_reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .ok_or_else(|| DomainError::InvalidInput("missing order reference".to_string()))?;
        Ok(Self {
            order_reference,
            payment_status,
        })
    }

    /// Exact match against the gateway's success token.
    pub fn is_success(&self) -> bool {
        self.payment_status.as_deref() == Some(SUCCESS_TOKEN)
    }
}
