//! CreateGiftCard request construction

use rust_decimal::Decimal;

use super::error::ValidationError;
use super::types::{DEFAULT_CURRENCY, IssuanceRequest};

pub const MAX_REQUEST_ID_LEN: usize = 19;

/// Builds validated requests for one partner
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    partner_id: String,
}

impl RequestBuilder {
    pub fn new(partner_id: impl Into<String>) -> Self {
        Self {
            partner_id: partner_id.into(),
        }
    }

    /// Validate caller input and build the request.
    ///
    /// The wire id is `partner_id + request_id` with no separator.
    pub fn build(
        &self,
        value: Decimal,
        currency_code: Option<&str>,
        request_id: &str,
    ) -> Result<IssuanceRequest, ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveValue);
        }

        let len = request_id.chars().count();
        if len == 0 || len > MAX_REQUEST_ID_LEN {
            return Err(ValidationError::InvalidRequestIdLength { len });
        }

        let currency_code = match currency_code {
            Some(code) if !code.trim().is_empty() => code.trim().to_string(),
            _ => DEFAULT_CURRENCY.to_string(),
        };

        Ok(IssuanceRequest::new(
            value,
            currency_code,
            request_id.to_string(),
            self.prefixed(request_id),
        ))
    }

    /// Wire id for a caller request id
    pub fn prefixed(&self, request_id: &str) -> String {
        format!("{}{}", self.partner_id, request_id)
    }
}
