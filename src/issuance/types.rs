//! Issuance data model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::document::ResponseDocument;

pub const CREATE_ACTION: &str = "CreateGiftCard";
pub const VOID_ACTION: &str = "VoidGiftCardCreation";
pub const DEFAULT_CURRENCY: &str = "USD";

/// Remote error code meaning "outcome ambiguous, void before retrying"
pub const RETRY_SENTINEL_ERROR_CODE: &str = "E100";

pub mod param {
    pub const ACTION: &str = "Action";
    pub const AMOUNT: &str = "gcValue.amount";
    pub const CURRENCY_CODE: &str = "gcValue.currencyCode";
    pub const CREATION_REQUEST_ID: &str = "gcCreationRequestId";
    pub const RETRY_COUNT: &str = "MessageHeader.retryCount";
}

/// Ordered request parameters as sent on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireParams(Vec<(String, String)>);

impl WireParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter, keeping first-insertion order
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A validated CreateGiftCard request.
///
/// Only `retry_count` ever differs between the original submission and its
/// retries; the wire id stays fixed so the remote side can deduplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceRequest {
    value: Decimal,
    currency_code: String,
    request_id: String,
    creation_request_id: String,
    retry_count: u32,
}

impl IssuanceRequest {
    pub(crate) fn new(
        value: Decimal,
        currency_code: String,
        request_id: String,
        creation_request_id: String,
    ) -> Self {
        Self {
            value,
            currency_code,
            request_id,
            creation_request_id,
            retry_count: 0,
        }
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    /// Caller-supplied id, without partner prefix
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Partner-prefixed id used by the remote side for deduplication
    pub fn creation_request_id(&self) -> &str {
        &self.creation_request_id
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn with_retry_count(&self, retry_count: u32) -> Self {
        Self {
            retry_count,
            ..self.clone()
        }
    }

    pub fn to_wire_params(&self) -> WireParams {
        let mut params = WireParams::new();
        params.set(param::ACTION, CREATE_ACTION);
        params.set(param::AMOUNT, self.value.to_string());
        params.set(param::CURRENCY_CODE, self.currency_code.as_str());
        params.set(param::CREATION_REQUEST_ID, self.creation_request_id.as_str());
        if self.retry_count > 0 {
            params.set(param::RETRY_COUNT, self.retry_count.to_string());
        }
        params
    }
}

/// What the transport hands back for one exchange
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub successful: bool,
    pub document: ResponseDocument,
}

/// Parsed result of one CreateGiftCard exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationOutcome {
    Success {
        claim_code: String,
        response_id: String,
    },
    Failure {
        status_code: Option<String>,
        status_message: Option<String>,
        error_code: Option<String>,
    },
}

impl CreationOutcome {
    /// Remote asked us to void and retry
    #[inline]
    pub fn has_retry_error_code(&self) -> bool {
        matches!(
            self,
            CreationOutcome::Failure { error_code: Some(code), .. }
                if code == RETRY_SENTINEL_ERROR_CODE
        )
    }
}

/// Result of a successful void call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoidOutcome {
    pub request_id: String,
    pub status_code: Option<String>,
}

/// Retry tuning read from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_limit: u32,
    pub retry_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_limit: 1,
            retry_interval: Duration::from_secs(5),
        }
    }
}

/// Settled outcome of a successful issuance. Built once per logical request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub request_id: String,
    pub value: Decimal,
    pub currency_code: String,
    pub claim_code: String,
    pub response_id: String,
    /// Number of CreateGiftCard calls made, including the successful one
    pub attempts: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct ResultExport<'a> {
    response_id: &'a str,
    request_id: &'a str,
    claim_code: &'a str,
    value: Decimal,
    timestamp: DateTime<Utc>,
}

impl ResultRecord {
    pub(crate) fn settle(
        request: &IssuanceRequest,
        claim_code: String,
        response_id: String,
        attempts: u32,
    ) -> Self {
        Self {
            request_id: request.request_id().to_string(),
            value: request.value(),
            currency_code: request.currency_code().to_string(),
            claim_code,
            response_id,
            attempts,
            timestamp: Utc::now(),
        }
    }

    /// Persistence export: `response_id`, `request_id`, `claim_code`,
    /// `value`, `timestamp`
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&ResultExport {
            response_id: &self.response_id,
            request_id: &self.request_id,
            claim_code: &self.claim_code,
            value: self.value,
            timestamp: self.timestamp,
        })
    }
}
