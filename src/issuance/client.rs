//! Caller-facing entry point: validate, build, submit

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

use super::adapters::{HttpTransport, RemoteVoidInvoker, Transport, VoidInvoker};
use super::builder::RequestBuilder;
use super::coordinator::IssuanceCoordinator;
use super::error::{IssuanceError, TransportError, VoidError};
use super::types::{ResultRecord, RetryPolicy};
use crate::config::AgcodConfig;

pub struct GiftCardClient {
    builder: RequestBuilder,
    coordinator: IssuanceCoordinator,
}

impl GiftCardClient {
    pub fn new(
        partner_id: impl Into<String>,
        transport: Arc<dyn Transport>,
        voider: Arc<dyn VoidInvoker>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            builder: RequestBuilder::new(partner_id),
            coordinator: IssuanceCoordinator::new(transport, voider, policy),
        }
    }

    /// HTTP transport and remote void sharing one connection pool
    pub fn from_config(config: &AgcodConfig) -> Result<Self, TransportError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::from_config(config)?);
        let voider = Arc::new(RemoteVoidInvoker::new(
            transport.clone(),
            config.partner_id.as_str(),
        ));
        Ok(Self::new(
            config.partner_id.as_str(),
            transport,
            voider,
            config.retry_policy(),
        ))
    }

    /// Issue a gift card. Input is validated before anything is sent.
    pub async fn create_gift_card(
        &self,
        value: Decimal,
        currency_code: Option<&str>,
        request_id: &str,
    ) -> Result<ResultRecord, IssuanceError> {
        let request = self.builder.build(value, currency_code, request_id)?;
        debug!(
            request_id = request_id,
            creation_request_id = request.creation_request_id(),
            value = %request.value(),
            currency = request.currency_code(),
            "Submitting gift card creation"
        );
        self.coordinator.submit(&request).await
    }

    /// Void a previous creation by caller request id
    pub async fn void_gift_card(&self, request_id: &str) -> Result<(), VoidError> {
        self.coordinator.void(request_id).await
    }

    pub fn coordinator(&self) -> &IssuanceCoordinator {
        &self.coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuance::adapters::mock::{MockTransport, MockVoidInvoker, success_response};
    use crate::issuance::error::ValidationError;

    fn client(transport: Arc<MockTransport>, voider: Arc<MockVoidInvoker>) -> GiftCardClient {
        GiftCardClient::new("Acme", transport, voider, RetryPolicy::default())
    }

    #[tokio::test]
    async fn test_validation_never_reaches_transport() {
        let transport = Arc::new(MockTransport::new(vec![Ok(success_response("C", "R"))]));
        let voider = Arc::new(MockVoidInvoker::new());
        let client = client(transport.clone(), voider.clone());

        let err = client
            .create_gift_card(Decimal::ZERO, None, "order-1")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            IssuanceError::Validation(ValidationError::NonPositiveValue)
        );

        let err = client
            .create_gift_card(Decimal::ONE, None, &"x".repeat(20))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST_ID_LENGTH");

        assert_eq!(transport.call_count(), 0);
        assert_eq!(voider.void_count(), 0);
    }

    #[tokio::test]
    async fn test_create_sends_prefixed_id() {
        let transport = Arc::new(MockTransport::new(vec![Ok(success_response("C1", "R1"))]));
        let client = client(transport.clone(), Arc::new(MockVoidInvoker::new()));

        let record = client
            .create_gift_card(Decimal::new(1000, 2), Some("USD"), "order-1")
            .await
            .unwrap();

        assert_eq!(record.claim_code, "C1");
        assert_eq!(
            transport.calls()[0].get("gcCreationRequestId"),
            Some("Acmeorder-1")
        );
    }

    #[tokio::test]
    async fn test_void_gift_card_passes_unprefixed_id() {
        let voider = Arc::new(MockVoidInvoker::new());
        let client = client(Arc::new(MockTransport::new(vec![])), voider.clone());

        client.void_gift_card("order-1").await.unwrap();
        assert_eq!(voider.voided(), vec!["order-1"]);
    }

    #[test]
    fn test_from_config() {
        let config = AgcodConfig::from_yaml(
            "partner_id: Acme\nendpoint: \"https://agcws.example.com/\"\naccess_key: AK\nsecret_key: SK\nretry_limit: 2\n",
        )
        .unwrap();
        let client = GiftCardClient::from_config(&config).unwrap();
        assert_eq!(client.coordinator().policy().retry_limit, 2);
    }
}
