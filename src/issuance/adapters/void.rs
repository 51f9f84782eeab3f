//! VoidGiftCardCreation through a shared transport

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::{Transport, VoidInvoker};
use crate::issuance::builder::RequestBuilder;
use crate::issuance::error::VoidError;
use crate::issuance::interpreter::{ERROR_CODE_PATH, STATUS_CODE_PATH, STATUS_MESSAGE_PATH};
use crate::issuance::types::{VOID_ACTION, VoidOutcome, WireParams, param};

pub struct RemoteVoidInvoker {
    transport: Arc<dyn Transport>,
    builder: RequestBuilder,
}

impl RemoteVoidInvoker {
    pub fn new(transport: Arc<dyn Transport>, partner_id: impl Into<String>) -> Self {
        Self {
            transport,
            builder: RequestBuilder::new(partner_id),
        }
    }

    /// Void targets the logical request: only the wire id is sent
    pub fn wire_params(&self, request_id: &str) -> WireParams {
        let mut params = WireParams::new();
        params.set(param::ACTION, VOID_ACTION);
        params.set(param::CREATION_REQUEST_ID, self.builder.prefixed(request_id));
        params
    }
}

#[async_trait]
impl VoidInvoker for RemoteVoidInvoker {
    async fn void(&self, request_id: &str) -> Result<VoidOutcome, VoidError> {
        debug!(
            request_id = request_id,
            transport = self.transport.name(),
            "Voiding gift card creation"
        );

        let response = self.transport.execute(&self.wire_params(request_id)).await?;
        let doc = &response.document;

        if !response.successful {
            return Err(VoidError::Rejected {
                status_code: doc.text(STATUS_CODE_PATH).map(str::to_string),
                status_message: doc.text(STATUS_MESSAGE_PATH).map(str::to_string),
                error_code: doc.text(ERROR_CODE_PATH).map(str::to_string),
            });
        }

        info!(request_id = request_id, "Gift card creation voided");
        Ok(VoidOutcome {
            request_id: request_id.to_string(),
            status_code: doc.text(STATUS_CODE_PATH).map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuance::adapters::mock::{
        MockTransport, failure_response, success_response, transient,
    };

    #[tokio::test]
    async fn test_void_sends_prefixed_id_only() {
        let transport = Arc::new(MockTransport::new(vec![Ok(success_response("C", "R"))]));
        let voider = RemoteVoidInvoker::new(transport.clone(), "Acme");

        let outcome = voider.void("order-7").await.unwrap();
        assert_eq!(outcome.request_id, "order-7");
        assert_eq!(outcome.status_code.as_deref(), Some("SUCCESS"));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].get(param::ACTION), Some("VoidGiftCardCreation"));
        assert_eq!(calls[0].get(param::CREATION_REQUEST_ID), Some("Acmeorder-7"));
        assert_eq!(calls[0].get(param::AMOUNT), None);
        assert_eq!(calls[0].len(), 2);
    }

    #[tokio::test]
    async fn test_void_rejected() {
        let transport = Arc::new(MockTransport::new(vec![Ok(failure_response(
            "FAILURE",
            "Request not found",
            "E400",
        ))]));
        let voider = RemoteVoidInvoker::new(transport, "Acme");

        match voider.void("order-7").await {
            Err(VoidError::Rejected { error_code, .. }) => {
                assert_eq!(error_code.as_deref(), Some("E400"))
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_void_transient_failure_maps() {
        let transport = Arc::new(MockTransport::new(vec![Err(transient("timed out"))]));
        let voider = RemoteVoidInvoker::new(transport, "Acme");

        assert!(voider.void("order-7").await.unwrap_err().is_transient());
    }
}
