//! Remote Service Adapters
//!
//! The coordinator only talks to the remote side through these two traits,
//! so tests and alternative transports can be swapped in freely.

pub mod http;
pub mod void;

pub use http::HttpTransport;
pub use void::RemoteVoidInvoker;

use async_trait::async_trait;

use super::error::{TransportError, VoidError};
use super::types::{TransportResponse, VoidOutcome, WireParams};

/// Performs one signed exchange with the remote endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    /// Adapter name for logging
    fn name(&self) -> &'static str;

    /// Send `params` and return the parsed response.
    ///
    /// Connectivity and timeout failures MUST be reported as
    /// `TransportError::Transient`; well-formed error responses are returned
    /// as `Ok` with `successful == false`.
    async fn execute(&self, params: &WireParams) -> Result<TransportResponse, TransportError>;
}

/// Voids a creation request, keyed by the caller's request id (unprefixed)
#[async_trait]
pub trait VoidInvoker: Send + Sync {
    async fn void(&self, request_id: &str) -> Result<VoidOutcome, VoidError>;
}

/// Scripted adapters for testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::issuance::document::ResponseDocument;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    pub fn success_response(claim_code: &str, response_id: &str) -> TransportResponse {
        TransportResponse {
            successful: true,
            document: ResponseDocument::parse(&format!(
                "<CreateGiftCardResponse>\
                 <Status><statusCode>SUCCESS</statusCode></Status>\
                 <gcClaimCode>{}</gcClaimCode>\
                 <gcCreationResponseId>{}</gcCreationResponseId>\
                 </CreateGiftCardResponse>",
                claim_code, response_id
            ))
            .unwrap(),
        }
    }

    pub fn failure_response(status_code: &str, message: &str, error_code: &str) -> TransportResponse {
        TransportResponse {
            successful: false,
            document: ResponseDocument::parse(&format!(
                "<CreateGiftCardResponse><Status>\
                 <statusCode>{}</statusCode>\
                 <statusMessage>{}</statusMessage>\
                 <errorCode>{}</errorCode>\
                 </Status></CreateGiftCardResponse>",
                status_code, message, error_code
            ))
            .unwrap(),
        }
    }

    pub fn transient(message: &str) -> TransportError {
        TransportError::Transient(message.to_string())
    }

    /// Transport replaying a fixed script of results
    pub struct MockTransport {
        script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        calls: Mutex<Vec<WireParams>>,
        call_count: AtomicUsize,
    }

    impl MockTransport {
        pub fn new(script: Vec<Result<TransportResponse, TransportError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        pub fn calls(&self) -> Vec<WireParams> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn execute(&self, params: &WireParams) -> Result<TransportResponse, TransportError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push(params.clone());

            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Decode("mock script exhausted".into())))
        }
    }

    /// Void invoker replaying a script; succeeds once the script runs out
    pub struct MockVoidInvoker {
        script: Mutex<VecDeque<Result<(), VoidError>>>,
        voided: Mutex<Vec<String>>,
        void_times: Mutex<Vec<Instant>>,
        void_count: AtomicUsize,
    }

    impl MockVoidInvoker {
        pub fn new() -> Self {
            Self::with_script(Vec::new())
        }

        pub fn with_script(script: Vec<Result<(), VoidError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                voided: Mutex::new(Vec::new()),
                void_times: Mutex::new(Vec::new()),
                void_count: AtomicUsize::new(0),
            }
        }

        pub fn void_count(&self) -> usize {
            self.void_count.load(Ordering::SeqCst)
        }

        pub fn voided(&self) -> Vec<String> {
            self.voided.lock().unwrap().clone()
        }

        /// Clock reading at each void call, in call order
        pub fn void_times(&self) -> Vec<Instant> {
            self.void_times.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VoidInvoker for MockVoidInvoker {
        async fn void(&self, request_id: &str) -> Result<VoidOutcome, VoidError> {
            self.void_count.fetch_add(1, Ordering::SeqCst);
            self.voided.lock().unwrap().push(request_id.to_string());
            self.void_times.lock().unwrap().push(Instant::now());

            let next = self.script.lock().unwrap().pop_front().unwrap_or(Ok(()));
            next.map(|_| VoidOutcome {
                request_id: request_id.to_string(),
                status_code: Some("SUCCESS".to_string()),
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_transport_replays_script() {
            let transport = MockTransport::new(vec![
                Err(transient("refused")),
                Ok(success_response("C1", "R1")),
            ]);

            let params = WireParams::new();
            assert!(transport.execute(&params).await.unwrap_err().is_transient());
            assert!(transport.execute(&params).await.unwrap().successful);
            assert!(transport.execute(&params).await.is_err());
            assert_eq!(transport.call_count(), 3);
        }

        #[tokio::test]
        async fn test_mock_void_defaults_to_success() {
            let voider =
                MockVoidInvoker::with_script(vec![Err(VoidError::Transient("t".into()))]);

            assert!(voider.void("abc").await.is_err());
            assert!(voider.void("abc").await.is_ok());
            assert_eq!(voider.voided(), vec!["abc", "abc"]);
        }
    }
}

#[cfg(test)]
pub use mock::{MockTransport, MockVoidInvoker};
