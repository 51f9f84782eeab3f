//! Issuance Coordinator
//!
//! Drives one logical issuance from submission to a settled outcome.
//! Retry and void decisions are made by [`decide`] on tagged outcomes; the
//! coordinator only executes them.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::adapters::{Transport, VoidInvoker};
use super::error::{IssuanceError, TransportError, VoidError};
use super::interpreter::interpret;
use super::state::IssuanceState;
use super::types::{CreationOutcome, IssuanceRequest, ResultRecord, RetryPolicy};

/// Next action after interpreting one CreateGiftCard response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Claim code received
    Settle {
        claim_code: String,
        response_id: String,
    },
    /// Retry sentinel with retries left: void, wait, resubmit
    VoidThenRetry { next_retry_count: u32 },
    /// Retry sentinel with retries exhausted: void, then fail
    VoidThenFail,
    /// Any other failure: surface as-is
    Reject,
}

impl Decision {
    pub fn next_state(&self) -> IssuanceState {
        match self {
            Decision::Settle { .. } => IssuanceState::Succeeded,
            Decision::VoidThenRetry { .. } => IssuanceState::VoidingThenRetry,
            Decision::VoidThenFail => IssuanceState::VoidingThenFail,
            Decision::Reject => IssuanceState::Rejected,
        }
    }
}

/// Transition table. `retries_done` counts resubmissions already made.
pub fn decide(outcome: &CreationOutcome, retries_done: u32, policy: &RetryPolicy) -> Decision {
    match outcome {
        CreationOutcome::Success {
            claim_code,
            response_id,
        } => Decision::Settle {
            claim_code: claim_code.clone(),
            response_id: response_id.clone(),
        },
        _ if outcome.has_retry_error_code() => {
            if retries_done < policy.retry_limit {
                Decision::VoidThenRetry {
                    next_retry_count: retries_done + 1,
                }
            } else {
                Decision::VoidThenFail
            }
        }
        CreationOutcome::Failure { .. } => Decision::Reject,
    }
}

pub struct IssuanceCoordinator {
    transport: Arc<dyn Transport>,
    voider: Arc<dyn VoidInvoker>,
    policy: RetryPolicy,
}

impl IssuanceCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        voider: Arc<dyn VoidInvoker>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            voider,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Submit a request and drive it to a settled outcome.
    ///
    /// May wait up to `retry_limit * retry_interval` in addition to transport
    /// latency. Resubmissions reuse the same wire id; only
    /// `MessageHeader.retryCount` changes.
    pub async fn submit(&self, request: &IssuanceRequest) -> Result<ResultRecord, IssuanceError> {
        let request_id = request.request_id();
        let mut current = request.clone();
        let mut retries_done = current.retry_count();
        let mut calls: u32 = 0;
        let mut state = IssuanceState::Idle;

        loop {
            state = self.enter(request_id, state, IssuanceState::Submitting);
            calls += 1;

            let response = match self.transport.execute(&current.to_wire_params()).await {
                Ok(response) => response,
                Err(e) if e.outcome_unknown() => {
                    state = self.enter(request_id, state, IssuanceState::TransientFailure);
                    debug_assert!(state.is_terminal());
                    let message = match e {
                        TransportError::Transient(message) => message,
                        other => other.to_string(),
                    };
                    return Err(self.neutralize_unknown(request_id, message, calls).await);
                }
                Err(e) => {
                    // Signing and config failures happen before anything is sent
                    error!(request_id = request_id, error = %e, "Transport error");
                    return Err(IssuanceError::Transport(e.to_string()));
                }
            };

            let outcome = interpret(&response).inspect_err(|e| {
                error!(
                    request_id = request_id,
                    root = response.document.root_name(),
                    error = %e,
                    "Malformed success response; card may exist remotely"
                );
            })?;

            let decision = decide(&outcome, retries_done, &self.policy);
            let next = decision.next_state();
            if next.involves_void() {
                state = self.enter(request_id, state, IssuanceState::AwaitingRetryDecision);
            }
            state = self.enter(request_id, state, next);

            match decision {
                Decision::Settle {
                    claim_code,
                    response_id,
                } => {
                    info!(
                        request_id = request_id,
                        response_id = %response_id,
                        attempts = calls,
                        "Gift card issued"
                    );
                    debug_assert!(state.is_terminal());
                    return Ok(ResultRecord::settle(request, claim_code, response_id, calls));
                }
                Decision::VoidThenRetry { next_retry_count } => {
                    // Remote may have issued a card; neutralize before resubmitting
                    if let Some(e) = self.void_once(request_id).await {
                        warn!(
                            request_id = request_id,
                            error = %e,
                            "Void before retry failed, retrying anyway"
                        );
                    }

                    let interval = self.policy.retry_interval;
                    debug!(
                        request_id = request_id,
                        retry_count = next_retry_count,
                        retry_interval_secs = interval.as_secs_f64(),
                        "received RESEND response, retrying in {} seconds...",
                        interval.as_secs_f64()
                    );
                    tokio::time::sleep(interval).await;

                    retries_done = next_retry_count;
                    current = current.with_retry_count(next_retry_count);
                }
                Decision::VoidThenFail => {
                    let void_error = self.void_once(request_id).await;
                    let (status_code, status_message, error_code) = failure_fields(outcome);
                    warn!(
                        request_id = request_id,
                        attempts = calls,
                        error_code = ?error_code,
                        "Retry limit exceeded"
                    );
                    debug_assert!(state.is_terminal());
                    return Err(IssuanceError::RetryLimitExceeded {
                        attempts: calls,
                        status_code,
                        status_message,
                        error_code,
                        void_error,
                    });
                }
                Decision::Reject => {
                    let (status_code, status_message, error_code) = failure_fields(outcome);
                    info!(
                        request_id = request_id,
                        status_code = ?status_code,
                        error_code = ?error_code,
                        "Gift card issuance rejected"
                    );
                    debug_assert!(state.is_terminal());
                    return Err(IssuanceError::Rejected {
                        status_code,
                        status_message,
                        error_code,
                    });
                }
            }
        }
    }

    /// Void directly, outside of any submission
    pub async fn void(&self, request_id: &str) -> Result<(), VoidError> {
        self.voider.void(request_id).await.map(|_| ())
    }

    fn enter(&self, request_id: &str, from: IssuanceState, to: IssuanceState) -> IssuanceState {
        if from != to {
            debug!(request_id = request_id, from = %from, to = %to, "State transition");
        }
        to
    }

    /// Single best-effort void; a failure is returned, never raised
    async fn void_once(&self, request_id: &str) -> Option<VoidError> {
        match self.voider.void(request_id).await {
            Ok(_) => None,
            Err(e) => {
                warn!(request_id = request_id, error = %e, code = e.code(), "Void failed");
                Some(e)
            }
        }
    }

    /// Transport failed after the request may have been sent: wait, void (one
    /// extra try on a transient void failure), then surface the original failure.
    async fn neutralize_unknown(
        &self,
        request_id: &str,
        message: String,
        calls: u32,
    ) -> IssuanceError {
        error!(
            request_id = request_id,
            error = %message,
            "Transport failure with unknown outcome, voiding request"
        );

        tokio::time::sleep(self.policy.retry_interval).await;
        let void_error = match self.void_once(request_id).await {
            Some(e) if e.is_transient() => {
                tokio::time::sleep(self.policy.retry_interval).await;
                self.void_once(request_id).await
            }
            other => other,
        };

        if void_error.is_some() {
            error!(
                request_id = request_id,
                "Void after transient failure did not complete; manual reconciliation required"
            );
        }

        IssuanceError::TransientFailure {
            message,
            attempts: calls,
            void_error,
        }
    }
}

fn failure_fields(outcome: CreationOutcome) -> (Option<String>, Option<String>, Option<String>) {
    match outcome {
        CreationOutcome::Failure {
            status_code,
            status_message,
            error_code,
        } => (status_code, status_message, error_code),
        CreationOutcome::Success { .. } => (None, None, None),
    }
}
