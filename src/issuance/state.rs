//! Issuance FSM State Definitions

use std::fmt;

/// States of one `submit` call.
///
/// Terminal: SUCCEEDED, VOIDING_THEN_FAIL, TRANSIENT_FAILURE, REJECTED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssuanceState {
    /// Request built, nothing sent yet
    Idle,

    /// CreateGiftCard call in flight
    Submitting,

    /// Terminal: claim code received
    Succeeded,

    /// Retry sentinel received, void issued, deciding whether to resubmit
    AwaitingRetryDecision,

    /// Voided; waiting out the retry interval before resubmitting
    VoidingThenRetry,

    /// Terminal: voided and out of retries
    VoidingThenFail,

    /// Terminal: transport failed, void attempted, outcome unknown
    TransientFailure,

    /// Terminal: definitive remote rejection
    Rejected,
}

impl IssuanceState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IssuanceState::Succeeded
                | IssuanceState::VoidingThenFail
                | IssuanceState::TransientFailure
                | IssuanceState::Rejected
        )
    }

    /// A card may have been issued remotely and has been (or is being) voided
    #[inline]
    pub fn involves_void(&self) -> bool {
        matches!(
            self,
            IssuanceState::AwaitingRetryDecision
                | IssuanceState::VoidingThenRetry
                | IssuanceState::VoidingThenFail
                | IssuanceState::TransientFailure
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssuanceState::Idle => "IDLE",
            IssuanceState::Submitting => "SUBMITTING",
            IssuanceState::Succeeded => "SUCCEEDED",
            IssuanceState::AwaitingRetryDecision => "AWAITING_RETRY_DECISION",
            IssuanceState::VoidingThenRetry => "VOIDING_THEN_RETRY",
            IssuanceState::VoidingThenFail => "VOIDING_THEN_FAIL",
            IssuanceState::TransientFailure => "TRANSIENT_FAILURE",
            IssuanceState::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for IssuanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
