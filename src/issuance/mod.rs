//! Gift Card Issuance FSM
//!
//! Issues gift cards exactly once per logical request against a remote
//! service that may or may not have acted on an ambiguous call.
//!
//! # State Machine
//!
//! ```text
//! IDLE → SUBMITTING → SUCCEEDED
//!            │ ↑
//!            │ └──── VOIDING_THEN_RETRY ←┐
//!            ├→ AWAITING_RETRY_DECISION ─┤   (error code E100)
//!            │                           └→ VOIDING_THEN_FAIL
//!            ├→ REJECTED                     (any other error code)
//!            └→ TRANSIENT_FAILURE            (outcome unknown; void, no resubmit)
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Void-Before-Retry**: an E100 response is always voided before the
//!    request is resubmitted or given up on
//! 2. **Stable Wire Id**: `gcCreationRequestId` never changes across retries;
//!    only `MessageHeader.retryCount` does
//! 3. **No Blind Resubmit**: a transport-level failure is voided and surfaced,
//!    never retried automatically
//! 4. **Best-Effort Void**: a failed void is reported alongside the original
//!    outcome and never replaces it

pub mod adapters;
pub mod builder;
pub mod client;
pub mod coordinator;
pub mod document;
pub mod error;
pub mod interpreter;
pub mod state;
pub mod types;


pub use builder::RequestBuilder;
pub use client::GiftCardClient;
pub use coordinator::{Decision, IssuanceCoordinator, decide};
pub use error::{IssuanceError, ResponseFormatError, TransportError, ValidationError, VoidError};
pub use state::IssuanceState;
pub use types::{
    CreationOutcome, IssuanceRequest, ResultRecord, RetryPolicy, TransportResponse, VoidOutcome,
    WireParams,
};
