//! Issuance Error Types
//!
//! Every terminal failure carries enough context (status code, error code,
//! message, attempt count) for the caller to decide whether manual
//! reconciliation against the remote ledger is required.

use thiserror::Error;

/// Caller input rejected before any network interaction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Gift card value must be greater than zero")]
    NonPositiveValue,

    #[error("Request id must be 1-19 characters, got {len}")]
    InvalidRequestIdLength { len: usize },
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NonPositiveValue => "NON_POSITIVE_VALUE",
            ValidationError::InvalidRequestIdLength { .. } => "INVALID_REQUEST_ID_LENGTH",
        }
    }
}

/// A remote response that violates the protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseFormatError {
    #[error("Success response missing required field: {0}")]
    MissingField(&'static str),

    #[error("Malformed response document: {0}")]
    Malformed(String),
}

/// Failures raised by the transport collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connectivity or timeout class failure; the remote outcome is unknown
    #[error("Transient transport failure: {0}")]
    Transient(String),

    /// Request was sent; the reply was an HTTP error without a readable body
    #[error("Unexpected HTTP status {0}")]
    Http(u16),

    /// Request was sent; the reply body could not be read or parsed
    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to sign request: {0}")]
    Signing(String),

    #[error("Invalid transport configuration: {0}")]
    Config(String),
}

impl TransportError {
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Transient(_))
    }

    /// The request may have reached the issuing side, so a card could exist
    pub fn outcome_unknown(&self) -> bool {
        matches!(
            self,
            TransportError::Transient(_) | TransportError::Http(_) | TransportError::Decode(_)
        )
    }
}

impl From<ResponseFormatError> for TransportError {
    fn from(e: ResponseFormatError) -> Self {
        TransportError::Decode(e.to_string())
    }
}

/// The void step itself failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoidError {
    #[error("Transient failure while voiding: {0}")]
    Transient(String),

    #[error("Void rejected (status={status_code:?}, error={error_code:?})")]
    Rejected {
        status_code: Option<String>,
        status_message: Option<String>,
        error_code: Option<String>,
    },

    #[error("Void transport error: {0}")]
    Transport(String),
}

impl VoidError {
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, VoidError::Transient(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            VoidError::Transient(_) => "VOID_TRANSIENT",
            VoidError::Rejected { .. } => "VOID_REJECTED",
            VoidError::Transport(_) => "VOID_TRANSPORT",
        }
    }
}

impl From<TransportError> for VoidError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Transient(msg) => VoidError::Transient(msg),
            other => VoidError::Transport(other.to_string()),
        }
    }
}

/// Terminal outcome of a failed `submit`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IssuanceError {
    #[error("Invalid issuance request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Protocol violation: {0}")]
    ResponseFormat(#[from] ResponseFormatError),

    #[error(
        "Issuance rejected (status={:?}, error={:?}): {}",
        .status_code,
        .error_code,
        .status_message.as_deref().unwrap_or("no message")
    )]
    Rejected {
        status_code: Option<String>,
        status_message: Option<String>,
        error_code: Option<String>,
    },

    #[error("Retry limit exceeded after {attempts} attempt(s) (error={error_code:?})")]
    RetryLimitExceeded {
        attempts: u32,
        status_code: Option<String>,
        status_message: Option<String>,
        error_code: Option<String>,
        void_error: Option<VoidError>,
    },

    #[error("Transient failure, outcome unknown: {message}")]
    TransientFailure {
        message: String,
        attempts: u32,
        void_error: Option<VoidError>,
    },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl IssuanceError {
    pub fn code(&self) -> &'static str {
        match self {
            IssuanceError::Validation(e) => e.code(),
            IssuanceError::ResponseFormat(_) => "RESPONSE_FORMAT",
            IssuanceError::Rejected { .. } => "REJECTED",
            IssuanceError::RetryLimitExceeded { .. } => "RETRY_LIMIT_EXCEEDED",
            IssuanceError::TransientFailure { .. } => "TRANSIENT_FAILURE",
            IssuanceError::Transport(_) => "TRANSPORT_ERROR",
        }
    }

    /// The remote side may hold an issued card (or one whose void did not
    /// succeed); the caller should reconcile manually.
    pub fn needs_reconciliation(&self) -> bool {
        matches!(
            self,
            IssuanceError::RetryLimitExceeded { .. }
                | IssuanceError::TransientFailure { .. }
                | IssuanceError::ResponseFormat(_)
        )
    }

    /// Remote error code, where the remote side supplied one
    pub fn error_code(&self) -> Option<&str> {
        match self {
            IssuanceError::Rejected { error_code, .. }
            | IssuanceError::RetryLimitExceeded { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }
}
