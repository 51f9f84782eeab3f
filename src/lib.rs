//! agcod - Gift Card Issuance Client
//!
//! Issues gift cards against a remote CreateGiftCard endpoint with an
//! idempotent void-before-retry protocol.
//!
//! # Modules
//!
//! - [`issuance`] - Request building, response interpretation and the issuance FSM
//! - [`config`] - YAML configuration (partner id, endpoint, credentials, retry tuning)
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod issuance;
pub mod logging;

// Convenient re-exports at crate root
pub use config::{AgcodConfig, ConfigError, LoggingConfig};
pub use issuance::{
    GiftCardClient, IssuanceCoordinator, IssuanceError, IssuanceRequest, RequestBuilder,
    ResultRecord, RetryPolicy,
};
