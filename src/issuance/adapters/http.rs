//! Signed HTTP transport
//!
//! Requests are sent as GET with all parameters in the query string and an
//! HMAC-SHA256 `Signature` over the canonical request:
//!
//! ```text
//! GET\n<host>\n<path>\n<sorted, RFC 3986 encoded query>
//! ```

use async_trait::async_trait;
use base64::prelude::*;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::Sha256;
use tracing::{debug, warn};

use super::Transport;
use crate::config::AgcodConfig;
use crate::issuance::document::ResponseDocument;
use crate::issuance::error::TransportError;
use crate::issuance::interpreter::STATUS_CODE_PATH;
use crate::issuance::types::{TransportResponse, WireParams};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_METHOD: &str = "HmacSHA256";
pub const SIGNATURE_VERSION: &str = "2";
const SUCCESS_STATUS: &str = "SUCCESS";

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    access_key: String,
    secret_key: String,
    partner_id: String,
    recipient_id: Option<String>,
    content_version: String,
}

impl HttpTransport {
    pub fn from_config(config: &AgcodConfig) -> Result<Self, TransportError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| TransportError::Config(format!("endpoint {}: {}", config.endpoint, e)))?;
        if endpoint.host_str().is_none() {
            return Err(TransportError::Config(format!(
                "endpoint {} has no host",
                config.endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
            partner_id: config.partner_id.clone(),
            recipient_id: config.recipient_id.clone(),
            content_version: config.content_version.clone(),
        })
    }

    /// Common parameters plus signature, in send order
    fn signed_params(&self, params: &WireParams) -> Result<WireParams, TransportError> {
        let mut all = params.clone();
        all.set("AWSAccessKeyId", self.access_key.as_str());
        all.set("Timestamp", Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());
        all.set("MessageHeader.sourceId", self.partner_id.as_str());
        if let Some(recipient) = &self.recipient_id {
            all.set("MessageHeader.recipientId", recipient.as_str());
        }
        all.set("MessageHeader.contentVersion", self.content_version.as_str());
        all.set("SignatureVersion", SIGNATURE_VERSION);
        all.set("SignatureMethod", SIGNATURE_METHOD);

        let host = self.endpoint.host_str().unwrap_or_default();
        let signature = sign(&self.secret_key, "GET", host, self.endpoint.path(), &all)?;
        all.set("Signature", signature);
        Ok(all)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn execute(&self, params: &WireParams) -> Result<TransportResponse, TransportError> {
        let signed = self.signed_params(params)?;
        let mut url = self.endpoint.clone();
        url.set_query(Some(&encode_query(signed.iter())));

        debug!(
            action = params.get("Action").unwrap_or_default(),
            endpoint = %self.endpoint,
            "Sending request"
        );

        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        let document = match ResponseDocument::parse(&body) {
            Ok(doc) => doc,
            Err(e) if !status.is_success() => {
                warn!(status = status.as_u16(), error = %e, "Non-XML error response");
                return Err(TransportError::Http(status.as_u16()));
            }
            Err(e) => return Err(e.into()),
        };

        let successful = document.text(STATUS_CODE_PATH) == Some(SUCCESS_STATUS);
        Ok(TransportResponse {
            successful,
            document,
        })
    }
}

/// Connect and timeout failures are transient; everything else is not.
fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() || e.is_connect() {
        TransportError::Transient(e.to_string())
    } else {
        TransportError::Decode(e.to_string())
    }
}

/// base64(HMAC-SHA256(secret, canonical request))
pub fn sign(
    secret_key: &str,
    method: &str,
    host: &str,
    path: &str,
    params: &WireParams,
) -> Result<String, TransportError> {
    let path = if path.is_empty() { "/" } else { path };
    let canonical = format!(
        "{}\n{}\n{}\n{}",
        method,
        host.to_lowercase(),
        path,
        canonical_query(params)
    );

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| TransportError::Signing(e.to_string()))?;
    mac.update(canonical.as_bytes());
    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

/// Parameters sorted by key (byte order), excluding any existing signature
pub fn canonical_query(params: &WireParams) -> String {
    let mut pairs: Vec<(&str, &str)> = params.iter().filter(|(k, _)| *k != "Signature").collect();
    pairs.sort();
    encode_query(pairs.into_iter())
}

fn encode_query<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// RFC 3986: everything except unreserved characters is escaped
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
