//! Response interpretation for CreateGiftCard

use super::error::ResponseFormatError;
use super::types::{CreationOutcome, TransportResponse};

pub const CLAIM_CODE_PATH: &str = "gcClaimCode";
pub const RESPONSE_ID_PATH: &str = "gcCreationResponseId";
pub const STATUS_CODE_PATH: &str = "Status/statusCode";
pub const STATUS_MESSAGE_PATH: &str = "Status/statusMessage";
pub const ERROR_CODE_PATH: &str = "Status/errorCode";

/// Classify a transport response.
///
/// Success responses must carry both claim code and response id. Failure
/// detail fields are read defensively; each may be absent.
pub fn interpret(response: &TransportResponse) -> Result<CreationOutcome, ResponseFormatError> {
    let doc = &response.document;

    if response.successful {
        let claim_code = doc
            .text(CLAIM_CODE_PATH)
            .ok_or(ResponseFormatError::MissingField(CLAIM_CODE_PATH))?;
        let response_id = doc
            .text(RESPONSE_ID_PATH)
            .ok_or(ResponseFormatError::MissingField(RESPONSE_ID_PATH))?;

        return Ok(CreationOutcome::Success {
            claim_code: claim_code.to_string(),
            response_id: response_id.to_string(),
        });
    }

    Ok(CreationOutcome::Failure {
        status_code: doc.text(STATUS_CODE_PATH).map(str::to_string),
        status_message: doc.text(STATUS_MESSAGE_PATH).map(str::to_string),
        error_code: doc.text(ERROR_CODE_PATH).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuance::document::ResponseDocument;

    fn response(successful: bool, xml: &str) -> TransportResponse {
        TransportResponse {
            successful,
            document: ResponseDocument::parse(xml).unwrap(),
        }
    }

    #[test]
    fn test_success() {
        let r = response(
            true,
            "<R><gcClaimCode>C1</gcClaimCode><gcCreationResponseId>R1</gcCreationResponseId></R>",
        );

        assert_eq!(
            interpret(&r).unwrap(),
            CreationOutcome::Success {
                claim_code: "C1".into(),
                response_id: "R1".into(),
            }
        );
    }

    #[test]
    fn test_success_missing_claim_code() {
        let r = response(true, "<R><gcCreationResponseId>R1</gcCreationResponseId></R>");
        assert_eq!(
            interpret(&r),
            Err(ResponseFormatError::MissingField("gcClaimCode"))
        );
    }

    #[test]
    fn test_success_missing_response_id() {
        let r = response(true, "<R><gcClaimCode>C1</gcClaimCode></R>");
        assert_eq!(
            interpret(&r),
            Err(ResponseFormatError::MissingField("gcCreationResponseId"))
        );
    }

    #[test]
    fn test_failure_fields() {
        let r = response(
            false,
            "<R><Status><statusCode>FAILURE</statusCode>\
             <statusMessage>Insufficient funds</statusMessage>\
             <errorCode>E300</errorCode></Status></R>",
        );

        assert_eq!(
            interpret(&r).unwrap(),
            CreationOutcome::Failure {
                status_code: Some("FAILURE".into()),
                status_message: Some("Insufficient funds".into()),
                error_code: Some("E300".into()),
            }
        );
    }

    #[test]
    fn test_failure_without_status_element() {
        let r = response(false, "<R/>");
        assert_eq!(
            interpret(&r).unwrap(),
            CreationOutcome::Failure {
                status_code: None,
                status_message: None,
                error_code: None,
            }
        );
    }
}
