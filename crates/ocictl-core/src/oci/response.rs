//! Decoding of `oci --output json` responses

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{CoreError, Result};
use crate::model::Page;

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
    #[serde(rename = "opc-next-page", default)]
    next_page: Option<String>,
}

/// Decode the `data` member of a single-object response
pub fn decode_data<T: DeserializeOwned>(stdout: &[u8], context: &str) -> Result<T> {
    let envelope: Envelope<T> =
        serde_json::from_slice(stdout).map_err(|source| CoreError::Decode {
            context: context.to_string(),
            source,
        })?;
    Ok(envelope.data)
}

/// Decode one page of a listing
///
/// The CLI prints nothing at all for an empty listing.
pub fn decode_page<T: DeserializeOwned>(stdout: &[u8], context: &str) -> Result<Page<T>> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(Page::last(Vec::new()));
    }
    let envelope: Envelope<Vec<T>> =
        serde_json::from_slice(stdout).map_err(|source| CoreError::Decode {
            context: context.to_string(),
            source,
        })?;
    Ok(Page::new(envelope.data, envelope.next_page))
}

#[derive(Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<u16>,
}

/// Human readable message for a failed invocation
///
/// Service failures are printed as `ServiceError:` followed by a JSON
/// document; anything else is passed through trimmed.
pub fn error_message(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();

    let parsed = trimmed
        .find('{')
        .and_then(|start| serde_json::from_str::<ServiceError>(&trimmed[start..]).ok());

    match parsed {
        Some(ServiceError {
            code,
            message,
            status,
        }) if code.is_some() || message.is_some() => {
            let mut out = code.unwrap_or_else(|| "ServiceError".to_string());
            if let Some(status) = status {
                out.push_str(&format!(" ({status})"));
            }
            if let Some(message) = message {
                out.push_str(": ");
                out.push_str(&message);
            }
            out
        }
        _ if trimmed.is_empty() => "oci exited with an error and no output".to_string(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Instance, LifecycleState};

    #[test]
    fn test_decode_instance() {
        let body = br#"{
            "data": {
                "id": "ocid1.instance.oc1..a",
                "display-name": "web-01",
                "lifecycle-state": "RUNNING"
            },
            "etag": "abc"
        }"#;
        let instance: Instance = decode_data(body, "instance").unwrap();
        assert_eq!(instance.lifecycle_state, LifecycleState::Running);
    }

    #[test]
    fn test_decode_page_with_cursor() {
        let body = br#"{"data": [1, 2], "opc-next-page": "AAA="}"#;
        let page: Page<u32> = decode_page(body, "numbers").unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.next_page.as_deref(), Some("AAA="));

        let last: Page<u32> = decode_page(br#"{"data": [3]}"#, "numbers").unwrap();
        assert_eq!(last.next_page, None);
    }

    #[test]
    fn test_empty_output_is_empty_page() {
        let page: Page<u32> = decode_page(b"\n", "numbers").unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page.is_none());
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = decode_data::<Instance>(b"not json", "instance").unwrap_err();
        assert!(matches!(err, CoreError::Decode { ref context, .. } if context == "instance"));
    }

    #[test]
    fn test_service_error_message() {
        let stderr = br#"ServiceError:
{
    "code": "NotAuthorizedOrNotFound",
    "message": "Authorization failed or requested resource not found.",
    "opc-request-id": "ABC",
    "status": 404
}"#;
        assert_eq!(
            error_message(stderr),
            "NotAuthorizedOrNotFound (404): Authorization failed or requested resource not found."
        );
    }

    #[test]
    fn test_plain_stderr_passthrough() {
        assert_eq!(
            error_message(b"  Error: Missing option(s) --instance-id.\n"),
            "Error: Missing option(s) --instance-id."
        );
        assert_eq!(
            error_message(b""),
            "oci exited with an error and no output"
        );
    }
}
