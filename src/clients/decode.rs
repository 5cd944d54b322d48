//! Response body decoding and error mapping.
//!
//! Bodies are JSON. Carriage returns are stripped before parsing, an empty
//! body decodes to `{}`, and a top-level `error` field turns an otherwise
//! successful response into [`ArmError::Application`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::clients::errors::ArmError;
use crate::clients::http_response::HttpResponse;

/// Parses a raw body into JSON without inspecting its contents.
///
/// # Errors
///
/// Returns [`ArmError::Decode`] if the body is not valid JSON.
pub fn parse_body(status: u16, body: &str) -> Result<Value, ArmError> {
    let cleaned = body.replace('\r', "");
    if cleaned.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(&cleaned).map_err(|e| ArmError::Decode {
        status,
        message: e.to_string(),
    })
}

/// Returns `true` if the payload carries a top-level `error` field.
#[must_use]
pub fn has_error_field(payload: &Value) -> bool {
    payload.get("error").is_some()
}

/// Decodes a final (non-polling) response into JSON.
///
/// # Errors
///
/// - [`ArmError::NotFound`] for HTTP 404
/// - [`ArmError::Decode`] for malformed JSON
/// - [`ArmError::Application`] for a payload with an `error` field, or any
///   other non-2xx status
pub fn decode_response(url: &str, response: &HttpResponse) -> Result<Value, ArmError> {
    if response.code == 404 {
        tracing::error!(url = %url, body = %response.body, "Resource not found");
        return Err(ArmError::NotFound {
            url: url.to_string(),
            body: response.body.clone(),
        });
    }

    let payload = match parse_body(response.code, &response.body) {
        Ok(payload) => payload,
        // Non-JSON error bodies still carry the status.
        Err(_) if !response.is_ok() => Value::String(response.body.replace('\r', "")),
        Err(e) => return Err(e),
    };

    if has_error_field(&payload) || !response.is_ok() {
        return Err(ArmError::Application {
            status: response.code,
            payload,
        });
    }
    Ok(payload)
}

/// Converts decoded JSON into a typed value.
///
/// # Errors
///
/// Returns [`ArmError::Decode`] if the JSON does not match `T`.
pub fn into_typed<T: DeserializeOwned>(status: u16, value: Value) -> Result<T, ArmError> {
    serde_json::from_value(value).map_err(|e| ArmError::Decode {
        status,
        message: e.to_string(),
    })
}
