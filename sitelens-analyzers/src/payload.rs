use crate::error::{Result, ScanError};
use serde::Serialize;
use serde_json::Value;
use sitelens_core::analyzer::Payload;

/// Serialize an analyzer result into the JSON object the engine consumes
pub fn into_payload<T: Serialize>(value: &T) -> Result<Payload> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(ScanError::ParseError(format!(
            "analyzer result must serialize to an object, got {}",
            other
        ))),
    }
}
