use gofile_protocol::ApiResponse;
use serde::de::DeserializeOwned;

use crate::error::Error;

/// Decodes an envelope and returns its `data` as `T`.
///
/// Only the envelope status is checked; payload contents are not validated.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    let envelope: ApiResponse<Option<serde_json::Value>> = serde_json::from_slice(body)?;
    if !envelope.is_ok() {
        return Err(Error::Rejected {
            status: envelope.status,
        });
    }
    let data = envelope.into_data().unwrap_or(serde_json::Value::Null);
    Ok(serde_json::from_value(data)?)
}
