//! Helpers for payloads whose concrete shape is picked by a discriminator
//! field.

use crate::errors::ModelError;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;

/// Reads the string discriminator `field` without consuming the payload.
pub(crate) fn discriminator(value: &Json, field: &'static str) -> Result<String, ModelError> {
    value
        .get(field)
        .and_then(Json::as_str)
        .map(str::to_owned)
        .ok_or(ModelError::MissingDiscriminator(field))
}

/// Decodes `value` into the shape selected for `kind`.
pub(crate) fn decode_as<T: DeserializeOwned>(kind: &str, value: Json) -> Result<T, ModelError> {
    serde_json::from_value(value).map_err(|e| ModelError::body(kind, e))
}

/// Serialises `body` and stamps the discriminator back onto it.
pub(crate) fn with_discriminator<T: serde::Serialize>(
    body: &T,
    field: &'static str,
    kind: &str,
) -> Result<Json, serde_json::Error> {
    let mut value = serde_json::to_value(body)?;
    if let Json::Object(map) = &mut value {
        map.insert(field.to_string(), Json::String(kind.to_string()));
    }
    Ok(value)
}
