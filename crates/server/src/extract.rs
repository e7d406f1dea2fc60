use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use models::Fields;

use crate::errors::JsonApiError;

/// Request body that must be a non-empty JSON object.
///
/// Anything else (no body, invalid JSON, an array, `{}`) is rejected with
/// `400 {"error": "Not a JSON"}`. Handlers that have to report a missing record
/// first take `Result<JsonBody, JsonApiError>` and unwrap it after the lookup.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Fields);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|_| JsonApiError::not_a_json())?;
        parse_object(&bytes).map(JsonBody)
    }
}

fn parse_object(bytes: &[u8]) -> Result<Fields, JsonApiError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        _ => Err(JsonApiError::not_a_json()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_non_empty_objects_pass() {
        assert!(parse_object(br#"{"name": "California"}"#).is_ok());
        for bad in [&b""[..], b"{}", b"[1, 2]", b"\"name\"", b"{not json"] {
            let err = parse_object(bad).unwrap_err();
            assert_eq!(err.body.error, "Not a JSON");
        }
    }
}
